//! The uniform response envelope returned by every agent.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::AgentError;
use crate::error::FailureKind;
use crate::extract::Record;

/// `{success, data, error}` wrapper around one agent outcome.
///
/// The constructors enforce the envelope invariant: a successful envelope
/// has no error and non-empty data; a failed envelope has empty data and an
/// error message. Fields are private and the type is serialize-only, so the
/// constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResponse {
    success: bool,
    data: Record,
    error: Option<String>,
    /// Classification of a failure; not part of the wire shape.
    #[serde(skip)]
    kind: Option<FailureKind>,
}

impl AgentResponse {
    /// Wrap a typed domain result.
    ///
    /// A result that does not serialize to a non-empty JSON object cannot be
    /// represented and yields an `UnexpectedError` envelope instead.
    pub fn success<T: Serialize>(result: &T) -> Self {
        match serde_json::to_value(result) {
            Ok(Value::Object(data)) if !data.is_empty() => Self {
                success: true,
                data,
                error: None,
                kind: None,
            },
            Ok(_) => Self::failure(&AgentError::Unexpected(
                "result did not serialize to a non-empty object".to_string(),
            )),
            Err(e) => Self::failure(&AgentError::Unexpected(format!(
                "result could not be serialized: {e}"
            ))),
        }
    }

    /// Wrap a classified failure.
    pub fn failure(err: &AgentError) -> Self {
        Self {
            success: false,
            data: Record::new(),
            error: Some(err.to_string()),
            kind: Some(err.kind()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> &Record {
        &self.data
    }

    pub fn into_data(self) -> Record {
        self.data
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Failure classification, `None` on success.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.kind
    }

    /// Deserialize `data` back into a domain response shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.data.clone()))
    }
}
