use thiserror::Error;

use super::ItemPath;
use crate::error::FailureKind;

/// Errors raised while turning generator text into a typed domain result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    /// The normalized text is not a JSON object.
    #[error("MalformedPayload: {0}")]
    MalformedPayload(String),

    /// The top-level container key is absent or does not hold a sequence.
    #[error("missing '{0}' array")]
    MissingContainerKey(String),

    /// An item lacks one or more required fields. For nested containers the
    /// missing field may be the child container key itself.
    #[error("item {path} is missing required field(s): {}", .missing.join(", "))]
    IncompleteItem { path: ItemPath, missing: Vec<String> },

    /// A present field holds a value of the wrong type.
    #[error("field '{field}' of item {path} is not a valid {expected}")]
    TypeCoercion {
        field: String,
        path: ItemPath,
        expected: &'static str,
    },
}

impl ExtractionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MalformedPayload(_) => FailureKind::MalformedPayload,
            Self::MissingContainerKey(_) => FailureKind::MissingContainerKey,
            Self::IncompleteItem { .. } => FailureKind::IncompleteItem,
            Self::TypeCoercion { .. } => FailureKind::TypeCoercionError,
        }
    }
}

impl From<serde_json::Error> for ExtractionError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedPayload(err.to_string())
    }
}
