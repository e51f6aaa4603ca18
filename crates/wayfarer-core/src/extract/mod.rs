//! Generator-output extraction pipeline.
//!
//! ```text
//! raw text --normalize--> text --parse--> Record --validate(schema)--> Record --construct--> typed result
//! ```
//!
//! Every stage is pure and synchronous. A failure at any stage stops the
//! pipeline with a classified [`ExtractionError`]; a typed result is only
//! built once the whole record has passed structural validation, so a
//! partially-populated result never exists.

pub mod construct;
pub mod error;
pub mod normalize;
pub mod validate;

use std::fmt;

use serde_json::Value;

use crate::schema::DomainSchema;

pub use construct::{FromItem, FromRecord, ItemView};
pub use error::ExtractionError;
pub use normalize::normalize;
pub use validate::validate;

/// A generic key/value mapping parsed from generator output.
pub type Record = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// ItemPath
// ---------------------------------------------------------------------------

/// Location of an item inside a (possibly nested) record, e.g.
/// `days[0].activities[2]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPath(Vec<(&'static str, usize)>);

impl ItemPath {
    /// The empty path, pointing at the record itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend this path with item `index` of container `key`.
    pub fn child(&self, key: &'static str, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push((key, index));
        Self(segments)
    }

    /// Container key of the innermost item.
    pub fn container(&self) -> Option<&'static str> {
        self.0.last().map(|(key, _)| *key)
    }

    /// Index of the innermost item within its container.
    pub fn index(&self) -> Option<usize> {
        self.0.last().map(|(_, index)| *index)
    }

    pub fn segments(&self) -> &[(&'static str, usize)] {
        &self.0
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, (key, index)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{key}[{index}]")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Parse normalized text into a [`Record`].
///
/// Anything that is not a JSON object (prose, arrays, scalars) is a
/// [`ExtractionError::MalformedPayload`] carrying the parser diagnostic.
pub fn parse(text: &str) -> Result<Record, ExtractionError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        other => Err(ExtractionError::MalformedPayload(format!(
            "expected a JSON object, found {}",
            value_type(&other)
        ))),
    }
}

/// Run the full pipeline on raw generator output.
pub fn extract<R: FromRecord>(raw: &str, schema: &DomainSchema) -> Result<R, ExtractionError> {
    let record = parse(normalize(raw))?;
    validate(&record, schema)?;
    R::from_record(&record)
}

/// Look up `key` in `fields` and return its items if it holds a sequence.
pub(crate) fn container_items<'a>(fields: &'a Record, key: &str) -> Option<&'a [Value]> {
    fields.get(key).and_then(Value::as_array).map(Vec::as_slice)
}

pub(crate) fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
