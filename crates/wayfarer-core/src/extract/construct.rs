//! Typed result construction from a validated [`Record`].
//!
//! Construction assumes the record already passed [`super::validate`] and
//! performs no presence checks of its own. The only new failure it can raise
//! is [`ExtractionError::TypeCoercion`]: a field that exists but holds a
//! value of the wrong type.

use serde_json::Value;

use super::{ExtractionError, ItemPath, Record, container_items};
use crate::schema::ContainerSchema;

/// A typed item built from one element of a container.
pub trait FromItem: Sized {
    fn from_item(item: &ItemView<'_>) -> Result<Self, ExtractionError>;
}

/// A typed domain result built from a whole validated record.
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Result<Self, ExtractionError>;
}

/// Build every item of the top-level `container`.
pub fn items<T: FromItem>(
    record: &Record,
    container: &ContainerSchema,
) -> Result<Vec<T>, ExtractionError> {
    let values = container_items(record, container.key)
        .ok_or_else(|| ExtractionError::MissingContainerKey(container.key.to_string()))?;
    build_items(values, container, &ItemPath::root())
}

fn build_items<T: FromItem>(
    values: &[Value],
    container: &ContainerSchema,
    parent: &ItemPath,
) -> Result<Vec<T>, ExtractionError> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let path = parent.child(container.key, index);
            let fields = value.as_object().ok_or_else(|| ExtractionError::TypeCoercion {
                field: container.key.to_string(),
                path: path.clone(),
                expected: "object",
            })?;
            T::from_item(&ItemView {
                fields,
                container,
                path,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// ItemView
// ---------------------------------------------------------------------------

/// Read-only view of one item with typed field accessors.
///
/// Every accessor reports failures against this item's [`ItemPath`].
#[derive(Debug)]
pub struct ItemView<'a> {
    fields: &'a Record,
    container: &'a ContainerSchema,
    path: ItemPath,
}

impl ItemView<'_> {
    pub fn path(&self) -> &ItemPath {
        &self.path
    }

    /// A required string field.
    pub fn text(&self, field: &str) -> Result<String, ExtractionError> {
        match self.fields.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(self.coercion(field, "string")),
        }
    }

    /// An optional string field: absent and `null` both read as `None`.
    pub fn optional_text(&self, field: &str) -> Result<Option<String>, ExtractionError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.coercion(field, "string")),
        }
    }

    /// A required numeric field. Numeric strings (`"12.5"`) are accepted;
    /// non-finite values are not.
    pub fn number(&self, field: &str) -> Result<f64, ExtractionError> {
        let parsed = match self.fields.get(field) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|n| n.is_finite())
            .ok_or_else(|| self.coercion(field, "number"))
    }

    /// A required boolean field.
    pub fn flag(&self, field: &str) -> Result<bool, ExtractionError> {
        match self.fields.get(field) {
            Some(Value::Bool(b)) => Ok(*b),
            _ => Err(self.coercion(field, "boolean")),
        }
    }

    /// Build the items of this item's nested child container.
    pub fn children<T: FromItem>(&self) -> Result<Vec<T>, ExtractionError> {
        let Some(child) = self.container.child else {
            return Ok(Vec::new());
        };
        let values = container_items(self.fields, child.key).ok_or_else(|| {
            ExtractionError::IncompleteItem {
                path: self.path.clone(),
                missing: vec![child.key.to_string()],
            }
        })?;
        build_items(values, child, &self.path)
    }

    fn coercion(&self, field: &str, expected: &'static str) -> ExtractionError {
        ExtractionError::TypeCoercion {
            field: field.to_string(),
            path: self.path.clone(),
            expected,
        }
    }
}
