//! Schema-driven structural validation.
//!
//! Checks presence only: the container key exists and holds a sequence,
//! every item carries its required fields, and nested child containers are
//! present and valid. Items are checked in order and the first failure is
//! returned; nothing is accepted unless every item passes.

use serde_json::Value;

use super::{ExtractionError, ItemPath, Record, container_items};
use crate::schema::{ContainerSchema, DomainSchema};

/// Validate `record` against `schema`.
pub fn validate(record: &Record, schema: &DomainSchema) -> Result<(), ExtractionError> {
    let root = &schema.root;
    let items = container_items(record, root.key)
        .ok_or_else(|| ExtractionError::MissingContainerKey(root.key.to_string()))?;
    validate_items(items, root, &ItemPath::root())
}

fn validate_items(
    items: &[Value],
    container: &ContainerSchema,
    parent: &ItemPath,
) -> Result<(), ExtractionError> {
    for (index, item) in items.iter().enumerate() {
        validate_item(item, container, parent.child(container.key, index))?;
    }
    Ok(())
}

fn validate_item(
    item: &Value,
    container: &ContainerSchema,
    path: ItemPath,
) -> Result<(), ExtractionError> {
    let fields = item.as_object();

    let missing: Vec<String> = container
        .required
        .iter()
        .filter(|name| !fields.is_some_and(|f| f.contains_key(**name)))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ExtractionError::IncompleteItem { path, missing });
    }

    if let Some(child) = container.child {
        // A missing or non-sequence child container is reported against the
        // parent item, naming only the child key.
        let Some(children) = fields.and_then(|f| container_items(f, child.key)) else {
            return Err(ExtractionError::IncompleteItem {
                path,
                missing: vec![child.key.to_string()],
            });
        };
        validate_items(children, child, &path)?;
    }

    Ok(())
}
