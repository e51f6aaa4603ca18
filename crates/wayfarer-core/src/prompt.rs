//! Prompt construction for the generator.
//!
//! The JSON shape shown to the model is rendered from the same
//! [`DomainSchema`] the validator enforces, so the two cannot drift apart.
//! This module contains pure string assembly only.

use crate::schema::{ContainerSchema, DomainSchema};

/// A system/user prompt pair for one generator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Placeholder text shown for a field in the rendered shape, keyed by field
/// name. Fields without a hint render as `"string"`.
pub type FieldHints = &'static [(&'static str, &'static str)];

/// Closing instruction appended to every system prompt.
const OUTPUT_CONTRACT: &str = "Respond with a single JSON object and nothing else. \
Do not add commentary before or after the JSON. \
Every field shown below is required unless marked optional.";

/// Build a system prompt: the role description, the output contract, and the
/// JSON shape for `schema`.
pub fn system_prompt(role: &str, schema: &DomainSchema, hints: FieldHints) -> String {
    let mut prompt = String::with_capacity(1024);
    prompt.push_str(role.trim());
    prompt.push_str("\n\n");
    prompt.push_str(OUTPUT_CONTRACT);
    prompt.push_str("\n\n");
    prompt.push_str(&render_shape(schema, hints));
    prompt
}

/// Render the JSON shape described by `schema` as an indented example.
pub fn render_shape(schema: &DomainSchema, hints: FieldHints) -> String {
    let mut out = String::from("{\n");
    render_container(&mut out, &schema.root, &schema.root, hints, 1);
    out.push_str("\n}");
    out
}

fn render_container(
    out: &mut String,
    container: &ContainerSchema,
    root: &ContainerSchema,
    hints: FieldHints,
    depth: usize,
) {
    let pad = "  ".repeat(depth);
    out.push_str(&format!("{pad}\"{}\": [\n{pad}  {{\n", container.key));

    let mut lines: Vec<String> = container
        .required
        .iter()
        .map(|field| format!("{pad}    \"{field}\": {}", hint_for(field, hints)))
        .collect();

    // Hints for fields no container requires document optional leaf fields.
    if container.child.is_none() {
        for (field, hint) in hints.iter().filter(|(f, _)| !required_anywhere(root, f)) {
            lines.push(format!("{pad}    \"{field}\": {hint} (optional)"));
        }
    }

    if let Some(child) = container.child {
        let mut block = String::new();
        render_container(&mut block, child, root, hints, depth + 2);
        lines.push(block);
    }

    out.push_str(&lines.join(",\n"));
    out.push_str(&format!("\n{pad}  }}\n{pad}]"));
}

fn hint_for(field: &str, hints: FieldHints) -> String {
    hints
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, hint)| hint.to_string())
        .unwrap_or_else(|| "\"string\"".to_string())
}

fn required_anywhere(root: &ContainerSchema, field: &str) -> bool {
    let mut current = Some(root);
    while let Some(c) = current {
        if c.required.contains(&field) || c.key == field {
            return true;
        }
        current = c.child;
    }
    false
}

/// Join a list for inclusion in a sentence, e.g. `"culture, food"`.
pub fn join_list(items: &[String]) -> String {
    if items.is_empty() {
        "no particular preference".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EVENTS, ITINERARY, RESTAURANTS};

    #[test]
    fn flat_shape_lists_every_required_field() {
        let shape = render_shape(&EVENTS, &[("price", "0.0")]);
        assert!(shape.contains("\"events\": ["));
        for field in EVENTS.root.required {
            assert!(shape.contains(&format!("\"{field}\"")), "missing {field}");
        }
        assert!(shape.contains("\"price\": 0.0"));
        assert!(shape.contains("\"name\": \"string\""));
    }

    #[test]
    fn nested_shape_includes_child_container() {
        let shape = render_shape(&ITINERARY, &[]);
        assert!(shape.contains("\"days\": ["));
        assert!(shape.contains("\"activities\": ["));
        assert!(shape.contains("\"start_time\""));
    }

    #[test]
    fn optional_hints_are_marked() {
        let shape = render_shape(&RESTAURANTS, &[("opening_hours", "\"11:00 AM - 10:00 PM\"")]);
        assert!(shape.contains("\"opening_hours\": \"11:00 AM - 10:00 PM\" (optional)"));
    }

    #[test]
    fn required_hints_are_not_marked_optional() {
        let shape = render_shape(&ITINERARY, &[("category", "\"culture\"")]);
        assert!(shape.contains("\"category\": \"culture\""));
        assert!(!shape.contains("(optional)"));
    }

    #[test]
    fn system_prompt_has_role_contract_and_shape() {
        let prompt = system_prompt("  You are a planner.  ", &EVENTS, &[]);
        assert!(prompt.starts_with("You are a planner."));
        assert!(prompt.contains("single JSON object"));
        assert!(prompt.contains("\"events\": ["));
    }

    #[test]
    fn join_list_handles_empty() {
        assert_eq!(join_list(&[]), "no particular preference");
        assert_eq!(
            join_list(&["culture".to_string(), "food".to_string()]),
            "culture, food"
        );
    }
}
