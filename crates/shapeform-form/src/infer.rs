//! Inferring fields from the shape of existing data

use std::collections::HashSet;

use serde_json::Value;

use crate::field::{FieldDefinition, FieldType, FormFields, join_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferOptions {
    /// Nesting levels below the root that are still inspected
    pub max_depth: usize,
}

impl Default for InferOptions {
    fn default() -> Self {
        Self { max_depth: 10 }
    }
}

/// Derive a field tree from `data`. Non-object input yields no fields.
pub fn generate_form_fields_from_data(data: &Value, options: &InferOptions) -> FormFields {
    infer_fields(data, "", 0, options, &HashSet::new())
}

fn infer_fields(
    data: &Value,
    prefix: &str,
    depth: usize,
    options: &InferOptions,
    visited: &HashSet<String>,
) -> FormFields {
    let mut fields = FormFields::new();
    if depth >= options.max_depth {
        return fields;
    }
    let Some(object) = data.as_object() else {
        return fields;
    };

    for (name, value) in object {
        let key = join_key(prefix, name);
        if visited.contains(&key) {
            continue;
        }
        let mut branch = visited.clone();
        branch.insert(key.clone());

        match value {
            Value::Array(items) => {
                let children = match items.first() {
                    Some(first @ Value::Object(_)) => {
                        infer_fields(first, &key, depth + 1, options, &branch)
                    }
                    _ => FormFields::new(),
                };
                fields.insert(
                    name.clone(),
                    FieldDefinition::new(key, FieldType::Array).with_children(children),
                );
            }
            Value::Object(_) => {
                let children = infer_fields(value, &key, depth + 1, options, &branch);
                if !children.is_empty() {
                    fields.insert(
                        name.clone(),
                        FieldDefinition::new(key, FieldType::Object).with_children(children),
                    );
                }
            }
            scalar => {
                fields.insert(name.clone(), FieldDefinition::new(key, scalar_type(scalar)));
            }
        }
    }
    fields
}

fn scalar_type(value: &Value) -> FieldType {
    match value {
        Value::Bool(_) => FieldType::Boolean,
        Value::Number(_) => FieldType::Number,
        Value::String(s) if is_numeric_string(s) => FieldType::Number,
        _ => FieldType::String,
    }
}

/// Decimal-looking strings: no hex prefix and no letters at all
pub fn is_numeric_string(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return false;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("0x") || lower.starts_with("-0x") {
        return false;
    }
    if trimmed.chars().any(char::is_alphabetic) {
        return false;
    }
    trimmed.parse::<f64>().is_ok()
}
