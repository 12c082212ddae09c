//! Missing-field detection, clarification questions and summaries

use serde_json::{Value, json};
use shapeform_form::{
    FieldDefinition, FieldType, FormFields, get_nested_value, is_field_required, is_field_visible,
};

use crate::prompt::plain;
use crate::types::Clarification;

/// Absent, `null` and `""` all count as unfilled.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Paths of visible, required fields whose value in `filled` is empty.
///
/// Object fields are not checked themselves; their children are. Children of
/// an optional object that is itself empty are skipped.
pub fn detect_missing_fields(fields: &FormFields, filled: &Value) -> Vec<String> {
    missing_fields(fields, filled)
        .into_iter()
        .map(|field| field.key.clone())
        .collect()
}

pub(crate) fn missing_fields<'a>(fields: &'a FormFields, filled: &Value) -> Vec<&'a FieldDefinition> {
    let mut missing = Vec::new();
    walk(fields, filled, &mut |field, value| {
        if is_field_required(field, filled) && is_empty_value(value) {
            missing.push(field);
        }
    });
    missing
}

/// Visit every visible leaf field with its current value.
fn walk<'a>(
    fields: &'a FormFields,
    filled: &Value,
    visit: &mut impl FnMut(&'a FieldDefinition, Option<&Value>),
) {
    for field in fields.values().filter(|f| is_field_visible(f, filled)) {
        let value = get_nested_value(filled, &field.key);
        match &field.children {
            Some(children) if field.field_type == FieldType::Object && !children.is_empty() => {
                if is_empty_value(value) && !is_field_required(field, filled) {
                    continue;
                }
                walk(children, filled, visit);
            }
            _ => visit(field, value),
        }
    }
}

pub fn build_clarifications(fields: &FormFields, filled: &Value) -> Vec<Clarification> {
    missing_fields(fields, filled)
        .into_iter()
        .map(clarification_for)
        .collect()
}

fn clarification_for(field: &FieldDefinition) -> Clarification {
    let options = match field.field_type {
        FieldType::Boolean => Some(vec![json!(true), json!(false)]),
        _ => field.literal_options.clone().filter(|o| !o.is_empty()),
    };
    let label = &field.label;

    let mut question = match (field.field_type, &options) {
        (FieldType::Boolean, _) => format!("Is {label} yes or no?"),
        (FieldType::Array, Some(options)) => {
            format!("Which {label} apply? Options: {}.", list(options))
        }
        (_, Some(options)) => {
            format!("Which {label} should be used? Options: {}.", list(options))
        }
        (FieldType::Array, None) => format!("Which {label} should be included?"),
        _ => format!("What is the {label}?"),
    };
    match (field.min, field.max) {
        (Some(min), Some(max)) => question.push_str(&format!(" It must be between {min} and {max}.")),
        (Some(min), None) => question.push_str(&format!(" It must be at least {min}.")),
        (None, Some(max)) => question.push_str(&format!(" It must be at most {max}.")),
        (None, None) => {}
    }
    if let Some(description) = &field.description {
        question.push_str(&format!(" ({description})"));
    }

    Clarification {
        field: field.key.clone(),
        label: label.clone(),
        question,
        options,
    }
}

fn list(options: &[Value]) -> String {
    options.iter().map(plain).collect::<Vec<_>>().join(", ")
}

/// Human-readable account of what was filled and what is still needed.
pub fn build_summary(fields: &FormFields, filled: &Value) -> String {
    let mut filled_labels = Vec::new();
    walk(fields, filled, &mut |field, value| {
        if !is_empty_value(value) {
            filled_labels.push(field.label.as_str());
        }
    });
    let missing_labels: Vec<&str> = missing_fields(fields, filled)
        .into_iter()
        .map(|f| f.label.as_str())
        .collect();

    let filled_part = match filled_labels.len() {
        0 => "No fields were filled.".to_string(),
        1 => format!("Filled 1 field: {}.", filled_labels[0]),
        n => format!("Filled {n} fields: {}.", filled_labels.join(", ")),
    };
    let missing_part = if missing_labels.is_empty() {
        "All required fields are complete.".to_string()
    } else {
        format!("Still needed: {}.", missing_labels.join(", "))
    };
    format!("{filled_part} {missing_part}")
}
