//! Prompt construction

use serde_json::Value;
use shapeform_form::{FieldDefinition, FormFields};

use crate::types::{AiFormFillerRequest, ChatRole};

pub const SYSTEM_PROMPT: &str = "\
You fill in forms from a user's natural-language description.
Only use information the user actually gave or that is already in the current data.
Never invent values. Use null for anything you cannot determine.
Always return every field of the schema. Repeat values that are already present in the \
current data unless the user asked to change them.
For fields with a fixed set of options, answer with exactly one of the listed options.
Numbers must be plain numbers without units or thousands separators.";

/// The user turn sent to the model: field descriptions, current data, rules,
/// earlier conversation and the latest input.
pub fn build_user_prompt(request: &AiFormFillerRequest) -> String {
    let mut sections = vec![format!(
        "Form fields:\n{}",
        describe_fields(&request.fields).join("\n")
    )];

    let current = match &request.partial_data {
        Value::Null => "{}".to_string(),
        data => serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string()),
    };
    sections.push(format!("Current data:\n{current}"));

    if let Some(rules) = request.rules.as_deref().filter(|r| !r.trim().is_empty()) {
        sections.push(format!("Rules:\n{rules}"));
    }

    if !request.messages.is_empty() {
        let history = request
            .messages
            .iter()
            .map(|m| {
                let speaker = match m.role {
                    ChatRole::User => "User",
                    ChatRole::Assistant => "Assistant",
                };
                format!("{speaker}: {}", m.content)
            })
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("Conversation so far:\n{history}"));
    }

    sections.push(format!("User input:\n{}", request.prompt));
    sections.push(
        "Return the complete form data. Keep every value from the current data that the \
         user did not change."
            .to_string(),
    );
    sections.join("\n\n")
}

/// One line per field, children indented under their parent.
pub fn describe_fields(fields: &FormFields) -> Vec<String> {
    let mut lines = Vec::new();
    describe_into(fields, 0, &mut lines);
    lines
}

fn describe_into(fields: &FormFields, depth: usize, lines: &mut Vec<String>) {
    for field in fields.values() {
        lines.push(format!("{}- {}", "  ".repeat(depth), describe_field(field)));
        if let Some(children) = &field.children {
            describe_into(children, depth + 1, lines);
        }
    }
}

fn describe_field(field: &FieldDefinition) -> String {
    let mut line = format!(
        "{} ({}, {}{})",
        field.key,
        field.label,
        field.field_type.as_str(),
        if field.required == Some(true) { ", required" } else { "" }
    );
    if let Some(description) = &field.description {
        line.push_str(": ");
        line.push_str(description);
    }
    if let Some(options) = field.literal_options.as_ref().filter(|o| !o.is_empty()) {
        let options = options.iter().map(plain).collect::<Vec<_>>().join(", ");
        line.push_str(&format!(" Options: {options}."));
    }
    match (field.min, field.max) {
        (Some(min), Some(max)) => line.push_str(&format!(" Between {min} and {max}.")),
        (Some(min), None) => line.push_str(&format!(" At least {min}.")),
        (None, Some(max)) => line.push_str(&format!(" At most {max}.")),
        (None, None) => {}
    }
    if let Some(condition) = &field.condition {
        line.push_str(&format!(
            " Only when {} is {}.",
            condition.field,
            plain(&condition.value)
        ));
    }
    if let Some(rule) = &field.required_when {
        match (&rule.value, &rule.not_value) {
            (Some(value), _) => {
                line.push_str(&format!(" Required when {} is {}.", rule.field, plain(value)))
            }
            (None, Some(value)) => line.push_str(&format!(
                " Required when {} is not {}.",
                rule.field,
                plain(value)
            )),
            (None, None) => {}
        }
    }
    line
}

pub(crate) fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
