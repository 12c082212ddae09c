//! The combined field tree: inferred from data, refined by the schema

use serde_json::Value;
use shapeform_schema::SchemaNode;

use crate::extract::extract_schema_fields;
use crate::field::{FieldDefinition, FormFields};
use crate::infer::{InferOptions, generate_form_fields_from_data};
use crate::path::get_nested_value;

/// Fields for `data`, with schema-derived details layered on top when a
/// schema is given.
pub fn generate_form_fields(data: &Value, schema: Option<&SchemaNode>) -> FormFields {
    generate_form_fields_with(data, schema, &InferOptions::default())
}

pub fn generate_form_fields_with(
    data: &Value,
    schema: Option<&SchemaNode>,
    options: &InferOptions,
) -> FormFields {
    let inferred = generate_form_fields_from_data(data, options);
    match schema {
        Some(schema) => merge_schema_fields(&inferred, &extract_schema_fields(schema)),
        None => inferred,
    }
}

/// Merge schema-derived fields into data-derived ones.
///
/// Whatever the schema states wins; children merge recursively and fields
/// only the schema knows are added as they are. Merging the same schema
/// fields twice gives the same result as merging once.
pub fn merge_schema_fields(data_fields: &FormFields, schema_fields: &FormFields) -> FormFields {
    let mut merged = data_fields.clone();
    for (name, schema_field) in schema_fields {
        match merged.get_mut(name) {
            Some(existing) => merge_field(existing, schema_field),
            None => {
                merged.insert(name.clone(), schema_field.clone());
            }
        }
    }
    merged
}

fn merge_field(target: &mut FieldDefinition, schema: &FieldDefinition) {
    fn overlay<T: Clone>(target: &mut Option<T>, schema: &Option<T>) {
        if schema.is_some() {
            target.clone_from(schema);
        }
    }

    target.field_type = schema.field_type;
    target.label.clone_from(&schema.label);
    overlay(&mut target.description, &schema.description);
    overlay(&mut target.required, &schema.required);
    overlay(&mut target.required_when, &schema.required_when);
    overlay(&mut target.min, &schema.min);
    overlay(&mut target.max, &schema.max);
    overlay(&mut target.step, &schema.step);
    overlay(&mut target.condition, &schema.condition);
    overlay(&mut target.literal_options, &schema.literal_options);
    overlay(
        &mut target.literal_options_descriptions,
        &schema.literal_options_descriptions,
    );
    target.children = match (target.children.take(), &schema.children) {
        (Some(existing), Some(from_schema)) => Some(merge_schema_fields(&existing, from_schema)),
        (None, Some(from_schema)) => Some(from_schema.clone()),
        (existing, None) => existing,
    };
}

/// A field without a condition is always shown; otherwise the controlling
/// field must currently hold the condition's value.
pub fn is_field_visible(field: &FieldDefinition, data: &Value) -> bool {
    match &field.condition {
        None => true,
        Some(condition) => get_nested_value(data, &condition.field) == Some(&condition.value),
    }
}

/// Static requiredness, or a `required_when` rule that currently applies
pub fn is_field_required(field: &FieldDefinition, data: &Value) -> bool {
    if field.required == Some(true) {
        return true;
    }
    field
        .required_when
        .as_ref()
        .is_some_and(|rule| rule.is_active(get_nested_value(data, &rule.field)))
}

/// The subset of `fields` visible for `data`, at every level.
pub fn visible_fields(fields: &FormFields, data: &Value) -> FormFields {
    fields
        .iter()
        .filter(|(_, field)| is_field_visible(field, data))
        .map(|(name, field)| {
            let mut field = field.clone();
            if let Some(children) = &field.children {
                field.children = Some(visible_fields(children, data));
            }
            (name.clone(), field)
        })
        .collect()
}
