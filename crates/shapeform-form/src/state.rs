//! Form state: data, derived fields and validation errors kept in step

use indexmap::IndexMap;
use serde_json::Value;
use shapeform_schema::{PathSegment, SchemaNode, validate};
use thiserror::Error;
use tracing::debug;

use crate::coerce::coerce_to_existing_type;
use crate::field::{FieldType, FormFields, find_field};
use crate::generate::{generate_form_fields_with, visible_fields};
use crate::infer::InferOptions;
use crate::messages::validation_error_map;
use crate::path::{get_nested_value, merge_values, normalize_path, set_nested_value};

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Holds the data being edited together with its derived field tree and
/// current validation errors.
///
/// Fields are recomputed whenever the data or the schema changes.
/// Validation runs on construction and after every change; there is no
/// debouncing.
#[derive(Debug, Clone)]
pub struct FormState {
    schema: Option<SchemaNode>,
    initial: Value,
    data: Value,
    fields: FormFields,
    validation_errors: IndexMap<String, String>,
    infer_options: InferOptions,
}

impl FormState {
    pub fn new(schema: Option<SchemaNode>, data: Value) -> Self {
        Self::with_options(schema, data, InferOptions::default())
    }

    pub fn with_options(schema: Option<SchemaNode>, data: Value, infer_options: InferOptions) -> Self {
        let mut state = Self {
            schema,
            initial: data.clone(),
            data,
            fields: FormFields::new(),
            validation_errors: IndexMap::new(),
            infer_options,
        };
        state.refresh_fields();
        state.validate_data();
        state
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn schema(&self) -> Option<&SchemaNode> {
        self.schema.as_ref()
    }

    pub fn validation_errors(&self) -> &IndexMap<String, String> {
        &self.validation_errors
    }

    pub fn is_valid(&self) -> bool {
        self.validation_errors.is_empty()
    }

    /// Whether the data differs from what the form started with
    pub fn has_changes(&self) -> bool {
        self.data != self.initial
    }

    /// Fields whose display condition currently holds
    pub fn visible_fields(&self) -> FormFields {
        visible_fields(&self.fields, &self.data)
    }

    pub fn set_data(&mut self, data: Value) {
        self.data = data;
        self.refresh_fields();
        self.validate_data();
    }

    pub fn set_schema(&mut self, schema: Option<SchemaNode>) {
        self.schema = schema;
        self.refresh_fields();
        self.validate_data();
    }

    /// Write `value` at `path`, coerced to the type the field holds.
    ///
    /// Returns `false` when the value could not be coerced or the path indexes
    /// too far past the end of an array; the data is then left as it was.
    pub fn update_field(&mut self, path: &str, value: Value) -> bool {
        let template = self.type_template(path);
        let Some(coerced) = coerce_to_existing_type(template.as_ref(), value) else {
            debug!(path, "value could not be coerced, field left unchanged");
            self.validate_data();
            return false;
        };
        if !set_nested_value(&mut self.data, path, coerced) {
            debug!(path, "array index out of range, field left unchanged");
            return false;
        }
        self.refresh_fields();
        self.validate_data();
        true
    }

    /// Re-run validation, replacing the error map. Returns whether the data
    /// is valid. Without a schema the data is always valid.
    pub fn validate_data(&mut self) -> bool {
        self.validation_errors = match &self.schema {
            Some(schema) => validation_error_map(&validate(schema, &self.data).errors),
            None => IndexMap::new(),
        };
        self.validation_errors.is_empty()
    }

    /// Replace the data with parsed JSON text and validate it.
    pub fn update_from_json(&mut self, text: &str) -> Result<bool, FormError> {
        let data: Value = serde_json::from_str(text)?;
        self.data = data;
        self.refresh_fields();
        Ok(self.validate_data())
    }

    /// Go back to the data the form was created with.
    pub fn reset(&mut self) {
        self.data = self.initial.clone();
        self.refresh_fields();
        self.validate_data();
    }

    /// Deep-merge values produced elsewhere (for example by an AI filler).
    /// `null`s in `filled` never erase existing values.
    pub fn apply_filled(&mut self, filled: &Value) -> bool {
        if !self.data.is_object() && filled.is_object() {
            self.data = Value::Object(Default::default());
        }
        merge_values(&mut self.data, filled);
        self.refresh_fields();
        self.validate_data()
    }

    fn refresh_fields(&mut self) {
        self.fields = generate_form_fields_with(&self.data, self.schema.as_ref(), &self.infer_options);
    }

    /// A value whose JSON type stands for what `path` should hold: the
    /// current value when there is one, otherwise the field's declared type.
    fn type_template(&self, path: &str) -> Option<Value> {
        if let Some(current) = get_nested_value(&self.data, path).filter(|v| !v.is_null()) {
            return Some(current.clone());
        }
        let key = normalize_path(path)
            .iter()
            .filter_map(|segment| match segment {
                PathSegment::Key(k) => Some(k.as_str()),
                PathSegment::Index(_) => None,
            })
            .collect::<Vec<_>>()
            .join(".");
        match find_field(&self.fields, &key)?.field_type {
            FieldType::Number => Some(Value::from(0)),
            FieldType::Boolean => Some(Value::Bool(false)),
            FieldType::String => Some(Value::String(String::new())),
            FieldType::Object | FieldType::Array | FieldType::Literal => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shapeform_schema::*;

    fn project_schema() -> SchemaNode {
        struct_schema([
            ("name", refine(string(), Check::NonEmpty)),
            ("budget", number()),
            ("public", optional(boolean())),
        ])
    }

    #[test]
    fn test_validates_on_creation() {
        let state = FormState::new(Some(project_schema()), json!({"name": "", "budget": 10}));
        assert_eq!(state.validation_errors().keys().collect::<Vec<_>>(), vec!["name"]);
        assert!(!state.has_changes());
    }

    #[test]
    fn test_update_field_coerces_and_validates() {
        let mut state = FormState::new(Some(project_schema()), json!({"name": "", "budget": 10}));
        assert!(state.update_field("budget", json!("1,500")));
        assert!(state.update_field("name", json!("Apollo")));
        assert_eq!(state.data(), &json!({"name": "Apollo", "budget": 1500}));
        assert!(state.validation_errors().is_empty());
        assert!(state.has_changes());
    }

    #[test]
    fn test_update_field_rejects_uncoercible_value() {
        let mut state = FormState::new(Some(project_schema()), json!({"name": "a", "budget": 10}));
        assert!(!state.update_field("budget", json!("lots")));
        assert_eq!(state.data()["budget"], json!(10));
    }

    #[test]
    fn test_update_field_uses_declared_type_when_empty() {
        let mut state = FormState::new(Some(project_schema()), json!({"name": "a", "budget": 10}));
        assert!(state.update_field("public", json!("yes")));
        assert_eq!(state.data()["public"], json!(true));
    }

    #[test]
    fn test_update_from_json() {
        let mut state = FormState::new(Some(project_schema()), json!({}));
        assert!(state.update_from_json(r#"{"name": "x", "budget": 1}"#).unwrap());
        assert!(matches!(state.update_from_json("{nope"), Err(FormError::Json(_))));
        assert_eq!(state.data(), &json!({"name": "x", "budget": 1}));
    }

    #[test]
    fn test_reset_restores_initial() {
        let mut state = FormState::new(None, json!({"a": 1}));
        state.update_field("a", json!(2));
        state.reset();
        assert_eq!(state.data(), &json!({"a": 1}));
        assert!(!state.has_changes());
    }

    #[test]
    fn test_fields_follow_data() {
        let mut state = FormState::new(None, json!({"a": 1}));
        state.update_field("b.c", json!("x"));
        assert!(state.fields().contains_key("b"));
        assert!(state.validate_data());
    }

    #[test]
    fn test_apply_filled_merges() {
        let mut state = FormState::new(Some(project_schema()), json!({"name": "a"}));
        assert!(!state.is_valid());
        assert!(state.apply_filled(&json!({"budget": 5, "name": null})));
        assert_eq!(state.data(), &json!({"name": "a", "budget": 5}));
    }
}
