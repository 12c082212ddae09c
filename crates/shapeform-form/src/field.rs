//! Field definitions: the derived, UI-neutral description of a form

use convert_case::{Case, Casing};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shapeform_schema::RequiredWhen;

/// Ordered map of simple field names to their definitions
pub type FormFields = IndexMap<String, FieldDefinition>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Literal,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Literal => "literal",
        }
    }
}

/// Shows a field only while another field holds a given value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCondition {
    /// Full dot path of the controlling field
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Full dot path from the root
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<FormFields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<FieldCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_when: Option<RequiredWhen>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal_options: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal_options_descriptions: Option<IndexMap<String, String>>,
}

impl FieldDefinition {
    /// A bare field whose label is derived from the last segment of `key`.
    pub fn new(key: impl Into<String>, field_type: FieldType) -> Self {
        let key = key.into();
        let label = label_for_key(&key);
        Self {
            key,
            label,
            field_type,
            description: None,
            required: None,
            min: None,
            max: None,
            step: None,
            children: None,
            condition: None,
            required_when: None,
            literal_options: None,
            literal_options_descriptions: None,
        }
    }

    pub fn with_children(mut self, children: FormFields) -> Self {
        self.children = Some(children);
        self
    }

    /// Last segment of the key
    pub fn name(&self) -> &str {
        self.key.rsplit('.').next().unwrap_or(&self.key)
    }

    /// An array field whose items are objects described by `children`
    pub fn is_object_array(&self) -> bool {
        self.field_type == FieldType::Array
            && self.children.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// Title-cased label for the last segment of a dot path (`projectName` → `Project Name`)
pub fn label_for_key(key: &str) -> String {
    let name = key.rsplit('.').next().unwrap_or(key);
    name.to_case(Case::Title)
}

/// Join a parent path and a child name with a dot
pub(crate) fn join_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Find a field by its full key anywhere in the tree.
pub fn find_field<'a>(fields: &'a FormFields, key: &str) -> Option<&'a FieldDefinition> {
    fields.values().find_map(|field| {
        if field.key == key {
            return Some(field);
        }
        let nested = field.children.as_ref()?;
        if key.starts_with(&field.key) {
            find_field(nested, key)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_from_camel_case_key() {
        assert_eq!(label_for_key("projectName"), "Project Name");
        assert_eq!(label_for_key("marketing.product_name"), "Product Name");
    }

    #[test]
    fn test_serializes_camel_case_and_skips_absent() {
        let mut field = FieldDefinition::new("contact.kind", FieldType::Literal);
        field.literal_options = Some(vec![json!("email"), json!("phone")]);
        field.required = Some(true);
        assert_eq!(
            serde_json::to_value(&field).unwrap(),
            json!({
                "key": "contact.kind",
                "label": "Kind",
                "type": "literal",
                "required": true,
                "literalOptions": ["email", "phone"]
            })
        );
    }

    #[test]
    fn test_find_field_in_children() {
        let mut children = FormFields::new();
        children.insert("city".into(), FieldDefinition::new("address.city", FieldType::String));
        let mut fields = FormFields::new();
        fields.insert(
            "address".into(),
            FieldDefinition::new("address", FieldType::Object).with_children(children),
        );
        assert_eq!(find_field(&fields, "address.city").map(|f| f.label.as_str()), Some("City"));
        assert!(find_field(&fields, "address.zip").is_none());
    }
}
