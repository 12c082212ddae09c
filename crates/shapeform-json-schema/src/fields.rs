//! Field tree to strict JSON Schema
//!
//! Structured-output models want objects whose properties are all listed as
//! required and that forbid extra keys. Optionality is expressed by making
//! every property nullable instead.

use indexmap::IndexMap;
use serde_json::Value;
use shapeform_form::{FieldDefinition, FieldType, FormFields};

use crate::json_schema::*;

pub fn fields_to_json_schema(fields: &FormFields) -> JsonSchema {
    object_schema(fields, SchemaMetadata::default())
}

fn object_schema(fields: &FormFields, metadata: SchemaMetadata) -> JsonSchema {
    // Fields of different union variants may share one data property
    let mut alternatives: IndexMap<String, Vec<JsonSchema>> = IndexMap::new();
    for field in fields.values() {
        let schema = field_schema(field);
        let entry = alternatives.entry(field.name().to_string()).or_default();
        if !entry.contains(&schema) {
            entry.push(schema);
        }
    }

    let properties: IndexMap<String, JsonSchema> = alternatives
        .into_iter()
        .map(|(name, mut schemas)| {
            let schema = if schemas.len() == 1 {
                schemas.remove(0)
            } else {
                JsonSchema::AnyOf(AnyOfSchema {
                    schemas,
                    metadata: SchemaMetadata::default(),
                })
            };
            (name, schema.into_nullable())
        })
        .collect();
    let required = properties.keys().cloned().collect();

    JsonSchema::Typed(TypedSchema::Object(ObjectSchema {
        properties: Some(properties),
        required: Some(required),
        additional_properties: Some(AdditionalProperties::Bool(false)),
        metadata,
    }))
}

fn field_schema(field: &FieldDefinition) -> JsonSchema {
    let metadata = SchemaMetadata {
        title: None,
        description: describe_field(field),
    };
    match field.field_type {
        FieldType::String => JsonSchema::string().with_metadata(&metadata),
        FieldType::Number => JsonSchema::Typed(TypedSchema::Number(NumberSchema {
            minimum: field.min,
            maximum: field.max,
            multiple_of: None,
            metadata,
        })),
        FieldType::Boolean => JsonSchema::boolean().with_metadata(&metadata),
        FieldType::Literal => match literal_options(field) {
            Some(values) => JsonSchema::Enum(EnumSchema { values, metadata }),
            None => JsonSchema::string().with_metadata(&metadata),
        },
        FieldType::Object => object_schema(
            field.children.as_ref().unwrap_or(&FormFields::new()),
            metadata,
        ),
        FieldType::Array => {
            let items = match (&field.children, literal_options(field)) {
                (Some(children), _) if !children.is_empty() => {
                    object_schema(children, SchemaMetadata::default())
                }
                (_, Some(values)) => JsonSchema::Enum(EnumSchema {
                    values,
                    metadata: SchemaMetadata::default(),
                }),
                _ => JsonSchema::string(),
            };
            JsonSchema::Typed(TypedSchema::Array(ArraySchema {
                items: Some(Box::new(items)),
                min_items: None,
                max_items: None,
                metadata,
            }))
        }
    }
}

fn literal_options(field: &FieldDefinition) -> Option<Vec<Value>> {
    field
        .literal_options
        .as_ref()
        .filter(|options| !options.is_empty())
        .cloned()
}

/// Field description, extended with option descriptions and the condition
/// under which the field applies.
fn describe_field(field: &FieldDefinition) -> Option<String> {
    let mut parts: Vec<String> = field.description.iter().cloned().collect();
    if let Some(descriptions) = &field.literal_options_descriptions
        && !descriptions.is_empty()
    {
        let options = descriptions
            .iter()
            .map(|(option, description)| format!("{option}: {description}"))
            .collect::<Vec<_>>()
            .join("; ");
        parts.push(format!("Options ({options})."));
    }
    if let Some(condition) = &field.condition {
        parts.push(format!(
            "Only applies when {} is {}.",
            condition.field, condition.value
        ));
    }
    (!parts.is_empty()).then(|| parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shapeform_form::{FieldCondition, extract_schema_fields};
    use shapeform_schema::*;

    #[test]
    fn test_flat_fields() {
        let schema = struct_schema([
            ("projectName", string().describe("Name of the project")),
            ("teamSize", optional(number())),
            ("projectType", literals(["web", "mobile"])),
            ("public", boolean()),
        ]);
        let json = serde_json::to_value(fields_to_json_schema(&extract_schema_fields(&schema))).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "object",
                "properties": {
                    "projectName": {"anyOf": [
                        {"type": "string", "description": "Name of the project"},
                        {"type": "null"}
                    ]},
                    "teamSize": {"anyOf": [{"type": "number"}, {"type": "null"}]},
                    "projectType": {"anyOf": [{"enum": ["web", "mobile"]}, {"type": "null"}]},
                    "public": {"anyOf": [{"type": "boolean"}, {"type": "null"}]}
                },
                "required": ["projectName", "teamSize", "projectType", "public"],
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn test_nested_objects_and_arrays() {
        let schema = struct_schema([
            ("marketing", struct_schema([("productName", string())])),
            ("members", array(struct_schema([("email", string())]))),
            ("channels", array(literals(["email", "sms"]))),
        ]);
        let json = serde_json::to_value(fields_to_json_schema(&extract_schema_fields(&schema))).unwrap();
        let nested = |name: &str| json["properties"][name]["anyOf"][0].clone();

        assert_eq!(
            nested("marketing"),
            json!({
                "type": "object",
                "properties": {
                    "productName": {"anyOf": [{"type": "string"}, {"type": "null"}]}
                },
                "required": ["productName"],
                "additionalProperties": false
            })
        );
        assert_eq!(nested("members")["items"]["required"], json!(["email"]));
        assert_eq!(
            nested("channels"),
            json!({"type": "array", "items": {"enum": ["email", "sms"]}})
        );
    }

    #[test]
    fn test_shared_property_of_variants_becomes_any_of() {
        let mut first = FieldDefinition::new("value", FieldType::String);
        first.condition = Some(FieldCondition {
            field: "kind".into(),
            value: json!("text"),
        });
        let mut second = FieldDefinition::new("value", FieldType::Number);
        second.condition = Some(FieldCondition {
            field: "kind".into(),
            value: json!("count"),
        });
        let mut fields = FormFields::new();
        fields.insert("value".into(), first);
        fields.insert("value@count".into(), second);

        let json = serde_json::to_value(fields_to_json_schema(&fields)).unwrap();
        assert_eq!(json["required"], json!(["value"]));
        assert_eq!(
            json["properties"]["value"],
            json!({"anyOf": [
                {"type": "string", "description": "Only applies when kind is \"text\"."},
                {"type": "number", "description": "Only applies when kind is \"count\"."},
                {"type": "null"}
            ]})
        );
    }

    #[test]
    fn test_option_descriptions_are_carried() {
        let schema = struct_schema([(
            "platform",
            union([literal("web").describe("Runs in a browser"), literal("cli")]),
        )]);
        let json = serde_json::to_value(fields_to_json_schema(&extract_schema_fields(&schema))).unwrap();
        assert_eq!(
            json["properties"]["platform"]["anyOf"][0]["description"],
            json!("Options (web: Runs in a browser).")
        );
    }
}
