//! Deriving fields from a schema and its annotations
//!
//! Nodes that cannot be described as form fields produce no fields rather
//! than an error.

use indexmap::IndexMap;
use shapeform_schema::{
    Check, LiteralValue, PrimitiveKind, PropertySignature, SchemaNode, SchemaNodeContent,
    StructSchema,
};

use crate::field::{FieldCondition, FieldDefinition, FieldType, FormFields, join_key};

/// Property names probed, in order, when looking for a union's discriminant
pub const DISCRIMINANT_KEYS: [&str; 3] = ["type", "kind", "variant"];

pub fn extract_schema_fields(schema: &SchemaNode) -> FormFields {
    fields_for_node(schema, "")
}

fn fields_for_node(node: &SchemaNode, prefix: &str) -> FormFields {
    let actual = node.unwrap_actual();
    match &actual.content {
        SchemaNodeContent::Struct(s) => fields_for_struct(s, prefix),
        SchemaNodeContent::Union(_) => fields_for_union(actual, prefix),
        SchemaNodeContent::Primitive(_)
        | SchemaNodeContent::Literal(_)
        | SchemaNodeContent::Array(_)
        | SchemaNodeContent::Tuple(_)
        | SchemaNodeContent::Refinement(_)
        | SchemaNodeContent::Transformation(_) => FormFields::new(),
    }
}

fn fields_for_struct(schema: &StructSchema, prefix: &str) -> FormFields {
    schema
        .properties
        .iter()
        .map(|property| {
            let key = join_key(prefix, &property.name);
            (property.name.clone(), field_for_property(property, key))
        })
        .collect()
}

fn field_for_property(property: &PropertySignature, key: String) -> FieldDefinition {
    let mut field = field_for_type(&property.schema, key);
    field.required = Some(property.is_required());
    annotate(&mut field, &property.schema);
    field
}

fn field_for_type(schema: &SchemaNode, key: String) -> FieldDefinition {
    let actual = schema.unwrap_actual();
    match &actual.content {
        SchemaNodeContent::Primitive(kind) => FieldDefinition::new(key, primitive_type(*kind)),
        SchemaNodeContent::Literal(literal) => literal_field(key, &[literal]),
        SchemaNodeContent::Struct(s) => {
            let children = fields_for_struct(s, &key);
            FieldDefinition::new(key, FieldType::Object).with_children(children)
        }
        SchemaNodeContent::Union(_) => {
            if let Some(literals) = actual.literal_members() {
                return literal_field(key, &literals);
            }
            if !actual.struct_members().is_empty() {
                let children = fields_for_union(actual, &key);
                return FieldDefinition::new(key, FieldType::Object).with_children(children);
            }
            // Mixed primitives: the first alternative decides the input type
            match actual.present_members().first() {
                Some(first) => field_for_type(first, key),
                None => FieldDefinition::new(key, FieldType::String),
            }
        }
        SchemaNodeContent::Array(a) => array_field(key, Some(&a.item)),
        SchemaNodeContent::Tuple(t) => {
            array_field(key, t.rest.as_deref().or_else(|| t.elements.first()))
        }
        SchemaNodeContent::Refinement(r) => field_for_type(&r.from, key),
        SchemaNodeContent::Transformation(t) => field_for_type(&t.to, key),
    }
}

fn primitive_type(kind: PrimitiveKind) -> FieldType {
    match kind {
        PrimitiveKind::Number => FieldType::Number,
        PrimitiveKind::Boolean => FieldType::Boolean,
        PrimitiveKind::String
        | PrimitiveKind::Null
        | PrimitiveKind::Undefined
        | PrimitiveKind::Void
        | PrimitiveKind::Unknown => FieldType::String,
    }
}

fn literal_field(key: String, literals: &[&LiteralValue]) -> FieldDefinition {
    let mut field = FieldDefinition::new(key, FieldType::Literal);
    field.literal_options = Some(literals.iter().map(|l| l.to_json()).collect());
    field
}

fn array_field(key: String, item: Option<&SchemaNode>) -> FieldDefinition {
    let mut field = FieldDefinition::new(key, FieldType::Array);
    let Some(item) = item else {
        return field;
    };
    let item_actual = item.unwrap_actual();
    let literals = match &item_actual.content {
        SchemaNodeContent::Literal(literal) => Some(vec![literal]),
        _ => item_actual.literal_members(),
    };
    if let Some(literals) = literals {
        field.literal_options = Some(literals.iter().map(|l| l.to_json()).collect());
        let descriptions = item.find_literal_descriptions();
        if !descriptions.is_empty() {
            field.literal_options_descriptions = Some(descriptions);
        }
        return field;
    }
    let children = fields_for_node(item, &field.key);
    if !children.is_empty() {
        field.children = Some(children);
    }
    field
}

fn annotate(field: &mut FieldDefinition, schema: &SchemaNode) {
    if let Some(title) = schema.find_title() {
        field.label = title;
    }
    field.description = schema.find_description();
    field.required_when = schema.find_required_when();
    field.min = schema.find_min().or_else(|| {
        check_value(schema, |check| match check {
            Check::GreaterThanOrEqual(n) => Some(*n),
            _ => None,
        })
    });
    field.max = schema.find_max().or_else(|| {
        check_value(schema, |check| match check {
            Check::LessThanOrEqual(n) => Some(*n),
            _ => None,
        })
    });
    field.step = schema
        .find_step()
        .or_else(|| check_value(schema, |check| matches!(check, Check::Int).then_some(1.0)));
    if field.field_type == FieldType::Literal {
        let descriptions = schema.find_literal_descriptions();
        if !descriptions.is_empty() {
            field.literal_options_descriptions = Some(descriptions);
        }
    }
}

/// First value `pick` extracts from the refinement checks wrapping `schema`
fn check_value(schema: &SchemaNode, pick: fn(&Check) -> Option<f64>) -> Option<f64> {
    match &schema.content {
        SchemaNodeContent::Refinement(r) => pick(&r.check).or_else(|| check_value(&r.from, pick)),
        SchemaNodeContent::Transformation(t) => check_value(&t.to, pick),
        SchemaNodeContent::Union(u) => u
            .members
            .iter()
            .filter(|m| !m.is_absent())
            .find_map(|m| check_value(m, pick)),
        _ => None,
    }
}

fn fields_for_union(node: &SchemaNode, prefix: &str) -> FormFields {
    let members = node.present_members();
    let structs: Vec<&StructSchema> = members
        .iter()
        .filter_map(|m| match &m.content {
            SchemaNodeContent::Struct(s) => Some(s),
            _ => None,
        })
        .collect();
    if structs.is_empty() {
        return FormFields::new();
    }
    if structs.len() == members.len()
        && let Some(discriminant) = find_discriminant(&structs)
    {
        return discriminated_fields(&structs, discriminant, prefix);
    }

    let mut fields = FormFields::new();
    for s in structs {
        fields.extend(fields_for_struct(s, prefix));
    }
    fields
}

fn discriminant_literal<'a>(schema: &'a StructSchema, name: &str) -> Option<&'a LiteralValue> {
    match &schema.property(name)?.schema.unwrap_actual().content {
        SchemaNodeContent::Literal(literal) => Some(literal),
        _ => None,
    }
}

/// A property every member pins to a distinct literal
fn find_discriminant(structs: &[&StructSchema]) -> Option<&'static str> {
    DISCRIMINANT_KEYS.into_iter().find(|name| {
        let mut seen: Vec<&LiteralValue> = Vec::new();
        structs.iter().all(|s| match discriminant_literal(s, name) {
            Some(literal) if !seen.contains(&literal) => {
                seen.push(literal);
                true
            }
            _ => false,
        })
    })
}

/// One literal field for the discriminant, then every member's other
/// properties with a condition on the discriminant's value.
///
/// Properties shared by several members get one entry per member; entries
/// after the first are keyed `name@option`. Their `key` stays the data path.
fn discriminated_fields(
    structs: &[&StructSchema],
    discriminant: &str,
    prefix: &str,
) -> FormFields {
    let discriminant_key = join_key(prefix, discriminant);
    let options: Vec<&LiteralValue> = structs
        .iter()
        .filter_map(|s| discriminant_literal(s, discriminant))
        .collect();

    let mut selector = literal_field(discriminant_key.clone(), &options);
    selector.required = Some(true);
    let mut descriptions = IndexMap::new();
    for (s, option) in structs.iter().zip(&options) {
        if let Some(description) = s
            .property(discriminant)
            .and_then(|p| p.schema.find_description())
        {
            descriptions.insert(option.as_key(), description);
        }
    }
    if !descriptions.is_empty() {
        selector.literal_options_descriptions = Some(descriptions);
    }

    let mut fields = FormFields::new();
    fields.insert(discriminant.to_string(), selector);
    for (s, option) in structs.iter().zip(&options) {
        for property in s.properties.iter().filter(|p| p.name != discriminant) {
            let mut field = field_for_property(property, join_key(prefix, &property.name));
            field.condition = Some(FieldCondition {
                field: discriminant_key.clone(),
                value: option.to_json(),
            });
            let entry = if fields.contains_key(&property.name) {
                format!("{}@{}", property.name, option.as_key())
            } else {
                property.name.clone()
            };
            fields.insert(entry, field);
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use shapeform_schema::*;

    #[test]
    fn test_struct_properties() {
        let schema = struct_schema([
            ("projectName", string().describe("Name of the project")),
            ("budget", optional(number().range(Some(0.0), None).step(100.0))),
            ("public", boolean()),
        ]);
        let fields = extract_schema_fields(&schema);

        let name = &fields["projectName"];
        assert_eq!(name.field_type, FieldType::String);
        assert_eq!(name.label, "Project Name");
        assert_eq!(name.required, Some(true));
        assert_eq!(name.description.as_deref(), Some("Name of the project"));

        let budget = &fields["budget"];
        assert_eq!(budget.field_type, FieldType::Number);
        assert_eq!(budget.required, Some(false));
        assert_eq!((budget.min, budget.max, budget.step), (Some(0.0), None, Some(100.0)));

        assert_eq!(fields["public"].field_type, FieldType::Boolean);
    }

    #[test]
    fn test_literal_union_with_descriptions() {
        let schema = struct_schema([(
            "platform",
            union([literal("web").describe("Runs in the browser"), literal("cli")]),
        )]);
        let field = &extract_schema_fields(&schema)["platform"];
        assert_eq!(field.field_type, FieldType::Literal);
        assert_eq!(field.literal_options, Some(vec![json!("web"), json!("cli")]));
        assert_eq!(field.description, None);
        assert_eq!(
            field
                .literal_options_descriptions
                .as_ref()
                .and_then(|d| d.get("web"))
                .map(String::as_str),
            Some("Runs in the browser")
        );
    }

    #[test]
    fn test_discriminated_union_property() {
        let schema = struct_schema([(
            "owner",
            union([
                struct_schema([("kind", literal("person")), ("name", string())]),
                struct_schema([
                    ("kind", literal("company")),
                    ("name", string()),
                    ("vatId", optional(string())),
                ]),
            ]),
        )]);
        let owner = &extract_schema_fields(&schema)["owner"];
        assert_eq!(owner.field_type, FieldType::Object);
        let children = owner.children.as_ref().unwrap();
        assert_eq!(
            children.keys().collect::<Vec<_>>(),
            vec!["kind", "name", "name@company", "vatId"]
        );
        assert_eq!(
            children["kind"].literal_options,
            Some(vec![json!("person"), json!("company")])
        );
        assert_eq!(children["name@company"].key, "owner.name");
        assert_eq!(
            children["vatId"].condition,
            Some(FieldCondition {
                field: "owner.kind".into(),
                value: json!("company"),
            })
        );
    }

    #[test]
    fn test_non_discriminated_union_merges_later_wins() {
        let schema = union([
            struct_schema([("a", string()), ("b", string())]),
            struct_schema([("b", number())]),
        ]);
        let fields = extract_schema_fields(&schema);
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(fields["b"].field_type, FieldType::Number);
        assert!(fields["b"].condition.is_none());
    }

    #[test]
    fn test_arrays() {
        let schema = struct_schema([
            ("members", array(struct_schema([("email", string())]))),
            ("channels", array(literals(["email", "sms"]))),
            ("scores", array(number())),
        ]);
        let fields = extract_schema_fields(&schema);

        let members = &fields["members"];
        assert!(members.is_object_array());
        assert_eq!(members.children.as_ref().unwrap()["email"].key, "members.email");

        let channels = &fields["channels"];
        assert_eq!(channels.field_type, FieldType::Array);
        assert_eq!(channels.children, None);
        assert_eq!(channels.literal_options, Some(vec![json!("email"), json!("sms")]));

        let scores = &fields["scores"];
        assert_eq!(scores.children, None);
        assert_eq!(scores.literal_options, None);
    }

    #[test]
    fn test_refinement_bounds_and_transformations() {
        let schema = struct_schema([
            (
                "seats",
                refine(refine(number(), Check::GreaterThanOrEqual(1.0)), Check::Int),
            ),
            ("amount", number_from_string()),
        ]);
        let fields = extract_schema_fields(&schema);
        assert_eq!(fields["seats"].min, Some(1.0));
        assert_eq!(fields["seats"].step, Some(1.0));
        assert_eq!(fields["amount"].field_type, FieldType::Number);
    }

    #[test]
    fn test_required_when_and_title() {
        let schema = struct_schema([
            ("kind", literals(["person", "company"])),
            (
                "companyName",
                optional(string())
                    .title("Company")
                    .required_when(RequiredWhen::equals("kind", "company")),
            ),
        ]);
        let field = &extract_schema_fields(&schema)["companyName"];
        assert_eq!(field.label, "Company");
        assert_eq!(field.required, Some(false));
        assert_eq!(field.required_when, Some(RequiredWhen::equals("kind", "company")));
    }

    #[test]
    fn test_non_struct_root_yields_nothing() {
        assert!(extract_schema_fields(&string()).is_empty());
        assert!(extract_schema_fields(&array(string())).is_empty());
    }
}
