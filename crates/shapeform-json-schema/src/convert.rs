//! Conversion from schema trees to JSON Schema (Draft-07)
//!
//! Transformations convert their decoded side. Some constructs have no JSON
//! Schema counterpart and fail the conversion.

use indexmap::IndexMap;
use shapeform_schema::{
    ArraySchema as SourceArraySchema, Check, LiteralValue, PrimitiveKind, SchemaNode,
    SchemaNodeContent, StructSchema, UnionSchema,
};

use crate::json_schema::*;

/// Errors that can occur during conversion
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Fixed-length tuples are not expressible in the subset we emit
    #[error("Tuple schemas cannot be represented in JSON Schema")]
    TupleNotSupported,

    /// `undefined`/`void` only make sense as the absent alternative of a union
    #[error("`{0}` can only appear as a union member")]
    AbsentOutsideUnion(&'static str),

    /// NaN or infinity in a literal or bound
    #[error("Invalid number value: {0}")]
    InvalidNumberValue(String),
}

pub fn schema_to_json_schema(schema: &SchemaNode) -> Result<JsonSchema, ConversionError> {
    convert_node(schema)
}

fn convert_node(node: &SchemaNode) -> Result<JsonSchema, ConversionError> {
    let metadata = convert_metadata(node);
    let converted = match &node.content {
        SchemaNodeContent::Primitive(kind) => convert_primitive(*kind)?,
        SchemaNodeContent::Literal(literal) => JsonSchema::Const(ConstSchema {
            value: literal_to_json(literal)?,
            metadata: SchemaMetadata::default(),
        }),
        SchemaNodeContent::Struct(s) => convert_struct(s)?,
        SchemaNodeContent::Union(u) => convert_union(u)?,
        SchemaNodeContent::Array(a) => convert_array(a)?,
        SchemaNodeContent::Tuple(_) => return Err(ConversionError::TupleNotSupported),
        SchemaNodeContent::Refinement(r) => apply_check(convert_node(&r.from)?, &r.check)?,
        SchemaNodeContent::Transformation(t) => convert_node(&t.to)?,
    };
    Ok(converted.with_metadata(&metadata))
}

fn convert_metadata(node: &SchemaNode) -> SchemaMetadata {
    SchemaMetadata {
        title: node.metadata.title.clone(),
        description: node.metadata.description.clone(),
    }
}

fn convert_primitive(kind: PrimitiveKind) -> Result<JsonSchema, ConversionError> {
    Ok(match kind {
        PrimitiveKind::String => JsonSchema::string(),
        PrimitiveKind::Number => JsonSchema::number(),
        PrimitiveKind::Boolean => JsonSchema::boolean(),
        PrimitiveKind::Null => JsonSchema::null(),
        PrimitiveKind::Unknown => JsonSchema::Generic(GenericSchema::default()),
        PrimitiveKind::Undefined | PrimitiveKind::Void => {
            return Err(ConversionError::AbsentOutsideUnion(kind.name()));
        }
    })
}

fn literal_to_json(literal: &LiteralValue) -> Result<serde_json::Value, ConversionError> {
    match literal {
        LiteralValue::Number(n) if !n.is_finite() => {
            Err(ConversionError::InvalidNumberValue(n.to_string()))
        }
        other => Ok(other.to_json()),
    }
}

fn convert_struct(schema: &StructSchema) -> Result<JsonSchema, ConversionError> {
    let mut properties = IndexMap::new();
    let mut required = Vec::new();

    for property in &schema.properties {
        properties.insert(property.name.clone(), convert_node(&property.schema)?);
        if property.is_required() {
            required.push(property.name.clone());
        }
    }

    Ok(JsonSchema::Typed(TypedSchema::Object(ObjectSchema {
        properties: (!properties.is_empty()).then_some(properties),
        required: (!required.is_empty()).then_some(required),
        // Extra keys are accepted by validation as well
        additional_properties: None,
        metadata: SchemaMetadata::default(),
    })))
}

/// Literal-only unions become `enum`; absent alternatives are dropped since
/// optionality lives in the parent's `required` list.
fn convert_union(schema: &UnionSchema) -> Result<JsonSchema, ConversionError> {
    let present: Vec<&SchemaNode> = schema.members.iter().filter(|m| !m.is_absent()).collect();

    let literals: Option<Vec<&LiteralValue>> = present
        .iter()
        .map(|m| match &m.content {
            SchemaNodeContent::Literal(l) => Some(l),
            _ => None,
        })
        .collect();
    if let Some(literals) = literals
        && literals.len() > 1
    {
        let values = literals
            .into_iter()
            .map(literal_to_json)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(JsonSchema::Enum(EnumSchema {
            values,
            metadata: SchemaMetadata::default(),
        }));
    }

    match present.as_slice() {
        [] => Ok(JsonSchema::Boolean(false)),
        [only] => convert_node(only),
        members => Ok(JsonSchema::AnyOf(AnyOfSchema {
            schemas: members
                .iter()
                .map(|m| convert_node(m))
                .collect::<Result<Vec<_>, _>>()?,
            metadata: SchemaMetadata::default(),
        })),
    }
}

fn convert_array(schema: &SourceArraySchema) -> Result<JsonSchema, ConversionError> {
    Ok(JsonSchema::Typed(TypedSchema::Array(ArraySchema {
        items: Some(Box::new(convert_node(&schema.item)?)),
        min_items: None,
        max_items: None,
        metadata: SchemaMetadata::default(),
    })))
}

/// Fold a refinement's predicate into the converted inner schema. Checks
/// that do not apply to the inner type are dropped.
fn apply_check(schema: JsonSchema, check: &Check) -> Result<JsonSchema, ConversionError> {
    let finite = |n: f64| {
        if n.is_finite() {
            Ok(n)
        } else {
            Err(ConversionError::InvalidNumberValue(n.to_string()))
        }
    };
    let typed = match schema {
        JsonSchema::Typed(typed) => typed,
        other => return Ok(other),
    };
    let typed = match (typed, check) {
        (TypedSchema::String(mut s), Check::MinLength(n)) => {
            s.min_length = Some(u32::try_from(*n).unwrap_or(u32::MAX));
            TypedSchema::String(s)
        }
        (TypedSchema::String(mut s), Check::MaxLength(n)) => {
            s.max_length = Some(u32::try_from(*n).unwrap_or(u32::MAX));
            TypedSchema::String(s)
        }
        (TypedSchema::String(mut s), Check::NonEmpty) => {
            s.min_length = Some(s.min_length.unwrap_or(0).max(1));
            TypedSchema::String(s)
        }
        (TypedSchema::String(mut s), Check::Pattern(p)) => {
            s.pattern = Some(p.as_str().to_string());
            TypedSchema::String(s)
        }
        (TypedSchema::Array(mut a), Check::NonEmpty) => {
            a.min_items = Some(a.min_items.unwrap_or(0).max(1));
            TypedSchema::Array(a)
        }
        (TypedSchema::Number(mut n), Check::GreaterThanOrEqual(v)) => {
            n.minimum = Some(finite(*v)?);
            TypedSchema::Number(n)
        }
        (TypedSchema::Number(mut n), Check::LessThanOrEqual(v)) => {
            n.maximum = Some(finite(*v)?);
            TypedSchema::Number(n)
        }
        (TypedSchema::Number(n), Check::Int) => TypedSchema::Integer(IntegerSchema {
            minimum: n.minimum.map(|v| v.ceil() as i64),
            maximum: n.maximum.map(|v| v.floor() as i64),
            multiple_of: None,
            metadata: n.metadata,
        }),
        (TypedSchema::Integer(mut i), Check::GreaterThanOrEqual(v)) => {
            i.minimum = Some(finite(*v)?.ceil() as i64);
            TypedSchema::Integer(i)
        }
        (TypedSchema::Integer(mut i), Check::LessThanOrEqual(v)) => {
            i.maximum = Some(finite(*v)?.floor() as i64);
            TypedSchema::Integer(i)
        }
        (typed, _) => typed,
    };
    Ok(JsonSchema::Typed(typed))
}
