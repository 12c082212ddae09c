//! JSON Schema representation as Rust ADT
//!
//! Each variant carries only the keywords relevant to it. Absent keywords are
//! omitted when serializing, so output stays acceptable to strict consumers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata shared by every schema kind
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// JSON Schema root type
///
/// Untagged: the variant is picked from the keywords present, so more
/// specific variants come first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
#[allow(clippy::large_enum_variant)]
pub enum JsonSchema {
    /// `true` accepts everything, `false` nothing
    Boolean(bool),
    Reference(ReferenceSchema),
    Enum(EnumSchema),
    Const(ConstSchema),
    AllOf(AllOfSchema),
    AnyOf(AnyOfSchema),
    OneOf(OneOfSchema),
    Typed(TypedSchema),
    /// Untyped schemas, including `{}`
    Generic(GenericSchema),
}

impl JsonSchema {
    pub fn string() -> Self {
        Self::Typed(TypedSchema::String(StringSchema::default()))
    }

    pub fn number() -> Self {
        Self::Typed(TypedSchema::Number(NumberSchema::default()))
    }

    pub fn boolean() -> Self {
        Self::Typed(TypedSchema::Boolean(BooleanSchema::default()))
    }

    pub fn null() -> Self {
        Self::Typed(TypedSchema::Null(NullSchema::default()))
    }

    pub fn metadata(&self) -> Option<&SchemaMetadata> {
        match self {
            Self::Boolean(_) => None,
            Self::Reference(s) => Some(&s.metadata),
            Self::Enum(s) => Some(&s.metadata),
            Self::Const(s) => Some(&s.metadata),
            Self::AllOf(s) => Some(&s.metadata),
            Self::AnyOf(s) => Some(&s.metadata),
            Self::OneOf(s) => Some(&s.metadata),
            Self::Typed(t) => Some(t.metadata()),
            Self::Generic(s) => Some(&s.metadata),
        }
    }

    pub fn metadata_mut(&mut self) -> Option<&mut SchemaMetadata> {
        match self {
            Self::Boolean(_) => None,
            Self::Reference(s) => Some(&mut s.metadata),
            Self::Enum(s) => Some(&mut s.metadata),
            Self::Const(s) => Some(&mut s.metadata),
            Self::AllOf(s) => Some(&mut s.metadata),
            Self::AnyOf(s) => Some(&mut s.metadata),
            Self::OneOf(s) => Some(&mut s.metadata),
            Self::Typed(t) => Some(t.metadata_mut()),
            Self::Generic(s) => Some(&mut s.metadata),
        }
    }

    /// Set title and description where `metadata` has them.
    pub fn with_metadata(mut self, metadata: &SchemaMetadata) -> Self {
        if let Some(target) = self.metadata_mut() {
            if metadata.title.is_some() {
                target.title.clone_from(&metadata.title);
            }
            if metadata.description.is_some() {
                target.description.clone_from(&metadata.description);
            }
        }
        self
    }

    /// `anyOf [self, null]`; an existing `anyOf` gains a null alternative.
    pub fn into_nullable(self) -> Self {
        let null = Self::null();
        match self {
            Self::AnyOf(mut any) => {
                if !any.schemas.contains(&null) {
                    any.schemas.push(null);
                }
                Self::AnyOf(any)
            }
            other => Self::AnyOf(AnyOfSchema {
                schemas: vec![other, null],
                metadata: SchemaMetadata::default(),
            }),
        }
    }
}

/// Reference schema (`$ref`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceSchema {
    #[serde(rename = "$ref")]
    pub reference: String,

    #[serde(flatten)]
    pub metadata: SchemaMetadata,
}

/// Fixed set of allowed values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumSchema {
    #[serde(rename = "enum")]
    pub values: Vec<Value>,

    #[serde(flatten)]
    pub metadata: SchemaMetadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstSchema {
    #[serde(rename = "const")]
    pub value: Value,

    #[serde(flatten)]
    pub metadata: SchemaMetadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllOfSchema {
    #[serde(rename = "allOf")]
    pub schemas: Vec<JsonSchema>,

    #[serde(flatten)]
    pub metadata: SchemaMetadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnyOfSchema {
    #[serde(rename = "anyOf")]
    pub schemas: Vec<JsonSchema>,

    #[serde(flatten)]
    pub metadata: SchemaMetadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OneOfSchema {
    #[serde(rename = "oneOf")]
    pub schemas: Vec<JsonSchema>,

    #[serde(flatten)]
    pub metadata: SchemaMetadata,
}

/// Typed schema (discriminated by the `type` keyword)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum TypedSchema {
    String(StringSchema),
    Number(NumberSchema),
    Integer(IntegerSchema),
    Boolean(BooleanSchema),
    Null(NullSchema),
    Array(ArraySchema),
    Object(ObjectSchema),
}

impl TypedSchema {
    pub fn metadata(&self) -> &SchemaMetadata {
        match self {
            Self::String(s) => &s.metadata,
            Self::Number(s) => &s.metadata,
            Self::Integer(s) => &s.metadata,
            Self::Boolean(s) => &s.metadata,
            Self::Null(s) => &s.metadata,
            Self::Array(s) => &s.metadata,
            Self::Object(s) => &s.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut SchemaMetadata {
        match self {
            Self::String(s) => &mut s.metadata,
            Self::Number(s) => &mut s.metadata,
            Self::Integer(s) => &mut s.metadata,
            Self::Boolean(s) => &mut s.metadata,
            Self::Null(s) => &mut s.metadata,
            Self::Array(s) => &mut s.metadata,
            Self::Object(s) => &mut s.metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StringSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(flatten)]
    pub metadata: SchemaMetadata,
}

/// Floating point numbers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NumberSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,

    #[serde(flatten)]
    pub metadata: SchemaMetadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IntegerSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<i64>,

    #[serde(flatten)]
    pub metadata: SchemaMetadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BooleanSchema {
    #[serde(flatten)]
    pub metadata: SchemaMetadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NullSchema {
    #[serde(flatten)]
    pub metadata: SchemaMetadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArraySchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,

    #[serde(flatten)]
    pub metadata: SchemaMetadata,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ObjectSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, JsonSchema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(flatten)]
    pub metadata: SchemaMetadata,
}

/// Additional properties policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<JsonSchema>),
}

/// Catch-all for schemas without a `type`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenericSchema {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(rename = "$defs", default, skip_serializing_if = "Option::is_none")]
    pub defs: Option<IndexMap<String, JsonSchema>>,

    #[serde(flatten)]
    pub metadata: SchemaMetadata,
}
