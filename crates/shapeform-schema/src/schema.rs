//! Schema representation types

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node in a structural schema description.
///
/// The tree is owned and therefore acyclic by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub content: SchemaNodeContent,
    pub metadata: SchemaMetadata,
}

/// The closed set of node kinds a schema can be built from
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNodeContent {
    Primitive(PrimitiveKind),
    Literal(LiteralValue),
    Struct(StructSchema),
    Union(UnionSchema),
    Array(ArraySchema),
    Tuple(TupleSchema),
    /// Wraps an inner node with a predicate
    Refinement(RefinementSchema),
    /// Wraps an encoded (`from`) and a decoded (`to`) side
    Transformation(TransformationSchema),
}

/// Primitive keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Void,
    Unknown,
}

impl PrimitiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Void => "void",
            Self::Unknown => "unknown",
        }
    }

    /// `undefined` and `void` stand for an absent value.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Undefined | Self::Void)
    }
}

/// A literal value a schema node can be pinned to
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}

impl LiteralValue {
    /// Convert to a JSON value. Whole numbers become JSON integers.
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => number_to_json(*n),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Null => Value::Null,
        }
    }

    /// Check whether a JSON value equals this literal.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::String(s), Value::String(v)) => s == v,
            (Self::Number(n), Value::Number(v)) => v.as_f64() == Some(*n),
            (Self::Boolean(b), Value::Bool(v)) => b == v,
            (Self::Null, Value::Null) => true,
            _ => false,
        }
    }

    /// Plain string form, used as a key for per-option descriptions
    pub fn as_key(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            other => other.to_json().to_string(),
        }
    }
}

impl std::fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Number(_) => write!(f, "{}", self.to_json()),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// Convert a float to JSON, using an integer when the value is whole.
pub fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Schema for a struct with named properties
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructSchema {
    pub properties: Vec<PropertySignature>,
}

impl StructSchema {
    pub fn property(&self, name: &str) -> Option<&PropertySignature> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A single named property of a struct
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySignature {
    pub name: String,
    pub schema: SchemaNode,
    /// Declared optional at the key level (`key?: T`)
    pub optional: bool,
}

impl PropertySignature {
    pub fn new(name: impl Into<String>, schema: SchemaNode) -> Self {
        Self {
            name: name.into(),
            schema,
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// A property is required unless it is declared optional or its type
    /// admits an absent value.
    pub fn is_required(&self) -> bool {
        if let Some(required) = self.schema.find_required() {
            return required;
        }
        !self.optional && !self.schema.is_optional_union()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnionSchema {
    pub members: Vec<SchemaNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub item: Box<SchemaNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TupleSchema {
    pub elements: Vec<SchemaNode>,
    pub rest: Option<Box<SchemaNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefinementSchema {
    pub from: Box<SchemaNode>,
    pub check: Check,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformationSchema {
    pub from: Box<SchemaNode>,
    pub to: Box<SchemaNode>,
}

/// A regular expression compiled once, when the check is built
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predicates a refinement can apply
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    MinLength(usize),
    MaxLength(usize),
    Pattern(Pattern),
    GreaterThanOrEqual(f64),
    LessThanOrEqual(f64),
    Int,
    NonEmpty,
}

impl Check {
    /// Pattern check; an invalid expression is rejected here rather than
    /// failing every value later.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Pattern::new(pattern).map(Self::Pattern)
    }

    /// Human readable description of what the predicate expects
    pub fn describe(&self) -> String {
        match self {
            Self::MinLength(n) => format!("a string at least {n} character(s) long"),
            Self::MaxLength(n) => format!("a string at most {n} character(s) long"),
            Self::Pattern(p) => format!("a string matching the pattern {p}"),
            Self::GreaterThanOrEqual(n) => {
                format!("a number greater than or equal to {}", number_to_json(*n))
            }
            Self::LessThanOrEqual(n) => {
                format!("a number less than or equal to {}", number_to_json(*n))
            }
            Self::Int => "an integer".to_string(),
            Self::NonEmpty => "a non empty value".to_string(),
        }
    }

    /// Evaluate the predicate. Values of the wrong shape never satisfy it.
    pub fn holds(&self, value: &Value) -> bool {
        match self {
            Self::MinLength(n) => value.as_str().is_some_and(|s| s.chars().count() >= *n),
            Self::MaxLength(n) => value.as_str().is_some_and(|s| s.chars().count() <= *n),
            Self::Pattern(p) => value.as_str().is_some_and(|s| p.is_match(s)),
            Self::GreaterThanOrEqual(n) => value.as_f64().is_some_and(|v| v >= *n),
            Self::LessThanOrEqual(n) => value.as_f64().is_some_and(|v| v <= *n),
            Self::Int => value.as_f64().is_some_and(|v| v.fract() == 0.0),
            Self::NonEmpty => match value {
                Value::String(s) => !s.is_empty(),
                Value::Array(a) => !a.is_empty(),
                Value::Object(o) => !o.is_empty(),
                Value::Null => false,
                _ => true,
            },
        }
    }
}

/// Structured metadata attached to a schema node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Explicit requiredness override
    pub required: Option<bool>,
    pub required_when: Option<RequiredWhen>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    /// Descriptions for individual literal options, keyed by the option's string form
    pub literal_descriptions: IndexMap<String, String>,
    pub custom: IndexMap<String, Value>,
}

/// Makes a field required depending on another field's value.
///
/// With `value` set the field is required when the other field equals it;
/// with `not_value` set it is required when the other field differs from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredWhen {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_value: Option<Value>,
}

impl RequiredWhen {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: Some(value.into()),
            not_value: None,
        }
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: None,
            not_value: Some(value.into()),
        }
    }

    /// Evaluate against the value currently held by `field`.
    pub fn is_active(&self, current: Option<&Value>) -> bool {
        let current = current.unwrap_or(&Value::Null);
        match (&self.value, &self.not_value) {
            (Some(expected), _) => current == expected,
            (None, Some(excluded)) => current != excluded,
            (None, None) => false,
        }
    }
}

impl SchemaNode {
    pub fn new(content: SchemaNodeContent) -> Self {
        Self {
            content,
            metadata: SchemaMetadata::default(),
        }
    }

    /// Whether this node stands for an absent value (`undefined` / `void`)
    pub fn is_absent(&self) -> bool {
        matches!(&self.content, SchemaNodeContent::Primitive(p) if p.is_absent())
    }

    /// A union that has an `undefined`/`void` alternative, possibly nested
    /// below transformation or refinement wrappers.
    pub fn is_optional_union(&self) -> bool {
        match &self.content {
            SchemaNodeContent::Union(u) => u
                .members
                .iter()
                .any(|m| m.is_absent() || m.is_optional_union()),
            SchemaNodeContent::Transformation(t) => t.to.is_optional_union(),
            SchemaNodeContent::Refinement(r) => r.from.is_optional_union(),
            _ => false,
        }
    }

    /// Peel transformation, refinement and single-member unions down to the
    /// node that actually describes the value's shape.
    pub fn unwrap_actual(&self) -> &SchemaNode {
        let mut current = self;
        loop {
            match &current.content {
                SchemaNodeContent::Transformation(t) => current = &t.to,
                SchemaNodeContent::Refinement(r) => current = &r.from,
                SchemaNodeContent::Union(u) => {
                    let mut present = u.members.iter().filter(|m| !m.is_absent());
                    match (present.next(), present.next()) {
                        (Some(only), None) => current = only,
                        _ => return current,
                    }
                }
                _ => return current,
            }
        }
    }

    /// Union members other than `undefined`/`void`, each unwrapped.
    pub fn present_members(&self) -> Vec<&SchemaNode> {
        match &self.content {
            SchemaNodeContent::Union(u) => u
                .members
                .iter()
                .filter(|m| !m.is_absent())
                .flat_map(|m| {
                    let actual = m.unwrap_actual();
                    if matches!(actual.content, SchemaNodeContent::Union(_)) {
                        actual.present_members()
                    } else {
                        vec![actual]
                    }
                })
                .collect(),
            _ => vec![self],
        }
    }

    /// The literal values of a union made only of literals.
    pub fn literal_members(&self) -> Option<Vec<&LiteralValue>> {
        if !matches!(self.content, SchemaNodeContent::Union(_)) {
            return None;
        }
        let members = self.present_members();
        if members.is_empty() {
            return None;
        }
        members
            .into_iter()
            .map(|m| match &m.content {
                SchemaNodeContent::Literal(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    /// Struct alternatives among this node's present members.
    pub fn struct_members(&self) -> Vec<&StructSchema> {
        self.unwrap_actual()
            .present_members()
            .into_iter()
            .filter_map(|m| match &m.content {
                SchemaNodeContent::Struct(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// Short name describing what this node expects, used in diagnostics.
    pub fn expected(&self) -> String {
        if let Some(title) = &self.metadata.title {
            return title.clone();
        }
        match &self.content {
            SchemaNodeContent::Primitive(p) => p.name().to_string(),
            SchemaNodeContent::Literal(l) => l.to_string(),
            SchemaNodeContent::Struct(_) => "struct".to_string(),
            SchemaNodeContent::Union(u) => u
                .members
                .iter()
                .map(SchemaNode::expected)
                .collect::<Vec<_>>()
                .join(" | "),
            SchemaNodeContent::Array(a) => format!("ReadonlyArray<{}>", a.item.expected()),
            SchemaNodeContent::Tuple(t) => format!(
                "readonly [{}]",
                t.elements
                    .iter()
                    .map(SchemaNode::expected)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            SchemaNodeContent::Refinement(r) => r.check.describe(),
            SchemaNodeContent::Transformation(t) => t.to.expected(),
        }
    }
}
