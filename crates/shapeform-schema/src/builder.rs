//! Constructors for building schemas programmatically

use serde_json::Value;

use crate::schema::{
    ArraySchema, Check, LiteralValue, PrimitiveKind, PropertySignature, RefinementSchema,
    RequiredWhen, SchemaNode, SchemaNodeContent, StructSchema, TransformationSchema, TupleSchema,
    UnionSchema,
};

fn primitive(kind: PrimitiveKind) -> SchemaNode {
    SchemaNode::new(SchemaNodeContent::Primitive(kind))
}

pub fn string() -> SchemaNode {
    primitive(PrimitiveKind::String)
}

pub fn number() -> SchemaNode {
    primitive(PrimitiveKind::Number)
}

pub fn boolean() -> SchemaNode {
    primitive(PrimitiveKind::Boolean)
}

pub fn null() -> SchemaNode {
    primitive(PrimitiveKind::Null)
}

pub fn undefined() -> SchemaNode {
    primitive(PrimitiveKind::Undefined)
}

pub fn void() -> SchemaNode {
    primitive(PrimitiveKind::Void)
}

pub fn unknown() -> SchemaNode {
    primitive(PrimitiveKind::Unknown)
}

pub fn literal(value: impl Into<LiteralValue>) -> SchemaNode {
    SchemaNode::new(SchemaNodeContent::Literal(value.into()))
}

/// A union of literal values
pub fn literals<I, L>(values: I) -> SchemaNode
where
    I: IntoIterator<Item = L>,
    L: Into<LiteralValue>,
{
    union(values.into_iter().map(literal))
}

/// A struct whose properties are all declared at the key level as present.
/// Use [`optional`] on a property's schema to make it optional.
pub fn struct_schema<I, K>(properties: I) -> SchemaNode
where
    I: IntoIterator<Item = (K, SchemaNode)>,
    K: Into<String>,
{
    struct_from_properties(
        properties
            .into_iter()
            .map(|(name, schema)| PropertySignature::new(name, schema)),
    )
}

pub fn struct_from_properties<I>(properties: I) -> SchemaNode
where
    I: IntoIterator<Item = PropertySignature>,
{
    SchemaNode::new(SchemaNodeContent::Struct(StructSchema {
        properties: properties.into_iter().collect(),
    }))
}

pub fn union<I>(members: I) -> SchemaNode
where
    I: IntoIterator<Item = SchemaNode>,
{
    SchemaNode::new(SchemaNodeContent::Union(UnionSchema {
        members: members.into_iter().collect(),
    }))
}

/// `T | undefined`
pub fn optional(schema: SchemaNode) -> SchemaNode {
    union([schema, undefined()])
}

/// `T | null`
pub fn nullable(schema: SchemaNode) -> SchemaNode {
    union([schema, null()])
}

pub fn array(item: SchemaNode) -> SchemaNode {
    SchemaNode::new(SchemaNodeContent::Array(ArraySchema {
        item: Box::new(item),
    }))
}

pub fn tuple<I>(elements: I) -> SchemaNode
where
    I: IntoIterator<Item = SchemaNode>,
{
    SchemaNode::new(SchemaNodeContent::Tuple(TupleSchema {
        elements: elements.into_iter().collect(),
        rest: None,
    }))
}

pub fn refine(schema: SchemaNode, check: Check) -> SchemaNode {
    SchemaNode::new(SchemaNodeContent::Refinement(RefinementSchema {
        from: Box::new(schema),
        check,
    }))
}

pub fn transform(from: SchemaNode, to: SchemaNode) -> SchemaNode {
    SchemaNode::new(SchemaNodeContent::Transformation(TransformationSchema {
        from: Box::new(from),
        to: Box::new(to),
    }))
}

/// A number decoded from its string form
pub fn number_from_string() -> SchemaNode {
    transform(string(), number())
}

impl SchemaNode {
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    /// Force the field to be treated as required regardless of its type
    pub fn required(mut self) -> Self {
        self.metadata.required = Some(true);
        self
    }

    pub fn required_when(mut self, rule: RequiredWhen) -> Self {
        self.metadata.required_when = Some(rule);
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.metadata.min = min;
        self.metadata.max = max;
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.metadata.step = Some(step);
        self
    }

    pub fn literal_description(
        mut self,
        option: impl Into<LiteralValue>,
        description: impl Into<String>,
    ) -> Self {
        self.metadata
            .literal_descriptions
            .insert(option.into().as_key(), description.into());
        self
    }

    pub fn annotate(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.custom.insert(key.into(), value.into());
        self
    }
}
