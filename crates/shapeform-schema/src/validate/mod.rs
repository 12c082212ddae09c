//! Validating JSON values against a schema
//!
//! Transformations are validated on their decoded (`to`) side: form data
//! holds values in their decoded shape.

mod context;
mod error;

pub use context::{ValidationOutput, ValidationState};
pub use error::{DecodeError, ValidationError};

use serde_json::Value;

use crate::schema::{LiteralValue, PrimitiveKind, SchemaNode, SchemaNodeContent};

/// Validate `value`, collecting every error.
pub fn validate(schema: &SchemaNode, value: &Value) -> ValidationOutput {
    let mut state = ValidationState::new();
    validate_node(&mut state, schema, value);
    state.finish()
}

/// Validate and hand the value back, or fail with every issue found.
pub fn decode(schema: &SchemaNode, value: Value) -> Result<Value, DecodeError> {
    let output = validate(schema, &value);
    if output.is_valid {
        Ok(value)
    } else {
        Err(DecodeError {
            issues: output.errors,
        })
    }
}

/// Short rendering of a value for diagnostics
pub fn describe_actual(value: &Value) -> String {
    const LIMIT: usize = 60;
    let rendered = value.to_string();
    if rendered.chars().count() > LIMIT {
        let truncated: String = rendered.chars().take(LIMIT).collect();
        format!("{truncated}…")
    } else {
        rendered
    }
}

fn validate_node(state: &mut ValidationState, node: &SchemaNode, value: &Value) {
    match &node.content {
        SchemaNodeContent::Primitive(kind) => validate_primitive(state, node, *kind, value),
        SchemaNodeContent::Literal(literal) => validate_literal(state, literal, value),
        SchemaNodeContent::Struct(s) => {
            let Some(object) = value.as_object() else {
                state.record_error(ValidationError::TypeMismatch {
                    expected: node.expected(),
                    actual: describe_actual(value),
                    path: state.path(),
                });
                return;
            };
            for property in &s.properties {
                match object.get(&property.name) {
                    Some(Value::Null) if property.optional && !admits_null(&property.schema) => {}
                    Some(field_value) => {
                        state.push_key(&property.name);
                        validate_node(state, &property.schema, field_value);
                        state.pop_path();
                    }
                    None => {
                        if !property.optional && !admits_absent(&property.schema) {
                            state.record_error(ValidationError::MissingKey {
                                field: property.name.clone(),
                                path: state.path(),
                            });
                        }
                    }
                }
            }
        }
        SchemaNodeContent::Union(u) => {
            let mut best: Option<ValidationState> = None;
            for member in &u.members {
                let mut trial = state.fork();
                validate_node(&mut trial, member, value);
                if !trial.has_errors() {
                    return;
                }
                // Members whose literal tags matched are preferred, then the
                // one that got furthest, then the one with fewer errors.
                let better = match &best {
                    None => true,
                    Some(current) => {
                        let rank = |s: &ValidationState| {
                            (
                                std::cmp::Reverse(s.literal_mismatch_count()),
                                s.max_error_depth(),
                                std::cmp::Reverse(s.error_count()),
                            )
                        };
                        rank(&trial) > rank(current)
                    }
                };
                if better {
                    best = Some(trial);
                }
            }
            match best {
                // A member that got past the union's own level is reported directly
                Some(trial) if trial.max_error_depth() > state.path.len() => {
                    for error in trial.errors {
                        state.record_error(error);
                    }
                }
                _ => state.record_error(ValidationError::NoMemberMatched {
                    expected: node.expected(),
                    actual: describe_actual(value),
                    path: state.path(),
                }),
            }
        }
        SchemaNodeContent::Array(a) => {
            let Some(items) = value.as_array() else {
                state.record_error(ValidationError::TypeMismatch {
                    expected: node.expected(),
                    actual: describe_actual(value),
                    path: state.path(),
                });
                return;
            };
            for (index, item) in items.iter().enumerate() {
                state.push_index(index);
                validate_node(state, &a.item, item);
                state.pop_path();
            }
        }
        SchemaNodeContent::Tuple(t) => {
            let Some(items) = value.as_array() else {
                state.record_error(ValidationError::TypeMismatch {
                    expected: node.expected(),
                    actual: describe_actual(value),
                    path: state.path(),
                });
                return;
            };
            let too_short = items.len() < t.elements.len();
            let too_long = t.rest.is_none() && items.len() > t.elements.len();
            if too_short || too_long {
                state.record_error(ValidationError::TupleLength {
                    expected: t.elements.len(),
                    actual: items.len(),
                    path: state.path(),
                });
                return;
            }
            for (index, item) in items.iter().enumerate() {
                let element = t.elements.get(index).or(t.rest.as_deref());
                if let Some(element) = element {
                    state.push_index(index);
                    validate_node(state, element, item);
                    state.pop_path();
                }
            }
        }
        SchemaNodeContent::Refinement(r) => {
            let before = state.error_count();
            validate_node(state, &r.from, value);
            if state.error_count() == before && !r.check.holds(value) {
                state.record_error(ValidationError::RefinementFailure {
                    expected: node
                        .metadata
                        .title
                        .clone()
                        .unwrap_or_else(|| r.check.describe()),
                    actual: describe_actual(value),
                    path: state.path(),
                });
            }
        }
        SchemaNodeContent::Transformation(t) => validate_node(state, &t.to, value),
    }
}

fn validate_primitive(
    state: &mut ValidationState,
    node: &SchemaNode,
    kind: PrimitiveKind,
    value: &Value,
) {
    let ok = match kind {
        PrimitiveKind::String => value.is_string(),
        PrimitiveKind::Number => value.is_number(),
        PrimitiveKind::Boolean => value.is_boolean(),
        // JSON has no `undefined`; an explicit null is the closest thing
        PrimitiveKind::Null | PrimitiveKind::Undefined | PrimitiveKind::Void => value.is_null(),
        PrimitiveKind::Unknown => true,
    };
    if !ok {
        state.record_error(ValidationError::TypeMismatch {
            expected: node.expected(),
            actual: describe_actual(value),
            path: state.path(),
        });
    }
}

fn validate_literal(state: &mut ValidationState, literal: &LiteralValue, value: &Value) {
    if !literal.matches(value) {
        state.record_error(ValidationError::LiteralMismatch {
            expected: literal.to_string(),
            actual: describe_actual(value),
            path: state.path(),
        });
    }
}

fn admits_absent(node: &SchemaNode) -> bool {
    match &node.content {
        SchemaNodeContent::Primitive(kind) => {
            kind.is_absent() || matches!(kind, PrimitiveKind::Unknown)
        }
        SchemaNodeContent::Union(u) => u.members.iter().any(admits_absent),
        SchemaNodeContent::Refinement(r) => admits_absent(&r.from),
        SchemaNodeContent::Transformation(t) => admits_absent(&t.to),
        SchemaNodeContent::Literal(_)
        | SchemaNodeContent::Struct(_)
        | SchemaNodeContent::Array(_)
        | SchemaNodeContent::Tuple(_) => false,
    }
}

fn admits_null(node: &SchemaNode) -> bool {
    match &node.content {
        SchemaNodeContent::Primitive(kind) => !matches!(
            kind,
            PrimitiveKind::String | PrimitiveKind::Number | PrimitiveKind::Boolean
        ),
        SchemaNodeContent::Literal(l) => matches!(l, LiteralValue::Null),
        SchemaNodeContent::Union(u) => u.members.iter().any(admits_null),
        SchemaNodeContent::Refinement(r) => admits_null(&r.from),
        SchemaNodeContent::Transformation(t) => admits_null(&t.to),
        SchemaNodeContent::Struct(_) | SchemaNodeContent::Array(_) | SchemaNodeContent::Tuple(_) => {
            false
        }
    }
}
