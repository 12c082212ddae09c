//! Reading and writing values at dot paths
//!
//! `items[0].name` and `items.0.name` address the same value. Purely numeric
//! segments index into arrays; on objects they are used as keys.

use serde_json::{Map, Value};
use shapeform_schema::PathSegment;

pub fn normalize_path(path: &str) -> Vec<PathSegment> {
    path.replace('[', ".")
        .replace(']', "")
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if segment.bytes().all(|b| b.is_ascii_digit()) {
                match segment.parse::<usize>() {
                    Ok(index) => PathSegment::Index(index),
                    Err(_) => PathSegment::Key(segment.to_string()),
                }
            } else {
                PathSegment::Key(segment.to_string())
            }
        })
        .collect()
}

pub fn get_nested_value<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    normalize_path(path)
        .iter()
        .try_fold(value, |current, segment| match (segment, current) {
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
            (segment, Value::Object(map)) => map.get(&segment.to_string()),
            _ => None,
        })
}

/// Most `null` slots a single write may add to an array.
pub const MAX_ARRAY_PADDING: usize = 1024;

/// Write `new` at `path`, creating containers along the way.
///
/// Missing or non-container intermediates are replaced: numeric segments
/// create arrays (padded with `null`), other segments create objects. An
/// empty path replaces the whole value.
///
/// Returns `false` and leaves `root` untouched when an index lies more than
/// [`MAX_ARRAY_PADDING`] slots past the end of its array.
pub fn set_nested_value(root: &mut Value, path: &str, new: Value) -> bool {
    let segments = normalize_path(path);
    if !within_padding(root, &segments) {
        return false;
    }
    set_at(root, &segments, new);
    true
}

/// Like [`set_nested_value`], returning an updated copy. A rejected write
/// returns an unchanged copy.
pub fn with_nested_value(root: &Value, path: &str, new: Value) -> Value {
    let mut updated = root.clone();
    set_nested_value(&mut updated, path, new);
    updated
}

/// Read-only pass over the write path, mirroring the container choices of
/// `set_at`.
fn within_padding(root: &Value, segments: &[PathSegment]) -> bool {
    let mut current = Some(root);
    for segment in segments {
        current = match (segment, current) {
            (PathSegment::Index(index), Some(Value::Array(items))) => {
                if index.saturating_sub(items.len()) > MAX_ARRAY_PADDING {
                    return false;
                }
                items.get(*index)
            }
            (PathSegment::Index(index), value) if !value.is_some_and(Value::is_object) => {
                if *index > MAX_ARRAY_PADDING {
                    return false;
                }
                None
            }
            (segment, Some(Value::Object(map))) => map.get(&segment.to_string()),
            _ => None,
        };
    }
    true
}

fn set_at(target: &mut Value, segments: &[PathSegment], new: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *target = new;
        return;
    };
    match head {
        PathSegment::Index(index) if !target.is_object() => {
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            if let Value::Array(items) = target {
                let Some(len) = index.checked_add(1) else {
                    return;
                };
                if items.len() < len {
                    items.resize(len, Value::Null);
                }
                set_at(&mut items[*index], rest, new);
            }
        }
        _ => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(map) = target {
                let child = map.entry(head.to_string()).or_insert(Value::Null);
                set_at(child, rest, new);
            }
        }
    }
}

/// Deep-merge `source` into `target`.
///
/// Objects merge key by key; `null` in `source` never erases a value in
/// `target`; anything else (arrays included) replaces the target value.
pub fn merge_values(target: &mut Value, source: &Value) {
    match (target, source) {
        (_, Value::Null) => {}
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        if !value.is_null() {
                            target_map.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}
