//! Annotation lookups
//!
//! Metadata may sit on a wrapper rather than on the node that describes the
//! value (`optional(string()).describe(..)` vs `optional(string().describe(..))`).
//! Every lookup checks the node itself first and then cascades through
//! transformation, refinement and union wrappers until a value is found.

use serde_json::Value;

use crate::schema::{RequiredWhen, SchemaMetadata, SchemaNode, SchemaNodeContent};

impl SchemaNode {
    fn find_annotation<T, F>(&self, get: &F) -> Option<T>
    where
        F: Fn(&SchemaMetadata) -> Option<T>,
    {
        if let Some(found) = get(&self.metadata) {
            return Some(found);
        }
        match &self.content {
            SchemaNodeContent::Transformation(t) => t
                .to
                .find_annotation(get)
                .or_else(|| t.from.find_annotation(get)),
            SchemaNodeContent::Refinement(r) => r.from.find_annotation(get),
            // Annotations on literal members describe the option, not the field
            SchemaNodeContent::Union(u) => u
                .members
                .iter()
                .filter(|m| !m.is_absent() && !matches!(m.content, SchemaNodeContent::Literal(_)))
                .find_map(|m| m.find_annotation(get)),
            SchemaNodeContent::Primitive(_)
            | SchemaNodeContent::Literal(_)
            | SchemaNodeContent::Struct(_)
            | SchemaNodeContent::Array(_)
            | SchemaNodeContent::Tuple(_) => None,
        }
    }

    pub fn find_description(&self) -> Option<String> {
        self.find_annotation(&|m: &SchemaMetadata| m.description.clone())
    }

    pub fn find_title(&self) -> Option<String> {
        self.find_annotation(&|m: &SchemaMetadata| m.title.clone())
    }

    pub fn find_required(&self) -> Option<bool> {
        self.find_annotation(&|m: &SchemaMetadata| m.required)
    }

    pub fn find_required_when(&self) -> Option<RequiredWhen> {
        self.find_annotation(&|m: &SchemaMetadata| m.required_when.clone())
    }

    pub fn find_min(&self) -> Option<f64> {
        self.find_annotation(&|m: &SchemaMetadata| m.min)
    }

    pub fn find_max(&self) -> Option<f64> {
        self.find_annotation(&|m: &SchemaMetadata| m.max)
    }

    pub fn find_step(&self) -> Option<f64> {
        self.find_annotation(&|m: &SchemaMetadata| m.step)
    }

    /// Look up a custom annotation by key
    pub fn find_custom(&self, key: &str) -> Option<Value> {
        self.find_annotation(&|m: &SchemaMetadata| m.custom.get(key).cloned())
    }

    /// Descriptions for literal options, merged from every wrapper layer.
    /// Inner layers win over outer ones on key collision.
    pub fn find_literal_descriptions(&self) -> indexmap::IndexMap<String, String> {
        let mut collected = indexmap::IndexMap::new();
        self.collect_literal_descriptions(&mut collected);
        collected
    }

    fn collect_literal_descriptions(&self, out: &mut indexmap::IndexMap<String, String>) {
        for (k, v) in &self.metadata.literal_descriptions {
            out.insert(k.clone(), v.clone());
        }
        match &self.content {
            SchemaNodeContent::Transformation(t) => t.to.collect_literal_descriptions(out),
            SchemaNodeContent::Refinement(r) => r.from.collect_literal_descriptions(out),
            SchemaNodeContent::Union(u) => {
                for member in &u.members {
                    member.collect_literal_descriptions(out);
                }
            }
            SchemaNodeContent::Literal(l) => {
                if let Some(description) = &self.metadata.description {
                    out.insert(l.as_key(), description.clone());
                }
            }
            SchemaNodeContent::Primitive(_)
            | SchemaNodeContent::Struct(_)
            | SchemaNodeContent::Array(_)
            | SchemaNodeContent::Tuple(_) => {}
        }
    }
}
