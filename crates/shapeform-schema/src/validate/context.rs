//! Validation state
//!
//! `ValidationState` carries the current data path and the accumulated
//! errors through one validation run.

use crate::path::{DataPath, PathSegment};

use super::error::ValidationError;

/// Final validation output returned to callers.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutput {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

#[derive(Debug, Default)]
pub struct ValidationState {
    pub path: DataPath,
    pub errors: Vec<ValidationError>,
}

impl ValidationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error (validation continues).
    pub fn record_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn path(&self) -> DataPath {
        self.path.clone()
    }

    pub fn push_key(&mut self, key: &str) {
        self.path.0.push(PathSegment::Key(key.to_string()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.path.0.push(PathSegment::Index(index));
    }

    pub fn pop_path(&mut self) {
        self.path.0.pop();
    }

    /// Fresh state at the same path, for trial validation of union members.
    pub fn fork(&self) -> Self {
        Self {
            path: self.path.clone(),
            errors: Vec::new(),
        }
    }

    /// Depth of the deepest recorded error, used to pick the union member
    /// that got furthest before failing.
    pub fn max_error_depth(&self) -> usize {
        self.errors
            .iter()
            .map(|e| e.field_path().len())
            .max()
            .unwrap_or(0)
    }

    pub fn literal_mismatch_count(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| matches!(e, ValidationError::LiteralMismatch { .. }))
            .count()
    }

    pub fn finish(self) -> ValidationOutput {
        ValidationOutput {
            is_valid: self.errors.is_empty(),
            errors: self.errors,
        }
    }
}
