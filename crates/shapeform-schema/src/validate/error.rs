//! Validation error types

use thiserror::Error;

use crate::path::DataPath;

/// Mismatches between a value and its schema.
///
/// Validation continues after recording one of these, so a single run
/// reports every problem it finds. The messages are deliberately verbose;
/// callers that show them to end users are expected to shorten them.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Expected {expected}, actual {actual} at path {path}")]
    TypeMismatch {
        expected: String,
        actual: String,
        path: DataPath,
    },

    #[error("Missing required key '{field}' at path {path}")]
    MissingKey { field: String, path: DataPath },

    #[error("Expected {expected}, actual {actual} at path {path}")]
    LiteralMismatch {
        expected: String,
        actual: String,
        path: DataPath,
    },

    #[error("Predicate refinement failure: expected {expected}, actual {actual} at path {path}")]
    RefinementFailure {
        expected: String,
        actual: String,
        path: DataPath,
    },

    #[error("Union member mismatch: expected {expected}, actual {actual} at path {path}")]
    NoMemberMatched {
        expected: String,
        actual: String,
        path: DataPath,
    },

    #[error("Tuple length mismatch: expected {expected} element(s), actual {actual} at path {path}")]
    TupleLength {
        expected: usize,
        actual: usize,
        path: DataPath,
    },
}

impl ValidationError {
    pub fn path(&self) -> &DataPath {
        match self {
            Self::TypeMismatch { path, .. }
            | Self::MissingKey { path, .. }
            | Self::LiteralMismatch { path, .. }
            | Self::RefinementFailure { path, .. }
            | Self::NoMemberMatched { path, .. }
            | Self::TupleLength { path, .. } => path,
        }
    }

    /// Path of the offending value. For a missing key this is the key's own
    /// path rather than the enclosing struct's.
    pub fn field_path(&self) -> DataPath {
        match self {
            Self::MissingKey { field, path } => {
                let mut segments = path.0.clone();
                segments.push(crate::path::PathSegment::Key(field.clone()));
                DataPath(segments)
            }
            other => other.path().clone(),
        }
    }
}

/// Decoding failed; carries every issue found
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{}", format_issues(.issues))]
pub struct DecodeError {
    pub issues: Vec<ValidationError>,
}

fn format_issues(issues: &[ValidationError]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
