//! Paths into data values

use std::fmt;

/// One step into a nested value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => write!(f, "{k}"),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A location inside a data value, displayed in dot form (`items.0.name`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DataPath(pub Vec<PathSegment>);

impl DataPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dot form without any root marker; the root is the empty string
    pub fn to_dot_path(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "(root)")
        } else {
            write!(f, "{}", self.to_dot_path())
        }
    }
}

impl From<Vec<PathSegment>> for DataPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}
