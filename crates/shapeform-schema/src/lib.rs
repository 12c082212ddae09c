#![doc = include_str!("../README.md")]

mod annotations;
mod builder;
pub mod path;
mod schema;
pub mod validate;

pub use builder::*;
pub use path::{DataPath, PathSegment};
pub use schema::*;
pub use validate::{DecodeError, ValidationError, ValidationOutput, decode, validate};
