#![doc = include_str!("../README.md")]

mod convert;
mod fields;
pub mod json_schema;

pub use convert::{ConversionError, schema_to_json_schema};
pub use fields::fields_to_json_schema;
pub use json_schema::JsonSchema;
