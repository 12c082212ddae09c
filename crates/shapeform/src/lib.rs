#![doc = include_str!("../README.md")]

mod config;

pub use shapeform_ai as ai;
pub use shapeform_form as form;
pub use shapeform_json_schema as json_schema;
pub use shapeform_query as query;
pub use shapeform_schema as schema;

pub use config::{
    ApiConfig, CONFIG_FILENAME, CredentialsHeader, LoadConfigError, ShapeformConfig, load_config,
};
