#![doc = include_str!("../README.md")]

mod coerce;
mod extract;
mod field;
mod generate;
mod infer;
mod messages;
pub mod path;
mod state;

pub use coerce::{coerce_to_existing_type, parse_amount, to_amount_string};
pub use extract::{DISCRIMINANT_KEYS, extract_schema_fields};
pub use field::{FieldCondition, FieldDefinition, FieldType, FormFields, find_field, label_for_key};
pub use generate::{
    generate_form_fields, generate_form_fields_with, is_field_required, is_field_visible,
    merge_schema_fields, visible_fields,
};
pub use infer::{InferOptions, generate_form_fields_from_data, is_numeric_string};
pub use messages::{FALLBACK_MESSAGE, humanize_message, validation_error_map};
pub use path::{get_nested_value, merge_values, normalize_path, set_nested_value, with_nested_value};
pub use state::{FormError, FormState};
