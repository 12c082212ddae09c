#![doc = include_str!("../README.md")]

mod config;
mod error;
mod filler;
mod missing;
mod prompt;
mod provider;
mod types;

pub use config::{AiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::{FillerError, ProviderError};
pub use filler::AiFormFiller;
pub use missing::{build_clarifications, build_summary, detect_missing_fields, is_empty_value};
pub use prompt::{SYSTEM_PROMPT, build_user_prompt, describe_fields};
pub use provider::{OpenAiCompatibleProvider, StructuredRequest, TextGenerationProvider};
pub use types::{
    AiFormFillerRequest, AiFormFillerResponse, ChatMessage, ChatRole, Clarification, FillChunk,
};
