//! Request, response and streaming types exchanged with callers

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shapeform_form::FormFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiFormFillerRequest {
    /// The user's latest natural-language input
    pub prompt: String,
    pub fields: FormFields,
    /// Earlier turns of the conversation, oldest first
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Data already present in the form
    #[serde(default)]
    pub partial_data: Value,
    /// Extra instructions for the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
}

impl AiFormFillerRequest {
    pub fn new(prompt: impl Into<String>, fields: FormFields) -> Self {
        Self {
            prompt: prompt.into(),
            fields,
            messages: Vec::new(),
            partial_data: Value::Null,
            rules: None,
        }
    }

    pub fn with_partial_data(mut self, data: Value) -> Self {
        self.partial_data = data;
        self
    }

    pub fn with_messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = Some(rules.into());
        self
    }
}

/// A question for a required field the model could not fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clarification {
    /// Dot path of the field
    pub field: String,
    pub label: String,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiFormFillerResponse {
    /// The previous data with the model's values merged in
    pub filled: Value,
    /// Labels of required fields that are still empty
    pub missing: Vec<String>,
    pub clarifications: Vec<Clarification>,
    pub complete: bool,
    pub summary: String,
}

/// One step of a streamed fill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filled: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarifications: Option<Vec<Clarification>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
    pub done: bool,
}
