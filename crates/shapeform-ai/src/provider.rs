//! Structured-output text generation

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{Value, json};
use shapeform_json_schema::JsonSchema;
use url::Url;

use crate::config::AiConfig;
use crate::error::{FillerError, ProviderError};

/// One structured-output call: the model must answer with JSON matching `schema`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub system: String,
    pub prompt: String,
    /// Name reported to the provider alongside the schema
    pub schema_name: String,
    pub schema: JsonSchema,
    pub temperature: f32,
}

pub trait TextGenerationProvider: Send + Sync {
    fn generate_object(&self, request: &StructuredRequest) -> Result<Value, ProviderError>;
}

/// Provider for chat-completions APIs with `json_schema` response formats.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    /// Fails with [`FillerError::MissingApiKey`] when no key is configured.
    pub fn new(config: &AiConfig) -> Result<Self, FillerError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(FillerError::MissingApiKey)?;
        let endpoint = Url::parse(&config.base_url)?.join("chat/completions")?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("shapeform@", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ProviderError::from)?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl TextGenerationProvider for OpenAiCompatibleProvider {
    fn generate_object(&self, request: &StructuredRequest) -> Result<Value, ProviderError> {
        let body = chat_completion_body(&self.model, request)?;
        tracing::debug!(model = %self.model, endpoint = %self.endpoint, "requesting structured output");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        parse_completion(&serde_json::from_str(&text)?)
    }
}

pub(crate) fn chat_completion_body(
    model: &str,
    request: &StructuredRequest,
) -> Result<Value, ProviderError> {
    Ok(json!({
        "model": model,
        "temperature": request.temperature,
        "messages": [
            {"role": "system", "content": request.system},
            {"role": "user", "content": request.prompt},
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": request.schema_name,
                "strict": true,
                "schema": serde_json::to_value(&request.schema)?,
            },
        },
    }))
}

/// Extract the JSON object from the first choice's message.
pub(crate) fn parse_completion(response: &Value) -> Result<Value, ProviderError> {
    let message = response
        .pointer("/choices/0/message")
        .ok_or_else(|| ProviderError::InvalidResponse("no choices in response".into()))?;
    if let Some(refusal) = message.get("refusal").and_then(Value::as_str) {
        return Err(ProviderError::Refused(refusal.to_string()));
    }
    let content = message
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::InvalidResponse("message has no text content".into()))?;
    Ok(serde_json::from_str(content)?)
}
