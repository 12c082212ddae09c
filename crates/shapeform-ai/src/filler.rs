use serde_json::{Map, Value};
use shapeform_form::merge_values;
use shapeform_json_schema::fields_to_json_schema;

use crate::config::AiConfig;
use crate::error::FillerError;
use crate::missing::{build_clarifications, build_summary, missing_fields};
use crate::prompt::{SYSTEM_PROMPT, build_user_prompt};
use crate::provider::{OpenAiCompatibleProvider, StructuredRequest, TextGenerationProvider};
use crate::types::{AiFormFillerRequest, AiFormFillerResponse, FillChunk};

const SCHEMA_NAME: &str = "form_data";

/// Fills form data through a [`TextGenerationProvider`].
pub struct AiFormFiller {
    provider: Box<dyn TextGenerationProvider>,
    temperature: f32,
}

impl std::fmt::Debug for AiFormFiller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiFormFiller")
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl AiFormFiller {
    pub fn new(provider: impl TextGenerationProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            temperature: 0.0,
        }
    }

    /// Filler backed by [`OpenAiCompatibleProvider`]. Fails without an API key.
    pub fn from_config(config: &AiConfig) -> Result<Self, FillerError> {
        Ok(Self::new(OpenAiCompatibleProvider::new(config)?).with_temperature(config.temperature))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn fill(&self, request: &AiFormFillerRequest) -> Result<AiFormFillerResponse, FillerError> {
        let structured = StructuredRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_user_prompt(request),
            schema_name: SCHEMA_NAME.to_string(),
            schema: fields_to_json_schema(&request.fields),
            temperature: self.temperature,
        };

        let output = self.provider.generate_object(&structured).map_err(|e| {
            tracing::error!(error = %e, "AI form filling failed");
            FillerError::from(e)
        })?;
        if !output.is_object() {
            tracing::error!(output = %output, "AI provider returned a non-object");
            return Err(FillerError::UnexpectedOutput(output.to_string()));
        }

        let mut filled = match &request.partial_data {
            Value::Object(_) => request.partial_data.clone(),
            _ => Value::Object(Map::new()),
        };
        merge_values(&mut filled, &output);

        let missing: Vec<String> = missing_fields(&request.fields, &filled)
            .into_iter()
            .map(|field| field.label.clone())
            .collect();
        let clarifications = build_clarifications(&request.fields, &filled);
        let summary = build_summary(&request.fields, &filled);
        tracing::debug!(missing = missing.len(), "AI form filling finished");

        Ok(AiFormFillerResponse {
            complete: missing.is_empty(),
            filled,
            missing,
            clarifications,
            summary,
        })
    }

    /// Streamed variant of [`fill`](Self::fill).
    ///
    /// Yields the filled values, then the clarifications if there are any, then
    /// a final `done` chunk. A failure yields a single `done` chunk with
    /// `complete: false` instead of an error.
    pub fn fill_stream(
        &self,
        request: &AiFormFillerRequest,
    ) -> impl Iterator<Item = FillChunk> + use<> {
        let chunks = match self.fill(request) {
            Ok(response) => {
                let mut chunks = vec![FillChunk {
                    filled: Some(response.filled),
                    ..FillChunk::default()
                }];
                if !response.clarifications.is_empty() {
                    chunks.push(FillChunk {
                        clarifications: Some(response.clarifications),
                        ..FillChunk::default()
                    });
                }
                chunks.push(FillChunk {
                    complete: Some(response.complete),
                    done: true,
                    ..FillChunk::default()
                });
                chunks
            }
            Err(_) => vec![FillChunk {
                complete: Some(false),
                done: true,
                ..FillChunk::default()
            }],
        };
        chunks.into_iter()
    }
}
