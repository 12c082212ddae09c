/// Errors from a [`TextGenerationProvider`](crate::TextGenerationProvider).
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the provider
    #[error("Provider responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The model declined to answer
    #[error("Model refused: {0}")]
    Refused(String),

    /// Response did not have the expected shape
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FillerError {
    #[error("No API key configured (set SHAPEFORM_AI_API_KEY or OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("Invalid provider base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The provider returned something other than a JSON object
    #[error("Expected an object from the provider, got {0}")]
    UnexpectedOutput(String),
}
