use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";

/// Provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiConfig {
    /// Only ever taken from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
    pub model: String,
    /// Base of the chat-completions API; `chat/completions` is joined onto it
    pub base_url: String,
    pub temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.0,
        }
    }
}

impl AiConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Apply `SHAPEFORM_AI_API_KEY` (falling back to `OPENAI_API_KEY`),
    /// `SHAPEFORM_AI_MODEL` and `SHAPEFORM_AI_BASE_URL`. Empty values are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = var("SHAPEFORM_AI_API_KEY").or_else(|| var("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(model) = var("SHAPEFORM_AI_MODEL") {
            self.model = model;
        }
        if let Some(base_url) = var("SHAPEFORM_AI_BASE_URL") {
            self.base_url = base_url;
        }
        self
    }
}
