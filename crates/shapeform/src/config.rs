//! Combined configuration for the API client and the AI filler.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shapeform_ai::{AiConfig, AiFormFiller, FillerError};
use shapeform_query::{
    ApiClient, ApiRoutes, QueryClient, QueryOptions, TransportError, TransportOptions,
};
use url::Url;

/// The conventional configuration filename.
pub const CONFIG_FILENAME: &str = "shapeform.json";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid URL in {variable}: {source}")]
    InvalidUrl {
        variable: &'static str,
        source: url::ParseError,
    },
}

/// Header attached to requests that include credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    pub base_url: Url,
    /// Default for [`QueryOptions::include_credentials`]
    #[serde(default)]
    pub include_credentials: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_header: Option<CredentialsHeader>,
    #[serde(default)]
    pub routes: ApiRoutes,
}

impl ApiConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            include_credentials: false,
            credentials_header: None,
            routes: ApiRoutes::new(),
        }
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            include_credentials: self.include_credentials,
            no_cache: false,
        }
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            credentials_header: self
                .credentials_header
                .as_ref()
                .map(|h| (h.name.clone(), h.value.clone())),
            ..TransportOptions::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeformConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

impl ShapeformConfig {
    /// Load from a JSON file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, LoadConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        config.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Parse without consulting the environment.
    pub fn parse_str(content: &str) -> Result<Self, LoadConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Apply `SHAPEFORM_API_BASE_URL` and the AI variables read by
    /// [`AiConfig::with_env_overrides`].
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, LoadConfigError> {
        const BASE_URL_VAR: &str = "SHAPEFORM_API_BASE_URL";
        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            self.api.base_url =
                Url::parse(&base_url).map_err(|source| LoadConfigError::InvalidUrl {
                    variable: BASE_URL_VAR,
                    source,
                })?;
        }
        self.ai = self.ai.with_env_overrides(lookup);
        Ok(self)
    }

    /// Find the configuration file by searching upward from the given directory.
    pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
        let mut current = start_dir.to_path_buf();
        loop {
            let config_path = current.join(CONFIG_FILENAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Query client over HTTP for the configured API.
    pub fn query_client(&self) -> Result<QueryClient, TransportError> {
        let api = ApiClient::http(
            self.api.base_url.clone(),
            self.api.routes.clone(),
            self.api.transport_options(),
        )?;
        Ok(QueryClient::new(api))
    }

    pub fn ai_filler(&self) -> Result<AiFormFiller, FillerError> {
        AiFormFiller::from_config(&self.ai)
    }
}

/// Load configuration from `path`. See [`ShapeformConfig::load`].
pub fn load_config(path: &Path) -> Result<ShapeformConfig, LoadConfigError> {
    ShapeformConfig::load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shapeform_query::{HttpMethod, Route};

    const CONFIG: &str = r#"{
        "api": {
            "baseUrl": "https://api.example.com/",
            "includeCredentials": true,
            "credentialsHeader": {"name": "X-Session", "value": "abc"},
            "routes": {"user": {"get": {"httpMethod": "GET", "path": "/users/:username"}}}
        },
        "ai": {"model": "file-model"}
    }"#;

    #[test]
    fn test_parse_config() {
        let config = ShapeformConfig::parse_str(CONFIG).unwrap();
        assert_eq!(config.api.base_url.as_str(), "https://api.example.com/");
        assert!(config.api.query_options().include_credentials);
        assert_eq!(
            config.api.routes.get("user", "get"),
            Some(&Route {
                http_method: HttpMethod::Get,
                path: "/users/:username".into()
            })
        );
        assert_eq!(
            config.api.transport_options().credentials_header,
            Some(("X-Session".to_string(), "abc".to_string()))
        );
        assert_eq!(config.ai.model, "file-model");
        assert_eq!(config.ai.api_key, None);
    }

    #[test]
    fn test_minimal_config() {
        let config = ShapeformConfig::parse_str(r#"{"api": {"baseUrl": "http://localhost/"}}"#)
            .unwrap();
        assert_eq!(config.api, ApiConfig::new(Url::parse("http://localhost/").unwrap()));
        assert_eq!(config.ai, AiConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = ShapeformConfig::parse_str(CONFIG)
            .unwrap()
            .with_env_overrides(|name| match name {
                "SHAPEFORM_API_BASE_URL" => Some("http://localhost:3000/api/".into()),
                "OPENAI_API_KEY" => Some("sk-env".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:3000/api/");
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.ai.model, "file-model");
    }

    #[test]
    fn test_invalid_env_url() {
        let result = ShapeformConfig::parse_str(CONFIG)
            .unwrap()
            .with_env_overrides(|name| (name == "SHAPEFORM_API_BASE_URL").then(|| "::".into()));
        assert!(matches!(
            result,
            Err(LoadConfigError::InvalidUrl {
                variable: "SHAPEFORM_API_BASE_URL",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_base_url_is_an_error() {
        assert!(matches!(
            ShapeformConfig::parse_str(r#"{"api": {}}"#),
            Err(LoadConfigError::Json(_))
        ));
    }
}
