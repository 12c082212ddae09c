//! Route table and request building

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::error::ApiError;
use crate::key::QueryOptions;

/// Header sent when a call opts out of caching.
pub const NO_CACHE_HEADER: &str = "X-No-Cache";

/// Parameters of one API call, as accepted over JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestParams {
    /// Values substituted into the route's path template
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub path: Map<String, Value>,
    /// Query string; arrays repeat the key, nulls are skipped
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub url_params: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
}

impl RequestParams {
    pub fn with_path(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.path.insert(name.into(), value.into());
        self
    }

    pub fn with_url_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.url_params.insert(name.into(), value.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub http_method: HttpMethod,
    /// Path template, e.g. `/users/:username` or `/users/{username}`
    pub path: String,
}

/// Routes keyed by section, then method.
///
/// Deserializes from `{"user": {"get": {"httpMethod": "GET", "path": "/users/:id"}}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiRoutes {
    sections: IndexMap<String, IndexMap<String, Route>>,
}

impl ApiRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(
        mut self,
        section: impl Into<String>,
        method: impl Into<String>,
        http_method: HttpMethod,
        path: impl Into<String>,
    ) -> Self {
        self.insert(section, method, Route {
            http_method,
            path: path.into(),
        });
        self
    }

    pub fn insert(&mut self, section: impl Into<String>, method: impl Into<String>, route: Route) {
        self.sections
            .entry(section.into())
            .or_default()
            .insert(method.into(), route);
    }

    pub fn get(&self, section: &str, method: &str) -> Option<&Route> {
        self.sections.get(section)?.get(method)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialsMode {
    Include,
    SameOrigin,
}

/// A fully resolved request, ready for a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: IndexMap<String, String>,
    pub body: Option<Value>,
    pub credentials: CredentialsMode,
}

impl ApiRequest {
    pub fn build(
        base_url: &Url,
        route: &Route,
        params: &RequestParams,
        options: &QueryOptions,
    ) -> Result<Self, ApiError> {
        let url = build_url(base_url, &route.path, params)?;

        let mut headers = params.headers.clone();
        if options.no_cache {
            headers.insert(NO_CACHE_HEADER.to_string(), "true".to_string());
        }

        // GET carries no body
        let body = match route.http_method {
            HttpMethod::Get => None,
            _ => params.payload.clone(),
        };

        Ok(Self {
            method: route.http_method,
            url,
            headers,
            body,
            credentials: if options.include_credentials {
                CredentialsMode::Include
            } else {
                CredentialsMode::SameOrigin
            },
        })
    }
}

fn build_url(base: &Url, template: &str, params: &RequestParams) -> Result<Url, ApiError> {
    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|()| {
            ApiError::new("InvalidBaseUrl", format!("`{base}` cannot be a base URL"))
        })?;
        segments.pop_if_empty();
        for segment in template.split('/').filter(|s| !s.is_empty()) {
            match placeholder(segment) {
                Some(name) => segments.push(&path_value(&params.path, name)?),
                None => segments.push(segment),
            };
        }
    }

    let pairs = query_pairs(&params.url_params);
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    Ok(url)
}

fn placeholder(segment: &str) -> Option<&str> {
    segment
        .strip_prefix(':')
        .or_else(|| segment.strip_prefix('{')?.strip_suffix('}'))
}

fn path_value(path: &Map<String, Value>, name: &str) -> Result<String, ApiError> {
    match path.get(name) {
        None | Some(Value::Null) => Err(ApiError::missing_path_param(name)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
    }
}

fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    let scalar = |value: &Value| match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    };
    params
        .iter()
        .flat_map(|(name, value)| {
            let values: Vec<String> = match value {
                Value::Array(items) => items.iter().filter_map(scalar).collect(),
                other => scalar(other).into_iter().collect(),
            };
            values.into_iter().map(move |v| (name.clone(), v))
        })
        .collect()
}
