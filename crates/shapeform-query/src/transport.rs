//! Transport seam
//!
//! [`ApiClient`](crate::ApiClient) never talks to the network directly. The
//! blocking [`ReqwestTransport`] is the production implementation; tests plug
//! in their own.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::error::TransportError;
use crate::request::{ApiRequest, CredentialsMode, HttpMethod};

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; non-JSON text is kept as a string
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Options for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Connect timeout (default: 10s)
    pub connect_timeout: Duration,
    /// Request timeout (default: 30s)
    pub timeout: Duration,
    /// Header attached to requests made with [`CredentialsMode::Include`]
    pub credentials_header: Option<(String, String)>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            credentials_header: None,
        }
    }
}

/// Blocking HTTP transport with connection pooling.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    credentials_header: Option<(HeaderName, HeaderValue)>,
}

impl ReqwestTransport {
    pub fn new(options: TransportOptions) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .user_agent(concat!("shapeform@", env!("CARGO_PKG_VERSION")))
            .build()?;
        let credentials_header = options
            .credentials_header
            .map(|(name, value)| header(&name, &value))
            .transpose()?;
        Ok(Self {
            client,
            credentials_header,
        })
    }

    fn headers(&self, request: &ApiRequest) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let (name, value) = header(name, value)?;
            headers.insert(name, value);
        }
        if request.credentials == CredentialsMode::Include
            && let Some((name, value)) = &self.credentials_header
        {
            headers.insert(name.clone(), value.clone());
        }
        Ok(headers)
    }
}

fn header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), TransportError> {
    let invalid = || TransportError::InvalidHeader(name.to_string());
    Ok((
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?,
        HeaderValue::from_str(value).map_err(|_| invalid())?,
    ))
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self
            .client
            .request(method, request.url.clone())
            .headers(self.headers(request)?);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let text = response.text()?;
        let body = if text.is_empty() {
            None
        } else {
            Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
        };
        Ok(ApiResponse { status, body })
    }
}
