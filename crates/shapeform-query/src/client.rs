use serde_json::Value;
use url::Url;

use crate::error::{ApiError, TransportError};
use crate::key::QueryOptions;
use crate::request::{ApiRequest, ApiRoutes, RequestParams};
use crate::transport::{ReqwestTransport, Transport, TransportOptions};

/// Dispatches `(section, method, params)` calls to a [`Transport`].
pub struct ApiClient {
    base_url: Url,
    routes: ApiRoutes,
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: Url, routes: ApiRoutes, transport: impl Transport + 'static) -> Self {
        Self {
            base_url,
            routes,
            transport: Box::new(transport),
        }
    }

    /// Client backed by [`ReqwestTransport`].
    pub fn http(
        base_url: Url,
        routes: ApiRoutes,
        options: TransportOptions,
    ) -> Result<Self, TransportError> {
        Ok(Self::new(base_url, routes, ReqwestTransport::new(options)?))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn routes(&self) -> &ApiRoutes {
        &self.routes
    }

    /// Perform one call. The response body of a 2xx is returned as is; an
    /// empty body becomes `null`.
    pub fn call(
        &self,
        section: &str,
        method: &str,
        params: &RequestParams,
        options: &QueryOptions,
    ) -> Result<Value, ApiError> {
        let route = self
            .routes
            .get(section, method)
            .ok_or_else(|| ApiError::unknown_route(section, method))?;
        let request = ApiRequest::build(&self.base_url, route, params, options)?;
        tracing::debug!(
            section,
            method,
            http_method = %request.method,
            url = %request.url,
            "dispatching API request"
        );

        let response = self.transport.send(&request).map_err(|e| {
            tracing::warn!(section, method, error = %e, "transport failed");
            ApiError::from_transport(&e)
        })?;
        if !response.is_success() {
            tracing::warn!(section, method, status = response.status, "API request failed");
            return Err(ApiError::from_response(response.status, response.body));
        }
        Ok(response.body.unwrap_or(Value::Null))
    }
}
