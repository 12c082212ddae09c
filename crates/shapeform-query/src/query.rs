//! Query cache and mutations

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::key::{QueryKey, QueryOptions};
use crate::request::RequestParams;

/// Options for [`QueryClient::mutate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutateOptions {
    pub include_credentials: bool,
    /// Sections whose cached queries are dropped after a successful mutation
    pub invalidate: Vec<String>,
}

/// A typed `(section, method)` pair.
pub trait Endpoint {
    const SECTION: &'static str;
    const METHOD: &'static str;
    type Params: Serialize;
    type Output: DeserializeOwned;
}

/// Caches query results per [`QueryKey`]. Shareable across threads.
#[derive(Debug)]
pub struct QueryClient {
    api: ApiClient,
    cache: Mutex<HashMap<String, (QueryKey, Value)>>,
}

impl QueryClient {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, (QueryKey, Value)>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a query, answering from the cache when possible. `no_cache` calls
    /// always hit the transport and are not stored.
    pub fn query(
        &self,
        section: &str,
        method: &str,
        params: &RequestParams,
        options: &QueryOptions,
    ) -> Result<Value, ApiError> {
        let key = key_for(section, method, params, options)?;
        let id = key.cache_id();

        if !options.no_cache {
            if let Some((_, value)) = self.cache().get(&id) {
                tracing::debug!(section, method, "query cache hit");
                return Ok(value.clone());
            }
            tracing::debug!(section, method, "query cache miss");
        }

        let value = self.api.call(section, method, params, options)?;
        if !options.no_cache {
            self.cache().insert(id, (key, value.clone()));
        }
        Ok(value)
    }

    pub fn get_query_data(&self, key: &QueryKey) -> Option<Value> {
        self.cache().get(&key.cache_id()).map(|(_, v)| v.clone())
    }

    pub fn set_query_data(&self, key: QueryKey, value: Value) {
        self.cache().insert(key.cache_id(), (key, value));
    }

    /// Drop cached queries of a section, or of one method in it.
    /// Returns the number of entries removed.
    pub fn invalidate(&self, section: &str, method: Option<&str>) -> usize {
        let mut cache = self.cache();
        let before = cache.len();
        cache.retain(|_, (key, _)| !key.matches(section, method));
        let removed = before - cache.len();
        tracing::debug!(section, method, removed, "invalidated queries");
        removed
    }

    /// Run a mutation. Never cached.
    pub fn mutate(
        &self,
        section: &str,
        method: &str,
        params: &RequestParams,
        options: &MutateOptions,
    ) -> Result<Value, ApiError> {
        let query_options = QueryOptions {
            include_credentials: options.include_credentials,
            no_cache: false,
        };
        let value = self.api.call(section, method, params, &query_options)?;
        for section in &options.invalidate {
            self.invalidate(section, None);
        }
        Ok(value)
    }

    /// Typed query. `params` is serialized into [`RequestParams`].
    pub fn query_endpoint<E: Endpoint>(
        &self,
        params: &E::Params,
        options: &QueryOptions,
    ) -> Result<E::Output, ApiError> {
        let params = typed_params(params)?;
        let value = self.query(E::SECTION, E::METHOD, &params, options)?;
        serde_json::from_value(value).map_err(|e| ApiError::decode(&e))
    }

    pub fn mutate_endpoint<E: Endpoint>(
        &self,
        params: &E::Params,
        options: &MutateOptions,
    ) -> Result<E::Output, ApiError> {
        let params = typed_params(params)?;
        let value = self.mutate(E::SECTION, E::METHOD, &params, options)?;
        serde_json::from_value(value).map_err(|e| ApiError::decode(&e))
    }
}

fn key_for(
    section: &str,
    method: &str,
    params: &RequestParams,
    options: &QueryOptions,
) -> Result<QueryKey, ApiError> {
    let params = serde_json::to_value(params).map_err(|e| ApiError::encode(&e))?;
    Ok(QueryKey::new(section, method, params, options))
}

fn typed_params<P: Serialize>(params: &P) -> Result<RequestParams, ApiError> {
    serde_json::to_value(params)
        .and_then(serde_json::from_value)
        .map_err(|e| ApiError::encode(&e))
}
