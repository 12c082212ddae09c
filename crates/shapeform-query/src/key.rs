//! Query keys
//!
//! A key identifies one cached result. It serializes as the tuple
//! `[section, method, params, includeCredentials, noCache]` so it can be
//! compared with keys produced by other clients of the same API.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Per-call flags shared by queries and mutations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryOptions {
    /// Send cookies/credentials with the request
    pub include_credentials: bool,
    /// Skip the cache and ask intermediaries to do the same
    pub no_cache: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryKey {
    pub section: String,
    pub method: String,
    pub params: Value,
    pub include_credentials: bool,
    pub no_cache: bool,
}

impl QueryKey {
    pub fn new(
        section: impl Into<String>,
        method: impl Into<String>,
        params: Value,
        options: &QueryOptions,
    ) -> Self {
        Self {
            section: section.into(),
            method: method.into(),
            params,
            include_credentials: options.include_credentials,
            no_cache: options.no_cache,
        }
    }

    /// Stable identity of the key. Object keys inside `params` are sorted, so
    /// two keys built from differently ordered params share one cache entry.
    pub fn cache_id(&self) -> String {
        let canonical = (
            &self.section,
            &self.method,
            canonicalize(&self.params),
            self.include_credentials,
            self.no_cache,
        );
        serde_json::to_string(&canonical).unwrap_or_default()
    }

    pub fn matches(&self, section: &str, method: Option<&str>) -> bool {
        self.section == section && method.is_none_or(|m| self.method == m)
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

impl Serialize for QueryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            &self.section,
            &self.method,
            &self.params,
            self.include_credentials,
            self.no_cache,
        )
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for QueryKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (section, method, params, include_credentials, no_cache) =
            <(String, String, Value, bool, bool)>::deserialize(deserializer)?;
        Ok(Self {
            section,
            method,
            params,
            include_credentials,
            no_cache,
        })
    }
}
