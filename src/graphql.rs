//! reqwest-backed GraphQL client with a per-process response cache

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::query::{DataSource, GraphqlRequest, QueryError};

pub const DEFAULT_ENDPOINT: &str = "https://beta.pokeapi.co/graphql/v1beta";

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

pub struct GraphqlClient {
    client: reqwest::Client,
    endpoint: String,
    cache: Option<Mutex<HashMap<String, Value>>>,
}

impl GraphqlClient {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        use_cache: bool,
    ) -> Result<Self, QueryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            cache: use_cache.then(|| Mutex::new(HashMap::new())),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Plain GET for artwork; sprite reuse is tracked in app state instead of here
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, QueryError> {
        debug!(%url, "fetching sprite");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| QueryError::Status(e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn cached(&self, key: &str) -> Option<Value> {
        let cache = self.cache.as_ref()?.lock().ok()?;
        cache.get(key).cloned()
    }

    fn store(&self, key: String, data: &Value) {
        if let Some(Ok(mut cache)) = self.cache.as_ref().map(|cache| cache.lock()) {
            cache.insert(key, data.clone());
        }
    }
}

/// Cache key for an operation and its variables
pub fn cache_key(request: &GraphqlRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.operation_name.as_bytes());
    hasher.update([0]);
    hasher.update(request.variables.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Splits a GraphQL response body into its data or a joined error message
fn into_data(response: GraphqlResponse) -> Result<Value, QueryError> {
    if !response.errors.is_empty() {
        let message = response
            .errors
            .into_iter()
            .map(|entry| entry.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(QueryError::Graphql(message));
    }
    Ok(response.data.unwrap_or(Value::Null))
}

#[async_trait]
impl DataSource for GraphqlClient {
    async fn execute(&self, request: &GraphqlRequest) -> Result<Value, QueryError> {
        let key = cache_key(request);
        if let Some(data) = self.cached(&key) {
            trace!(operation = request.operation_name, "cache hit");
            return Ok(data);
        }

        debug!(
            operation = request.operation_name,
            endpoint = %self.endpoint,
            "sending graphql request"
        );
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| QueryError::Status(e.to_string()))?;
        let body: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| QueryError::Decode(e.to_string()))?;

        let data = into_data(body)?;
        self.store(key, &data);
        Ok(data)
    }
}
