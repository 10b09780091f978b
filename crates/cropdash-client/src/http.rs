use async_trait::async_trait;
use cropdash_core::error::{AdvisoryError, Result};
use cropdash_core::models::{
    validate_artifact_name, MetricKey, PredictionRequest, PredictionResult, SimulationParams,
    SimulationResult, Suggestion,
};
use cropdash_core::ports::RemoteClient;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP adapter for the prediction backend
pub struct HttpRemoteClient {
    /// Base URL the route paths are appended to (e.g., "http://127.0.0.1:5000/api")
    base_url: Url,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpRemoteClient {
    /// Create a new client for the given base URL
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| AdvisoryError::ConfigInvalid {
            key: "base_url".to_string(),
            reason: format!("Failed to parse '{}': {}", base_url, e),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(AdvisoryError::ConfigInvalid {
                key: "base_url".to_string(),
                reason: format!("'{}' cannot carry a path", base_url),
            });
        }

        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    /// Create with the default local backend URL
    pub fn localhost() -> Result<Self> {
        Self::new(cropdash_core::config::DEFAULT_BASE_URL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let endpoint = url.path().to_string();
        tracing::debug!(endpoint = %endpoint, "GET");

        let response = self.client.get(url).send().await.map_err(|e| {
            AdvisoryError::Transport {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            }
        })?;

        Self::decode(response, endpoint).await
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = url.path().to_string();
        tracing::debug!(endpoint = %endpoint, "POST");

        let response = self.client.post(url).json(body).send().await.map_err(|e| {
            AdvisoryError::Transport {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            }
        })?;

        Self::decode(response, endpoint).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response, endpoint: String) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::Status {
                endpoint,
                status,
                body,
            });
        }

        response.json().await.map_err(|e| AdvisoryError::Decode {
            endpoint,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn search_locations(&self, query: &str) -> Result<Vec<Suggestion>> {
        self.get_json(self.url(&["search", query])).await
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        self.post_json(self.url(&["predict"]), request).await
    }

    async fn fetch_metric(&self, key: MetricKey) -> Result<Value> {
        self.get_json(self.url(&["dev", key.endpoint()])).await
    }

    async fn simulate(&self, params: &SimulationParams) -> Result<SimulationResult> {
        // The route is registered with a trailing slash.
        self.post_json(self.url(&["simulate", ""]), params).await
    }

    async fn fetch_artifact(&self, file: &str) -> Result<String> {
        validate_artifact_name(file)?;
        let body: ArtifactBody = self.get_json(self.url(&["dev", "results", file])).await?;
        Ok(body.content)
    }
}

/// Response from the results endpoint
#[derive(Debug, Deserialize)]
struct ArtifactBody {
    content: String,
}
