//! Port trait definitions
//!
//! `RemoteClient` is the single external dependency of the orchestration
//! layer. Adapters live in `cropdash-client`.

use crate::error::Result;
use crate::models::{
    MetricKey, PredictionRequest, PredictionResult, SimulationParams, SimulationResult,
    Suggestion,
};
use async_trait::async_trait;
use serde_json::Value;

/// Port for the prediction backend
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// `GET /search/{query}`: ordered location suggestions
    async fn search_locations(&self, query: &str) -> Result<Vec<Suggestion>>;

    /// `POST /predict`: crop recommendation for one location
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult>;

    /// `GET /dev/{endpoint}`: one research metric payload
    async fn fetch_metric(&self, key: MetricKey) -> Result<Value>;

    /// `POST /simulate/`: train a throwaway model and report its scores
    async fn simulate(&self, params: &SimulationParams) -> Result<SimulationResult>;

    /// `GET /dev/results/{file}`: text content of a static evaluation artifact
    async fn fetch_artifact(&self, file: &str) -> Result<String>;
}

#[async_trait]
impl<T: RemoteClient + ?Sized> RemoteClient for std::sync::Arc<T> {
    async fn search_locations(&self, query: &str) -> Result<Vec<Suggestion>> {
        (**self).search_locations(query).await
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        (**self).predict(request).await
    }

    async fn fetch_metric(&self, key: MetricKey) -> Result<Value> {
        (**self).fetch_metric(key).await
    }

    async fn simulate(&self, params: &SimulationParams) -> Result<SimulationResult> {
        (**self).simulate(params).await
    }

    async fn fetch_artifact(&self, file: &str) -> Result<String> {
        (**self).fetch_artifact(file).await
    }
}
