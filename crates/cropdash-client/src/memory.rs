//! In-memory `RemoteClient` for development and testing.
//!
//! Responses are scripted up front (or swapped mid-test), every call is
//! recorded, and latency can be injected per search query or per simulation
//! run so tests can force responses to arrive out of order.
//!
//! These implementations use `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state. Locks are never held across an `.await`.

use async_trait::async_trait;
use cropdash_core::error::{AdvisoryError, Result};
use cropdash_core::models::{
    validate_artifact_name, MetricKey, PredictionRequest, PredictionResult, SimulationParams,
    SimulationResult, Suggestion, ARTIFACTS,
};
use cropdash_core::ports::RemoteClient;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// One request observed by the memory client
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Search(String),
    Predict(PredictionRequest),
    Metric(MetricKey),
    Simulate(SimulationParams),
    Artifact(String),
}

#[derive(Debug, Default)]
struct Script {
    suggestions: HashMap<String, Vec<Suggestion>>,
    search_latency: HashMap<String, Duration>,
    metrics: HashMap<MetricKey, Value>,
    prediction: Option<Value>,
    simulation: Option<SimulationResult>,
    queued_simulations: VecDeque<(Duration, SimulationResult)>,
    artifacts: HashMap<String, String>,
    failing_metrics: HashSet<MetricKey>,
    fail_search: bool,
    fail_predict: bool,
    fail_simulate: bool,
    latency: Duration,
}

/// Scripted implementation of the backend
#[derive(Debug, Clone, Default)]
pub struct MemoryRemoteClient {
    script: Arc<RwLock<Script>>,
    calls: Arc<RwLock<Vec<RemoteCall>>>,
}

impl MemoryRemoteClient {
    /// Create an empty client: every lookup fails or returns nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client seeded with a realistic demo dataset
    pub fn with_fixtures() -> Self {
        let client = Self::new()
            .with_suggestions(
                "Pune",
                vec![
                    Suggestion::new("Pune, Maharashtra, India", 18.5204, 73.8567),
                    Suggestion::new("Pune District, Maharashtra, India", 18.65, 74.0),
                ],
            )
            .with_suggestions(
                "Nashik",
                vec![Suggestion::new("Nashik, Maharashtra, India", 19.9975, 73.7898)],
            )
            .with_suggestions(
                "Ludhiana",
                vec![Suggestion::new("Ludhiana, Punjab, India", 30.901, 75.8573)],
            )
            .with_prediction(fixture_prediction())
            .with_simulation(SimulationResult {
                accuracy: 0.9841,
                cv_mean: 0.9812,
                cv_std: 0.0047,
                features: fixture_features(),
                feature_importances: vec![0.1, 0.14, 0.17, 0.08, 0.21, 0.05, 0.25],
                f1_score: Some(0.9838),
                kmeans_inertia: Some(2871.4),
            });

        for key in MetricKey::ALL {
            client.script.write().unwrap().metrics.insert(key, fixture_metric(key));
        }
        for artifact in ARTIFACTS {
            client.script.write().unwrap().artifacts.insert(
                artifact.file.to_string(),
                format!("{}\n\nGenerated by the offline fixture backend.\n", artifact.title),
            );
        }
        client
    }

    pub fn with_suggestions(self, query: impl Into<String>, suggestions: Vec<Suggestion>) -> Self {
        self.script.write().unwrap().suggestions.insert(query.into(), suggestions);
        self
    }

    /// Delay the response for one specific query
    pub fn with_search_latency(self, query: impl Into<String>, latency: Duration) -> Self {
        self.script.write().unwrap().search_latency.insert(query.into(), latency);
        self
    }

    pub fn with_metric(self, key: MetricKey, payload: Value) -> Self {
        self.script.write().unwrap().metrics.insert(key, payload);
        self
    }

    pub fn with_prediction(self, payload: Value) -> Self {
        self.script.write().unwrap().prediction = Some(payload);
        self
    }

    pub fn with_simulation(self, result: SimulationResult) -> Self {
        self.script.write().unwrap().simulation = Some(result);
        self
    }

    pub fn with_artifact(self, file: impl Into<String>, content: impl Into<String>) -> Self {
        self.script.write().unwrap().artifacts.insert(file.into(), content.into());
        self
    }

    /// Latency applied to every call (on top of any per-query latency)
    pub fn with_latency(self, latency: Duration) -> Self {
        self.set_latency(latency);
        self
    }

    pub fn fail_metric(self, key: MetricKey) -> Self {
        self.script.write().unwrap().failing_metrics.insert(key);
        self
    }

    pub fn fail_search(self) -> Self {
        self.script.write().unwrap().fail_search = true;
        self
    }

    pub fn fail_predict(self) -> Self {
        self.set_fail_predict(true);
        self
    }

    pub fn fail_simulate(self) -> Self {
        self.set_fail_simulate(true);
        self
    }

    /// Change the latency of calls issued from now on
    ///
    /// Calls already waiting keep the latency they started with.
    pub fn set_latency(&self, latency: Duration) {
        self.script.write().unwrap().latency = latency;
    }

    pub fn set_fail_predict(&self, fail: bool) {
        self.script.write().unwrap().fail_predict = fail;
    }

    pub fn set_fail_simulate(&self, fail: bool) {
        self.script.write().unwrap().fail_simulate = fail;
    }

    pub fn set_metric_failing(&self, key: MetricKey, failing: bool) {
        let mut script = self.script.write().unwrap();
        if failing {
            script.failing_metrics.insert(key);
        } else {
            script.failing_metrics.remove(&key);
        }
    }

    /// Answer the next simulation run with `result` after `latency`
    ///
    /// Queued results are consumed in call order before falling back to the
    /// result set with `with_simulation`.
    pub fn queue_simulation(&self, latency: Duration, result: SimulationResult) {
        self.script.write().unwrap().queued_simulations.push_back((latency, result));
    }

    /// Every request seen so far, in issue order
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RemoteCall::Search(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    fn record(&self, call: RemoteCall) {
        self.calls.write().unwrap().push(call);
    }

    fn latency(&self) -> Duration {
        self.script.read().unwrap().latency
    }
}

async fn wait(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

fn server_error(endpoint: String) -> AdvisoryError {
    AdvisoryError::Status {
        endpoint,
        status: 500,
        body: r#"{"error":"Data not found"}"#.to_string(),
    }
}

#[async_trait]
impl RemoteClient for MemoryRemoteClient {
    async fn search_locations(&self, query: &str) -> Result<Vec<Suggestion>> {
        self.record(RemoteCall::Search(query.to_string()));
        let extra = self.script.read().unwrap().search_latency.get(query).copied();
        wait(self.latency() + extra.unwrap_or_default()).await;

        let script = self.script.read().unwrap();
        if script.fail_search {
            return Err(AdvisoryError::Transport {
                endpoint: format!("/search/{}", query),
                reason: "connection refused".to_string(),
            });
        }
        Ok(script.suggestions.get(query).cloned().unwrap_or_default())
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        self.record(RemoteCall::Predict(request.clone()));
        wait(self.latency()).await;

        let script = self.script.read().unwrap();
        match (&script.prediction, script.fail_predict) {
            (Some(payload), false) => Ok(PredictionResult(payload.clone())),
            _ => Err(server_error("/predict".to_string())),
        }
    }

    async fn fetch_metric(&self, key: MetricKey) -> Result<Value> {
        self.record(RemoteCall::Metric(key));
        wait(self.latency()).await;

        let script = self.script.read().unwrap();
        if script.failing_metrics.contains(&key) {
            return Err(server_error(format!("/dev/{}", key.endpoint())));
        }
        script
            .metrics
            .get(&key)
            .cloned()
            .ok_or_else(|| server_error(format!("/dev/{}", key.endpoint())))
    }

    async fn simulate(&self, params: &SimulationParams) -> Result<SimulationResult> {
        self.record(RemoteCall::Simulate(params.clone()));
        let queued = self.script.write().unwrap().queued_simulations.pop_front();
        let (extra, queued_result) = match queued {
            Some((latency, result)) => (latency, Some(result)),
            None => (Duration::ZERO, None),
        };
        wait(self.latency() + extra).await;

        let script = self.script.read().unwrap();
        if script.fail_simulate {
            return Err(server_error("/simulate/".to_string()));
        }
        queued_result
            .or_else(|| script.simulation.clone())
            .ok_or_else(|| server_error("/simulate/".to_string()))
    }

    async fn fetch_artifact(&self, file: &str) -> Result<String> {
        validate_artifact_name(file)?;
        self.record(RemoteCall::Artifact(file.to_string()));
        wait(self.latency()).await;

        self.script.read().unwrap().artifacts.get(file).cloned().ok_or_else(|| {
            AdvisoryError::Status {
                endpoint: format!("/dev/results/{}", file),
                status: 404,
                body: r#"{"error":"File not found"}"#.to_string(),
            }
        })
    }
}

fn fixture_features() -> Vec<String> {
    ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn fixture_prediction() -> Value {
    json!({
        "project": "Smart Crop Advisory System",
        "location": "Lat: 18.5204, Lon: 73.8567",
        "language": { "requested": "en", "applied": "en" },
        "inputs": {
            "N": 42.0, "P": 55.0, "K": 43.0,
            "temperature": 26.4, "humidity": 71.0, "ph": 6.6, "rainfall": 182.0
        },
        "recommendations": [
            { "crop": "rice", "crop_localized": "rice", "confidence": "64.3%" },
            { "crop": "maize", "crop_localized": "maize", "confidence": "18.9%" },
            { "crop": "jute", "crop_localized": "jute", "confidence": "7.2%" }
        ],
        "advisory": {
            "fertilizer_tip": "High Nitrogen deficiency detected. Recommend applying Urea.",
            "irrigation_tip": "Standard irrigation required.",
            "best_season": "Kharif (Monsoon)",
            "soil_note": "Estimated soil values based on location."
        },
        "model_type": "Hybrid Random Forest + KMeans Membership"
    })
}

fn fixture_metric(key: MetricKey) -> Value {
    let features = fixture_features();
    match key {
        MetricKey::ModelComparison => json!({
            "labels": ["Random Forest", "Logistic Regression", "AdaBoost", "Gradient Boosting"],
            "accuracy": [0.9932, 0.9636, 0.8841, 0.9818]
        }),
        MetricKey::CrossValidation => json!({
            "folds": ["Fold 1", "Fold 2", "Fold 3", "Fold 4", "Fold 5"],
            "accuracies": [0.9943, 0.9915, 0.9932, 0.9960, 0.9903],
            "mean": 0.9931,
            "std": 0.0020
        }),
        MetricKey::FeatureImportance => json!({
            "features": features,
            "importances": [0.102, 0.146, 0.176, 0.074, 0.218, 0.052, 0.232]
        }),
        MetricKey::FeatureImportanceAdaboost => json!({
            "features": features,
            "importances": [0.12, 0.10, 0.22, 0.06, 0.26, 0.04, 0.20]
        }),
        MetricKey::FeatureImportanceGb => json!({
            "features": features,
            "importances": [0.09, 0.13, 0.19, 0.07, 0.24, 0.05, 0.23]
        }),
        MetricKey::ClassDistribution => json!({
            "labels": ["rice", "maize", "chickpea", "cotton", "coffee"],
            "counts": [100, 100, 100, 100, 100]
        }),
        MetricKey::CorrelationMatrix => json!({
            "features": ["N", "P", "K"],
            "matrix": [[1.0, -0.23, -0.14], [-0.23, 1.0, 0.74], [-0.14, 0.74, 1.0]]
        }),
        MetricKey::ClusterVisualization => json!({
            "points": [{ "x": 0.4, "y": -1.2, "cluster": 0 }, { "x": 1.1, "y": 0.3, "cluster": 1 }]
        }),
        MetricKey::MembershipScores => json!({
            "clusters": ["Cluster 0", "Cluster 1"],
            "scores": [0.71, 0.29]
        }),
        MetricKey::ShapSummary => json!({
            "features": features,
            "mean_abs_shap": [0.08, 0.11, 0.15, 0.05, 0.19, 0.03, 0.21]
        }),
        MetricKey::ConfusionMatrix => json!({
            "labels": ["rice", "maize"],
            "matrix": [[20, 0], [1, 19]]
        }),
        MetricKey::BoxplotFeatures => json!({
            "N": { "min": 0.0, "q1": 21.0, "median": 37.0, "q3": 84.0, "max": 140.0 }
        }),
        MetricKey::KmeansCounts => json!({
            "clusters": [0, 1, 2],
            "counts": [310, 295, 270]
        }),
        MetricKey::ClusterMap => json!({
            "0": { "rice": 0.82, "jute": 0.18 },
            "1": { "maize": 0.64, "cotton": 0.36 }
        }),
        MetricKey::ShapLocal => json!({
            "features": features,
            "values": [0.02, -0.01, 0.05, 0.0, 0.07, -0.02, 0.11],
            "predicted": "rice"
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropdash_core::models::Language;

    #[tokio::test]
    async fn test_scripted_search_and_call_log() {
        let client = MemoryRemoteClient::new()
            .with_suggestions("Pune", vec![Suggestion::new("Pune, India", 18.52, 73.85)]);

        let hits = client.search_locations("Pune").await.unwrap();
        assert_eq!(hits.len(), 1);

        let misses = client.search_locations("Atlantis").await.unwrap();
        assert!(misses.is_empty());

        assert_eq!(client.search_calls(), vec!["Pune", "Atlantis"]);
    }

    #[tokio::test]
    async fn test_failing_metric_reports_endpoint() {
        let client = MemoryRemoteClient::with_fixtures().fail_metric(MetricKey::ClusterMap);

        assert!(client.fetch_metric(MetricKey::ShapLocal).await.is_ok());
        let err = client.fetch_metric(MetricKey::ClusterMap).await.unwrap_err();
        assert!(err.to_string().contains("/dev/cluster-map"));

        client.set_metric_failing(MetricKey::ClusterMap, false);
        assert!(client.fetch_metric(MetricKey::ClusterMap).await.is_ok());
    }

    #[tokio::test]
    async fn test_fixtures_cover_every_metric_and_artifact() {
        let client = MemoryRemoteClient::with_fixtures();
        for key in MetricKey::ALL {
            assert!(client.fetch_metric(key).await.is_ok(), "missing fixture for {}", key);
        }
        for artifact in ARTIFACTS {
            let text = client.fetch_artifact(artifact.file).await.unwrap();
            assert!(text.starts_with(artifact.title));
        }
    }

    #[tokio::test]
    async fn test_queued_simulations_are_consumed_in_order() {
        let base = SimulationResult {
            accuracy: 0.5,
            cv_mean: 0.5,
            cv_std: 0.1,
            features: vec![],
            feature_importances: vec![],
            f1_score: None,
            kmeans_inertia: None,
        };
        let client = MemoryRemoteClient::new().with_simulation(base.clone());
        client.queue_simulation(Duration::ZERO, SimulationResult { accuracy: 0.9, ..base.clone() });

        let params = SimulationParams::default();
        assert_eq!(client.simulate(&params).await.unwrap().accuracy, 0.9);
        assert_eq!(client.simulate(&params).await.unwrap().accuracy, 0.5);
    }

    #[tokio::test]
    async fn test_predict_failure_toggle() {
        let client = MemoryRemoteClient::with_fixtures();
        let request = PredictionRequest {
            latitude: 18.52,
            longitude: 73.85,
            lang: Language::En,
        };

        assert!(client.predict(&request).await.is_ok());
        client.set_fail_predict(true);
        assert!(client.predict(&request).await.is_err());
        assert_eq!(client.call_count(), 2);
    }
}
