use chrono::{DateTime, Utc};
use cropdash_core::models::{CropRecommendation, SimulationResult, Suggestion};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Output for search command
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
}

/// Output for predict command
#[derive(Debug, Serialize)]
pub struct PredictOutput {
    pub location: Suggestion,
    pub language: String,
    pub recommendations: Vec<CropRecommendation>,
    pub advisory: BTreeMap<String, String>,
    pub raw: Value,
}

/// Output for dashboard command
#[derive(Debug, Serialize)]
pub struct DashboardOutput {
    pub fetched_at: DateTime<Utc>,
    pub metrics: Value,
}

/// Output for simulate command
#[derive(Debug, Serialize)]
pub struct SimulateOutput {
    pub result: SimulationResult,
    pub overridden: BTreeMap<String, PanelDiff>,
    pub reset: bool,
}

#[derive(Debug, Serialize)]
pub struct PanelDiff {
    pub production: Value,
    pub simulated: Value,
}

/// Output for artifacts command
#[derive(Debug, Serialize)]
pub struct ArtifactOutput {
    pub title: String,
    pub file: String,
    pub loaded: bool,
    pub content: String,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}
