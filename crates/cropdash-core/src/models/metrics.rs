use crate::error::{AdvisoryError, MetricFailure, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Identifier of one research metric served under `/dev/{endpoint}`
///
/// The set is closed: a snapshot always holds exactly one payload per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    ClassDistribution,
    CorrelationMatrix,
    ModelComparison,
    CrossValidation,
    FeatureImportance,
    ClusterVisualization,
    MembershipScores,
    ShapSummary,
    ConfusionMatrix,
    BoxplotFeatures,
    KmeansCounts,
    ClusterMap,
    FeatureImportanceAdaboost,
    FeatureImportanceGb,
    ShapLocal,
}

impl MetricKey {
    pub const ALL: [MetricKey; 15] = [
        MetricKey::ClassDistribution,
        MetricKey::CorrelationMatrix,
        MetricKey::ModelComparison,
        MetricKey::CrossValidation,
        MetricKey::FeatureImportance,
        MetricKey::ClusterVisualization,
        MetricKey::MembershipScores,
        MetricKey::ShapSummary,
        MetricKey::ConfusionMatrix,
        MetricKey::BoxplotFeatures,
        MetricKey::KmeansCounts,
        MetricKey::ClusterMap,
        MetricKey::FeatureImportanceAdaboost,
        MetricKey::FeatureImportanceGb,
        MetricKey::ShapLocal,
    ];

    /// Path segment under `/dev/`
    pub fn endpoint(&self) -> &'static str {
        match self {
            MetricKey::ClassDistribution => "class-distribution",
            MetricKey::CorrelationMatrix => "correlation-matrix",
            MetricKey::ModelComparison => "model-comparison",
            MetricKey::CrossValidation => "cross-validation",
            MetricKey::FeatureImportance => "feature-importance",
            MetricKey::ClusterVisualization => "cluster-visualization",
            MetricKey::MembershipScores => "membership-scores",
            MetricKey::ShapSummary => "shap-summary",
            MetricKey::ConfusionMatrix => "confusion-matrix",
            MetricKey::BoxplotFeatures => "boxplot-features",
            MetricKey::KmeansCounts => "kmeans-counts",
            MetricKey::ClusterMap => "cluster-map",
            MetricKey::FeatureImportanceAdaboost => "feature-importance-adaboost",
            MetricKey::FeatureImportanceGb => "feature-importance-gb",
            MetricKey::ShapLocal => "shap-local",
        }
    }

    /// Name the rendering layer looks the payload up by
    pub fn snapshot_key(&self) -> &'static str {
        match self {
            MetricKey::ClassDistribution => "class_distribution",
            MetricKey::CorrelationMatrix => "correlation_matrix",
            MetricKey::ModelComparison => "model_comparison",
            MetricKey::CrossValidation => "cross_validation",
            MetricKey::FeatureImportance => "feature_importance",
            MetricKey::ClusterVisualization => "cluster_visualization",
            MetricKey::MembershipScores => "membership_scores",
            MetricKey::ShapSummary => "shap_summary",
            MetricKey::ConfusionMatrix => "confusion_matrix",
            MetricKey::BoxplotFeatures => "boxplot_features",
            MetricKey::KmeansCounts => "kmeans_counts",
            MetricKey::ClusterMap => "cluster_map",
            MetricKey::FeatureImportanceAdaboost => "feature_importance_adaboost",
            MetricKey::FeatureImportanceGb => "feature_importance_gb",
            MetricKey::ShapLocal => "shap_local",
        }
    }

    pub fn from_endpoint(endpoint: &str) -> Option<MetricKey> {
        MetricKey::ALL.into_iter().find(|key| key.endpoint() == endpoint)
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// A fully populated set of metric payloads
///
/// There is no way to build a snapshot with a key missing, so a value of this
/// type is always safe to hand to the rendering layer. Payloads are shared
/// behind `Arc` so derived snapshots can pass untouched panels through by
/// reference.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSnapshot {
    payloads: BTreeMap<MetricKey, Arc<Value>>,
    fetched_at: DateTime<Utc>,
}

impl MetricSnapshot {
    /// Build a snapshot from a map that must contain every `MetricKey`
    pub fn from_complete(payloads: BTreeMap<MetricKey, Value>) -> Result<Self> {
        let failures: Vec<MetricFailure> = MetricKey::ALL
            .into_iter()
            .filter(|key| !payloads.contains_key(key))
            .map(|key| MetricFailure {
                key,
                reason: "payload missing".to_string(),
            })
            .collect();

        if !failures.is_empty() {
            return Err(AdvisoryError::SnapshotIncomplete { failures });
        }

        Ok(Self {
            payloads: payloads.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
            fetched_at: Utc::now(),
        })
    }

    pub fn get(&self, key: MetricKey) -> &Value {
        // Completeness is checked at construction.
        &self.payloads[&key]
    }

    /// Shared handle to a payload, for identity comparisons
    pub fn payload(&self, key: MetricKey) -> &Arc<Value> {
        &self.payloads[&key]
    }

    pub fn keys(&self) -> impl Iterator<Item = MetricKey> + '_ {
        self.payloads.keys().copied()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Shallow copy with the given keys replaced
    ///
    /// Keys not named in `overrides` share their payload with `self`.
    pub fn with_overrides(&self, overrides: impl IntoIterator<Item = (MetricKey, Value)>) -> Self {
        let mut payloads = self.payloads.clone();
        for (key, value) in overrides {
            payloads.insert(key, Arc::new(value));
        }
        Self {
            payloads,
            fetched_at: self.fetched_at,
        }
    }

    /// Render as the `{ snapshot_key: payload }` object the dashboard consumes
    pub fn to_json(&self) -> Value {
        let map = self
            .payloads
            .iter()
            .map(|(key, value)| (key.snapshot_key().to_string(), (**value).clone()))
            .collect();
        Value::Object(map)
    }
}
