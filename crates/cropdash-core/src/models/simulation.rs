use crate::error::{AdvisoryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Model families the simulation endpoint can train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelFamily {
    #[default]
    #[serde(rename = "Random Forest")]
    RandomForest,
    #[serde(rename = "AdaBoost")]
    AdaBoost,
    #[serde(rename = "Gradient Boosting")]
    GradientBoosting,
    #[serde(rename = "Decision Tree")]
    DecisionTree,
    #[serde(rename = "Logistic Regression")]
    LogisticRegression,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 5] = [
        ModelFamily::RandomForest,
        ModelFamily::AdaBoost,
        ModelFamily::GradientBoosting,
        ModelFamily::DecisionTree,
        ModelFamily::LogisticRegression,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ModelFamily::RandomForest => "Random Forest",
            ModelFamily::AdaBoost => "AdaBoost",
            ModelFamily::GradientBoosting => "Gradient Boosting",
            ModelFamily::DecisionTree => "Decision Tree",
            ModelFamily::LogisticRegression => "Logistic Regression",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModelFamily {
    type Err = AdvisoryError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String =
            s.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_lowercase();
        ModelFamily::ALL
            .into_iter()
            .find(|family| {
                family
                    .label()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_lowercase()
                    == normalized
            })
            .ok_or_else(|| AdvisoryError::InvalidParameter {
                key: "model_type".to_string(),
                reason: format!(
                    "Unknown model type: {}. Use Random Forest, AdaBoost, Gradient Boosting, Decision Tree, or Logistic Regression",
                    s
                ),
            })
    }
}

/// Feature scaling applied before training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScalingMethod {
    #[default]
    Standard,
    MinMax,
}

impl FromStr for ScalingMethod {
    type Err = AdvisoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(ScalingMethod::Standard),
            "minmax" | "min-max" => Ok(ScalingMethod::MinMax),
            _ => Err(AdvisoryError::InvalidParameter {
                key: "scaling_method".to_string(),
                reason: format!("Unknown scaling method: {}. Use Standard or MinMax", s),
            }),
        }
    }
}

/// Body of `POST /simulate/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub model_type: ModelFamily,
    pub n_estimators: u32,
    /// `None` lets the backend pick the family's default depth
    pub max_depth: Option<u32>,
    pub learning_rate: f64,
    pub n_clusters: u32,
    pub use_smote: bool,
    pub scaling_method: ScalingMethod,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            model_type: ModelFamily::RandomForest,
            n_estimators: 100,
            max_depth: None,
            learning_rate: 0.1,
            n_clusters: 22,
            use_smote: false,
            scaling_method: ScalingMethod::Standard,
        }
    }
}

impl SimulationParams {
    pub fn new(model_type: ModelFamily) -> Self {
        Self {
            model_type,
            ..Self::default()
        }
    }

    pub fn with_estimators(mut self, n_estimators: u32) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_clusters(mut self, n_clusters: u32) -> Self {
        self.n_clusters = n_clusters;
        self
    }

    pub fn with_smote(mut self, use_smote: bool) -> Self {
        self.use_smote = use_smote;
        self
    }

    pub fn with_scaling(mut self, scaling_method: ScalingMethod) -> Self {
        self.scaling_method = scaling_method;
        self
    }

    /// Check the ranges the simulation form accepts
    pub fn validate(&self) -> Result<()> {
        if !(10..=500).contains(&self.n_estimators) {
            return Err(invalid("n_estimators", format!("{} is outside 10..=500", self.n_estimators)));
        }
        if let Some(depth) = self.max_depth {
            if !(1..=50).contains(&depth) {
                return Err(invalid("max_depth", format!("{} is outside 1..=50", depth)));
            }
        }
        if !(0.01..=1.0).contains(&self.learning_rate) {
            return Err(invalid(
                "learning_rate",
                format!("{} is outside 0.01..=1.0", self.learning_rate),
            ));
        }
        if !(2..=50).contains(&self.n_clusters) {
            return Err(invalid("n_clusters", format!("{} is outside 2..=50", self.n_clusters)));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: String) -> AdvisoryError {
    AdvisoryError::InvalidParameter {
        key: key.to_string(),
        reason,
    }
}

/// Response of `POST /simulate/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub accuracy: f64,
    pub cv_mean: f64,
    pub cv_std: f64,
    pub features: Vec<String>,
    /// Empty for families without importances (logistic regression)
    #[serde(default)]
    pub feature_importances: Vec<f64>,
    #[serde(default)]
    pub f1_score: Option<f64>,
    #[serde(default)]
    pub kmeans_inertia: Option<f64>,
}
