//! Error types for the crop advisory client

use crate::models::MetricKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvisoryError {
    // Remote errors
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Request to {endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    // Aggregation errors
    #[error("Metric snapshot incomplete: {} of the lookups failed ({})", failures.len(), describe_failures(failures))]
    SnapshotIncomplete { failures: Vec<MetricFailure> },

    // Flow errors
    #[error("{operation} is already in progress")]
    Busy { operation: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidParameter { key: String, reason: String },

    #[error("Invalid artifact name: {name}")]
    InvalidArtifact { name: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AdvisoryError {
    /// Whether the failure came from the network round-trip itself
    ///
    /// Best-effort callers (suggestion search, artifact loading) absorb these;
    /// everything else is a caller or configuration mistake.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AdvisoryError::Transport { .. }
                | AdvisoryError::Status { .. }
                | AdvisoryError::Decode { .. }
                | AdvisoryError::SnapshotIncomplete { .. }
        )
    }

    /// Metric keys that caused a snapshot failure, empty for other variants
    pub fn failed_metrics(&self) -> Vec<MetricKey> {
        match self {
            AdvisoryError::SnapshotIncomplete { failures } => {
                failures.iter().map(|f| f.key).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// One failed lookup inside an aggregate snapshot failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricFailure {
    pub key: MetricKey,
    pub reason: String,
}

fn describe_failures(failures: &[MetricFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.key, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for AdvisoryError {
    fn from(err: serde_json::Error) -> Self {
        AdvisoryError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdvisoryError>;
