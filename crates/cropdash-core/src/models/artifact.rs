use crate::error::{AdvisoryError, Result};

/// A static evaluation log served under `/dev/results/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Artifact {
    pub title: &'static str,
    pub file: &'static str,
}

/// Evaluation logs shown below the research dashboard, in display order
pub const ARTIFACTS: [Artifact; 4] = [
    Artifact {
        title: "Model Comparison Report",
        file: "model_comparison.txt",
    },
    Artifact {
        title: "Stratified K-Fold CV Results",
        file: "cross_validation_results.txt",
    },
    Artifact {
        title: "Random Forest Metrics",
        file: "rf_metrics.txt",
    },
    Artifact {
        title: "Boosting Comparison Report",
        file: "boosting_comparison_report.md",
    },
];

/// Reject names the results endpoint would refuse anyway
///
/// Only plain `.txt` and `.md` file names are served; anything that could walk
/// out of the results directory is rejected before a request is made.
pub fn validate_artifact_name(name: &str) -> Result<()> {
    let traversal = name.contains("..") || name.starts_with('/') || name.contains('\\');
    let allowed_ext = name.ends_with(".txt") || name.ends_with(".md");
    if traversal || !allowed_ext || name.contains('/') {
        return Err(AdvisoryError::InvalidArtifact {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_artifacts_are_valid() {
        for artifact in ARTIFACTS {
            assert!(validate_artifact_name(artifact.file).is_ok(), "{}", artifact.file);
        }
    }

    #[test]
    fn test_rejects_unsafe_names() {
        assert!(validate_artifact_name("../secrets.txt").is_err());
        assert!(validate_artifact_name("/etc/passwd.txt").is_err());
        assert!(validate_artifact_name("plots/kmeans_elbow.png").is_err());
        assert!(validate_artifact_name("rf_model.pkl").is_err());
    }
}
