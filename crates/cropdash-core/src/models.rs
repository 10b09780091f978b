pub mod artifact;
pub mod location;
pub mod metrics;
pub mod prediction;
pub mod simulation;

pub use artifact::{validate_artifact_name, Artifact, ARTIFACTS};
pub use location::{Language, Suggestion};
pub use metrics::{MetricKey, MetricSnapshot};
pub use prediction::{CropRecommendation, PredictionRequest, PredictionResult};
pub use simulation::{ModelFamily, ScalingMethod, SimulationParams, SimulationResult};
