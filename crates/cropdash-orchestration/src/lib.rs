//! Cropdash Orchestration - Asynchronous data coordination for the dashboards
//!
//! Each component owns its slice of page state and is the only writer to it:
//! - [`SuggestionSearch`]: debounced, generation-checked location lookups
//! - [`MetricAggregator`]: all-or-nothing fan-out over every research metric
//! - [`SimulationOverlay`]: reversible what-if results layered over a snapshot
//! - [`PredictionFlow`]: single in-flight crop recommendation request
//!
//! [`FarmerDashboard`] and [`ResearchDashboard`] bundle them per page.
//!
//! Component state sits behind `std::sync` locks that are unwrapped on
//! acquire. Poisoning only follows a panic while a lock is held, and no lock
//! is ever held across an `.await`.

pub mod aggregator;
pub mod artifacts;
pub mod farmer;
pub mod overlay;
pub mod prediction;
pub mod research;
pub mod search;

pub use aggregator::MetricAggregator;
pub use artifacts::{ArtifactLoader, ArtifactText};
pub use farmer::FarmerDashboard;
pub use overlay::{active_snapshot, active_snapshot_with_rng, SimulationOverlay};
pub use prediction::{PredictionFlow, PredictionView};
pub use research::{LoadState, ResearchDashboard};
pub use search::{SearchView, SuggestionSearch};
