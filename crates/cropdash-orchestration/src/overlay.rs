//! Ephemeral what-if results layered over the production snapshot
//!
//! The overlay never touches the base snapshot. The active view is derived on
//! demand: without a simulation it is the base itself, with one it is a
//! shallow copy where exactly `model_comparison`, `cross_validation` and
//! `feature_importance` come from the simulation.
//!
//! Cross-validation folds are synthesized for display only: five values
//! within ±0.01 of the reported mean so the fold chart keeps its shape. They
//! are not real fold scores and the payload is marked `"synthetic": true`.

use cropdash_core::error::Result;
use cropdash_core::models::{MetricKey, MetricSnapshot, SimulationParams, SimulationResult};
use cropdash_core::ports::RemoteClient;
use rand::Rng;
use serde_json::{json, Value};
use std::borrow::Cow;
use std::sync::{Arc, Mutex};

pub const SIMULATED_MODEL_LABEL: &str = "Simulated Model";
pub const SYNTHETIC_FOLDS: usize = 5;
pub const FOLD_JITTER: f64 = 0.01;

/// Keys replaced while a simulation is active
pub const OVERLAID_KEYS: [MetricKey; 3] = [
    MetricKey::ModelComparison,
    MetricKey::CrossValidation,
    MetricKey::FeatureImportance,
];

/// Derive the snapshot the dashboard should render
pub fn active_snapshot<'a>(
    base: &'a MetricSnapshot,
    sim: Option<&SimulationResult>,
) -> Cow<'a, MetricSnapshot> {
    active_snapshot_with_rng(base, sim, &mut rand::rng())
}

/// Same as [`active_snapshot`] with a caller-supplied source of fold jitter
pub fn active_snapshot_with_rng<'a, R: Rng + ?Sized>(
    base: &'a MetricSnapshot,
    sim: Option<&SimulationResult>,
    rng: &mut R,
) -> Cow<'a, MetricSnapshot> {
    match sim {
        None => Cow::Borrowed(base),
        Some(sim) => Cow::Owned(base.with_overrides(overlay_payloads(sim, rng))),
    }
}

/// The three replacement payloads for a simulation result
pub fn overlay_payloads<R: Rng + ?Sized>(
    sim: &SimulationResult,
    rng: &mut R,
) -> [(MetricKey, Value); 3] {
    let folds: Vec<String> = (1..=SYNTHETIC_FOLDS).map(|i| format!("Fold {}", i)).collect();
    let accuracies: Vec<f64> = (0..SYNTHETIC_FOLDS)
        .map(|_| (sim.cv_mean + rng.random_range(-FOLD_JITTER..=FOLD_JITTER)).clamp(0.0, 1.0))
        .collect();

    [
        (
            MetricKey::ModelComparison,
            json!({
                "labels": [SIMULATED_MODEL_LABEL],
                "accuracy": [sim.accuracy]
            }),
        ),
        (
            MetricKey::CrossValidation,
            json!({
                "folds": folds,
                "accuracies": accuracies,
                "mean": sim.cv_mean,
                "std": sim.cv_std,
                "synthetic": true
            }),
        ),
        (
            MetricKey::FeatureImportance,
            json!({
                "features": sim.features,
                "importances": sim.feature_importances
            }),
        ),
    ]
}

#[derive(Debug, Default)]
struct OverlayState {
    current: Option<Arc<SimulationResult>>,
    /// Ticket of the most recent run or reset
    latest: u64,
    running: usize,
}

/// Holds at most one live simulation result
pub struct SimulationOverlay<C> {
    client: C,
    state: Mutex<OverlayState>,
}

/// Decrements the running count even if the run future is dropped
struct RunGuard<'a>(&'a Mutex<OverlayState>);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.0.lock() {
            state.running = state.running.saturating_sub(1);
        }
    }
}

impl<C: RemoteClient> SimulationOverlay<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: Mutex::new(OverlayState::default()),
        }
    }

    /// Run a simulation and make it the live result
    ///
    /// The result is stored only if no newer run was started and no reset
    /// happened while this one was in flight. The caller always receives its
    /// own result. A failed run leaves the previous result in place.
    pub async fn run_simulation(&self, params: SimulationParams) -> Result<Arc<SimulationResult>> {
        params.validate()?;

        let ticket = {
            let mut state = self.state.lock().unwrap();
            state.latest += 1;
            state.running += 1;
            state.latest
        };
        let _guard = RunGuard(&self.state);

        tracing::info!(model = %params.model_type, ticket, "Running simulation");
        let outcome = self.client.simulate(&params).await;

        match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                let mut state = self.state.lock().unwrap();
                if state.latest == ticket {
                    state.current = Some(Arc::clone(&result));
                    tracing::info!(
                        ticket,
                        accuracy = result.accuracy,
                        cv_mean = result.cv_mean,
                        "Simulation overlay applied"
                    );
                } else {
                    tracing::debug!(ticket, latest = state.latest, "Superseded simulation ignored");
                }
                Ok(result)
            }
            Err(e) => {
                tracing::error!(ticket, error = %e, "Simulation failed");
                Err(e)
            }
        }
    }

    /// Drop the live result; the dashboard falls back to production values
    ///
    /// Idempotent and local: no request is made. A run still in flight will
    /// not re-apply when it completes.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        state.latest += 1;
        if state.current.take().is_some() {
            tracing::info!("Simulation overlay reset");
        }
    }

    pub fn current(&self) -> Option<Arc<SimulationResult>> {
        self.state.lock().unwrap().current.clone()
    }

    /// A simulation result is live
    pub fn is_simulating(&self) -> bool {
        self.state.lock().unwrap().current.is_some()
    }

    /// A run has been issued and not yet answered
    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().running > 0
    }

    pub fn active_snapshot<'a>(&self, base: &'a MetricSnapshot) -> Cow<'a, MetricSnapshot> {
        active_snapshot(base, self.current().as_deref())
    }
}
