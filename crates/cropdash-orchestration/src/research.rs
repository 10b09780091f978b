use crate::aggregator::MetricAggregator;
use crate::artifacts::{ArtifactLoader, ArtifactText};
use crate::overlay::{active_snapshot, SimulationOverlay};
use cropdash_core::error::Result;
use cropdash_core::models::{MetricSnapshot, SimulationParams, SimulationResult};
use cropdash_core::ports::RemoteClient;
use std::borrow::Cow;
use std::sync::{Arc, RwLock};

/// User-facing message shown when the snapshot cannot be assembled
pub const DASHBOARD_LOAD_FAILED: &str =
    "Failed to load dashboard metrics. Ensure backend logic is running.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// State of the research page
///
/// Holds the last good production snapshot and derives what to render from it
/// and the simulation overlay.
pub struct ResearchDashboard<C> {
    aggregator: MetricAggregator<C>,
    overlay: SimulationOverlay<C>,
    artifacts: ArtifactLoader<C>,
    page: RwLock<PageState>,
}

struct PageState {
    snapshot: Option<Arc<MetricSnapshot>>,
    load_state: LoadState,
    /// Ticket of the most recently started load
    latest: u64,
}

impl<C: RemoteClient + Clone> ResearchDashboard<C> {
    pub fn new(client: C) -> Self {
        Self {
            aggregator: MetricAggregator::new(client.clone()),
            overlay: SimulationOverlay::new(client.clone()),
            artifacts: ArtifactLoader::new(client),
            page: RwLock::new(PageState {
                snapshot: None,
                load_state: LoadState::Loading,
                latest: 0,
            }),
        }
    }

    /// Fetch a fresh snapshot
    ///
    /// The stored snapshot is replaced only when every metric arrived. When
    /// loads overlap, only the most recently started one updates the page;
    /// an older one still returns its outcome to its caller.
    pub async fn load(&self) -> Result<Arc<MetricSnapshot>> {
        let ticket = {
            let mut page = self.page.write().unwrap();
            page.latest += 1;
            page.load_state = LoadState::Loading;
            page.latest
        };

        let fetched = self.aggregator.fetch_snapshot().await.map(Arc::new);

        let mut page = self.page.write().unwrap();
        if page.latest != ticket {
            tracing::debug!(ticket, latest = page.latest, "Superseded dashboard load ignored");
            return fetched;
        }
        match &fetched {
            Ok(snapshot) => {
                page.snapshot = Some(Arc::clone(snapshot));
                page.load_state = LoadState::Ready;
            }
            Err(_) => {
                page.load_state = LoadState::Failed(DASHBOARD_LOAD_FAILED.to_string());
            }
        }
        fetched
    }

    pub fn load_state(&self) -> LoadState {
        self.page.read().unwrap().load_state.clone()
    }

    /// Last snapshot that loaded completely
    pub fn snapshot(&self) -> Option<Arc<MetricSnapshot>> {
        self.page.read().unwrap().snapshot.clone()
    }

    /// What the dashboard renders, or `None` while loading or after a failure
    ///
    /// Without a live simulation this is the stored snapshot itself.
    pub fn active(&self) -> Option<Arc<MetricSnapshot>> {
        if self.load_state() != LoadState::Ready {
            return None;
        }
        let base = self.snapshot()?;
        let sim = self.overlay.current();
        let derived = match active_snapshot(&base, sim.as_deref()) {
            Cow::Borrowed(_) => None,
            Cow::Owned(snapshot) => Some(Arc::new(snapshot)),
        };
        Some(derived.unwrap_or(base))
    }

    pub async fn run_simulation(&self, params: SimulationParams) -> Result<Arc<SimulationResult>> {
        self.overlay.run_simulation(params).await
    }

    pub fn reset_simulation(&self) {
        self.overlay.reset();
    }

    pub fn is_simulating(&self) -> bool {
        self.overlay.is_simulating()
    }

    pub fn overlay(&self) -> &SimulationOverlay<C> {
        &self.overlay
    }

    pub async fn load_artifacts(&self) -> Vec<ArtifactText> {
        self.artifacts.load_all().await
    }
}
