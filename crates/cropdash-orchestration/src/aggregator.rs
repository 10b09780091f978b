use cropdash_core::error::{AdvisoryError, MetricFailure, Result};
use cropdash_core::models::{MetricKey, MetricSnapshot};
use cropdash_core::ports::RemoteClient;
use futures::future::join_all;
use std::collections::BTreeMap;

/// Fetches every research metric concurrently into one snapshot
///
/// All lookups are issued at once and awaited as a full barrier. The snapshot
/// is all-or-nothing: several panels cross-reference each other's payloads
/// (cluster membership needs the cluster map), so if any lookup fails the
/// whole call fails and no partial map escapes.
pub struct MetricAggregator<C> {
    client: C,
}

impl<C: RemoteClient> MetricAggregator<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Fetch one payload per `MetricKey`
    ///
    /// On failure the error lists every key that failed, not just the first.
    pub async fn fetch_snapshot(&self) -> Result<MetricSnapshot> {
        let client = &self.client;
        let results = join_all(
            MetricKey::ALL
                .into_iter()
                .map(|key| async move { (key, client.fetch_metric(key).await) }),
        )
        .await;

        let mut payloads = BTreeMap::new();
        let mut failures = Vec::new();
        for (key, result) in results {
            match result {
                Ok(payload) => {
                    payloads.insert(key, payload);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Metric lookup failed");
                    failures.push(MetricFailure {
                        key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !failures.is_empty() {
            tracing::error!(
                failed = failures.len(),
                total = MetricKey::ALL.len(),
                "Discarding incomplete metric snapshot"
            );
            return Err(AdvisoryError::SnapshotIncomplete { failures });
        }

        let snapshot = MetricSnapshot::from_complete(payloads)?;
        tracing::info!(metrics = MetricKey::ALL.len(), "Metric snapshot loaded");
        Ok(snapshot)
    }
}
