//! Metric aggregation and simulation overlay

use cropdash_client::{MemoryRemoteClient, RemoteCall};
use cropdash_core::error::AdvisoryError;
use cropdash_core::models::{
    MetricKey, MetricSnapshot, ModelFamily, SimulationParams, SimulationResult,
};
use cropdash_orchestration::overlay::{OVERLAID_KEYS, FOLD_JITTER, SIMULATED_MODEL_LABEL};
use cropdash_orchestration::{active_snapshot, active_snapshot_with_rng, MetricAggregator, SimulationOverlay};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

fn scenario_result() -> SimulationResult {
    SimulationResult {
        accuracy: 0.91,
        cv_mean: 0.90,
        cv_std: 0.02,
        features: vec!["N".into(), "P".into(), "K".into()],
        feature_importances: vec![0.4, 0.3, 0.3],
        f1_score: None,
        kmeans_inertia: None,
    }
}

fn result_with_accuracy(accuracy: f64) -> SimulationResult {
    SimulationResult {
        accuracy,
        ..scenario_result()
    }
}

async fn fixture_snapshot() -> MetricSnapshot {
    MetricAggregator::new(MemoryRemoteClient::with_fixtures())
        .fetch_snapshot()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_snapshot_contains_every_metric() {
    let snapshot = fixture_snapshot().await;

    assert_eq!(snapshot.keys().count(), MetricKey::ALL.len());
    for key in MetricKey::ALL {
        assert!(!snapshot.get(key).is_null(), "{} missing", key);
    }
}

#[tokio::test]
async fn test_one_failure_rejects_whole_snapshot() {
    let client = MemoryRemoteClient::with_fixtures().fail_metric(MetricKey::ClusterMap);
    let aggregator = MetricAggregator::new(client.clone());

    let err = aggregator.fetch_snapshot().await.unwrap_err();

    assert!(matches!(err, AdvisoryError::SnapshotIncomplete { .. }));
    assert_eq!(err.failed_metrics(), vec![MetricKey::ClusterMap]);
    // No fail-fast: every lookup was still issued.
    let metric_calls = client
        .calls()
        .into_iter()
        .filter(|call| matches!(call, RemoteCall::Metric(_)))
        .count();
    assert_eq!(metric_calls, MetricKey::ALL.len());
}

#[tokio::test]
async fn test_every_failed_key_is_reported() {
    let client = MemoryRemoteClient::with_fixtures()
        .fail_metric(MetricKey::ShapSummary)
        .fail_metric(MetricKey::ClassDistribution);

    let err = MetricAggregator::new(client).fetch_snapshot().await.unwrap_err();

    let mut failed = err.failed_metrics();
    failed.sort();
    let mut expected = vec![MetricKey::ShapSummary, MetricKey::ClassDistribution];
    expected.sort();
    assert_eq!(failed, expected);
    assert!(err.is_transient());
}

#[tokio::test(start_paused = true)]
async fn test_lookups_run_concurrently() {
    let client = MemoryRemoteClient::with_fixtures().with_latency(Duration::from_secs(1));
    let started = Instant::now();

    MetricAggregator::new(client).fetch_snapshot().await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_no_simulation_is_identity() {
    let base = fixture_snapshot().await;

    let active = active_snapshot(&base, None);

    assert!(std::ptr::eq(active.as_ref(), &base));
}

#[tokio::test]
async fn test_overlay_only_touches_three_keys() {
    let base = fixture_snapshot().await;
    let active = active_snapshot(&base, Some(&scenario_result()));

    for key in MetricKey::ALL {
        let shared = Arc::ptr_eq(active.payload(key), base.payload(key));
        if OVERLAID_KEYS.contains(&key) {
            assert!(!shared, "{} should be overridden", key);
        } else {
            assert!(shared, "{} should be shared with base", key);
        }
    }
    assert_eq!(active.fetched_at(), base.fetched_at());
}

#[tokio::test]
async fn test_simulation_scenario_and_reset() {
    let client = MemoryRemoteClient::with_fixtures().with_simulation(scenario_result());
    let base = MetricAggregator::new(client.clone()).fetch_snapshot().await.unwrap();
    let production = base.get(MetricKey::ModelComparison).clone();
    let overlay = SimulationOverlay::new(client);

    let params = SimulationParams::new(ModelFamily::RandomForest).with_estimators(50);
    let result = overlay.run_simulation(params).await.unwrap();
    assert_eq!(result.accuracy, 0.91);
    assert!(overlay.is_simulating());

    let active = overlay.active_snapshot(&base);
    assert_eq!(
        active.get(MetricKey::ModelComparison),
        &json!({ "labels": [SIMULATED_MODEL_LABEL], "accuracy": [0.91] })
    );
    assert_eq!(active.get(MetricKey::CrossValidation)["mean"], json!(0.90));

    overlay.reset();
    let active = overlay.active_snapshot(&base);
    assert!(!overlay.is_simulating());
    assert_eq!(active.as_ref(), &base);
    assert_eq!(active.get(MetricKey::ModelComparison), &production);
}

#[tokio::test]
async fn test_reset_is_idempotent_and_local() {
    let client = MemoryRemoteClient::with_fixtures();
    let overlay = SimulationOverlay::new(client.clone());

    overlay.reset();
    overlay.reset();

    assert!(overlay.current().is_none());
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_params_rejected_before_request() {
    let client = MemoryRemoteClient::with_fixtures();
    let overlay = SimulationOverlay::new(client.clone());

    let err = overlay
        .run_simulation(SimulationParams::default().with_estimators(5))
        .await
        .unwrap_err();

    assert!(matches!(err, AdvisoryError::InvalidParameter { .. }));
    assert_eq!(client.call_count(), 0);
    assert!(!overlay.is_running());
}

#[tokio::test]
async fn test_failed_run_keeps_previous_result() {
    let client = MemoryRemoteClient::with_fixtures().with_simulation(scenario_result());
    let overlay = SimulationOverlay::new(client.clone());
    overlay.run_simulation(SimulationParams::default()).await.unwrap();

    client.set_fail_simulate(true);
    let err = overlay.run_simulation(SimulationParams::default()).await;

    assert!(err.is_err());
    assert_eq!(overlay.current().unwrap().accuracy, 0.91);
    assert!(!overlay.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_last_issued_run_wins() {
    let client = MemoryRemoteClient::with_fixtures();
    client.queue_simulation(Duration::from_secs(2), result_with_accuracy(0.80));
    client.queue_simulation(Duration::from_millis(100), result_with_accuracy(0.95));
    let overlay = SimulationOverlay::new(client);

    let (first, second) = tokio::join!(overlay.run_simulation(SimulationParams::default()), async {
        sleep(Duration::from_millis(10)).await;
        overlay.run_simulation(SimulationParams::default()).await
    });

    // Each caller still sees its own answer.
    assert_eq!(first.unwrap().accuracy, 0.80);
    assert_eq!(second.unwrap().accuracy, 0.95);
    assert_eq!(overlay.current().unwrap().accuracy, 0.95);
}

#[tokio::test(start_paused = true)]
async fn test_run_finishing_after_reset_does_not_reapply() {
    let client = MemoryRemoteClient::with_fixtures();
    client.queue_simulation(Duration::from_secs(1), scenario_result());
    let overlay = SimulationOverlay::new(client);

    let (run, _) = tokio::join!(overlay.run_simulation(SimulationParams::default()), async {
        sleep(Duration::from_millis(100)).await;
        assert!(overlay.is_running());
        overlay.reset();
    });

    assert!(run.is_ok());
    assert!(overlay.current().is_none());
    assert!(!overlay.is_running());
}

fn any_result() -> impl Strategy<Value = SimulationResult> {
    (0.0..=1.0f64, 0.0..=1.0f64, 0.0..0.2f64, prop::collection::vec(0.0..1.0f64, 0..8)).prop_map(
        |(accuracy, cv_mean, cv_std, importances)| SimulationResult {
            accuracy,
            cv_mean,
            cv_std,
            features: (0..importances.len()).map(|i| format!("f{}", i)).collect(),
            feature_importances: importances,
            f1_score: None,
            kmeans_inertia: None,
        },
    )
}

fn plain_snapshot() -> MetricSnapshot {
    let payloads = MetricKey::ALL
        .into_iter()
        .map(|key| (key, json!({ "key": key.snapshot_key() })))
        .collect();
    MetricSnapshot::from_complete(payloads).unwrap()
}

proptest! {
    #[test]
    fn prop_fold_jitter_stays_in_bounds(sim in any_result(), seed in any::<u64>()) {
        let base = plain_snapshot();
        let mut rng = StdRng::seed_from_u64(seed);

        let active = active_snapshot_with_rng(&base, Some(&sim), &mut rng);
        let accuracies = active.get(MetricKey::CrossValidation)["accuracies"].as_array().unwrap().clone();

        prop_assert_eq!(accuracies.len(), 5);
        for value in accuracies {
            let v = value.as_f64().unwrap();
            prop_assert!((0.0..=1.0).contains(&v));
            prop_assert!((v - sim.cv_mean).abs() <= FOLD_JITTER + 1e-12);
        }
    }

    #[test]
    fn prop_untouched_keys_are_shared(sim in any_result(), seed in any::<u64>()) {
        let base = plain_snapshot();
        let mut rng = StdRng::seed_from_u64(seed);

        let active = active_snapshot_with_rng(&base, Some(&sim), &mut rng);

        for key in MetricKey::ALL {
            if !OVERLAID_KEYS.contains(&key) {
                prop_assert!(Arc::ptr_eq(active.payload(key), base.payload(key)));
            }
        }
    }
}
