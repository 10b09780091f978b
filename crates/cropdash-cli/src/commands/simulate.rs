//! Simulate command implementation

use super::dashboard::load_dashboard;
use super::CommandContext;
use crate::cli::SimulateArgs;
use crate::output_types::{PanelDiff, SimulateOutput};
use anyhow::{bail, Result};
use cropdash_core::models::{MetricKey, SimulationParams};
use cropdash_orchestration::overlay::OVERLAID_KEYS;
use serde_json::Value;
use std::collections::BTreeMap;
use tabled::Tabled;

#[derive(Tabled)]
struct DiffRow {
    #[tabled(rename = "Panel")]
    panel: String,
    #[tabled(rename = "Production")]
    production: String,
    #[tabled(rename = "Simulated")]
    simulated: String,
}

fn params_from(args: &SimulateArgs) -> SimulationParams {
    SimulationParams::new(args.model)
        .with_estimators(args.estimators)
        .with_max_depth(args.max_depth)
        .with_learning_rate(args.learning_rate)
        .with_clusters(args.clusters)
        .with_smote(args.smote)
        .with_scaling(args.scaling)
}

pub async fn execute(args: SimulateArgs, ctx: &CommandContext) -> Result<()> {
    let params = params_from(&args);
    let (research, production) = load_dashboard(ctx).await?;

    ctx.output.info(format!(
        "Running {} with {} estimators",
        params.model_type, params.n_estimators
    ));
    let result = research.run_simulation(params).await?;

    let Some(active) = research.active() else {
        bail!("Dashboard is not ready");
    };
    let overridden: BTreeMap<String, PanelDiff> = OVERLAID_KEYS
        .iter()
        .map(|&key| {
            let diff = PanelDiff {
                production: production.get(key).clone(),
                simulated: active.get(key).clone(),
            };
            (key.snapshot_key().to_string(), diff)
        })
        .collect();

    if args.reset {
        research.reset_simulation();
        match research.active() {
            Some(restored) if *restored == *production => {}
            _ => bail!("Production metrics were not restored after reset"),
        }
    }

    if ctx.output.is_json() {
        return ctx.output.result(SimulateOutput {
            result: (*result).clone(),
            overridden,
            reset: args.reset,
        });
    }

    ctx.output.section("Simulation Result");
    ctx.output.kv("Accuracy", format!("{:.4}", result.accuracy));
    if let Some(f1) = result.f1_score {
        ctx.output.kv("F1 score", format!("{:.4}", f1));
    }
    ctx.output.kv("CV mean", format!("{:.4} ± {:.4}", result.cv_mean, result.cv_std));
    if let Some(inertia) = result.kmeans_inertia {
        ctx.output.kv("KMeans inertia", format!("{:.1}", inertia));
    }

    ctx.output.section("Overridden Panels");
    let rows: Vec<DiffRow> = OVERLAID_KEYS
        .iter()
        .map(|&key| DiffRow {
            panel: key.snapshot_key().to_string(),
            production: headline(key, production.get(key)),
            simulated: headline(key, active.get(key)),
        })
        .collect();
    ctx.output.table(rows);
    ctx.output.info("Cross-validation folds for a simulation are synthesized around the reported mean");

    if args.reset {
        ctx.output.success("Simulation reset, production metrics restored");
    }

    Ok(())
}

/// Short human description of an overridable panel
fn headline(key: MetricKey, payload: &Value) -> String {
    match key {
        MetricKey::ModelComparison => best_of(payload, "labels", "accuracy")
            .map(|(label, acc)| format!("best: {} ({:.4})", label, acc))
            .unwrap_or_else(|| "-".to_string()),
        MetricKey::CrossValidation => match (payload["mean"].as_f64(), payload["std"].as_f64()) {
            (Some(mean), Some(std)) => format!("mean {:.4} ± {:.4}", mean, std),
            (Some(mean), None) => format!("mean {:.4}", mean),
            _ => "-".to_string(),
        },
        MetricKey::FeatureImportance => best_of(payload, "features", "importances")
            .map(|(feature, weight)| format!("top: {} ({:.3})", feature, weight))
            .unwrap_or_else(|| "-".to_string()),
        _ => crate::output::summarize_payload(payload),
    }
}

/// Label paired with the largest value in two parallel arrays
fn best_of(payload: &Value, labels: &str, values: &str) -> Option<(String, f64)> {
    let labels = payload[labels].as_array()?;
    let values = payload[values].as_array()?;
    labels
        .iter()
        .zip(values)
        .filter_map(|(label, value)| Some((label.as_str()?.to_string(), value.as_f64()?)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_headline_model_comparison() {
        let payload = json!({
            "labels": ["Random Forest", "AdaBoost"],
            "accuracy": [0.9932, 0.8841]
        });

        assert_eq!(
            headline(MetricKey::ModelComparison, &payload),
            "best: Random Forest (0.9932)"
        );
    }

    #[test]
    fn test_headline_tolerates_missing_fields() {
        assert_eq!(headline(MetricKey::FeatureImportance, &json!({})), "-");
        assert_eq!(
            headline(MetricKey::CrossValidation, &json!({ "mean": 0.9 })),
            "mean 0.9000"
        );
    }

    #[test]
    fn test_best_of_skips_ill_typed_entries() {
        let payload = json!({ "features": ["N", 7, "K"], "importances": [0.2, 0.9, 0.4] });

        assert_eq!(best_of(&payload, "features", "importances"), Some(("K".to_string(), 0.4)));
    }
}
