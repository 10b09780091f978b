//! Dashboard command implementation

use super::CommandContext;
use crate::backend::Client;
use crate::cli::DashboardArgs;
use crate::errors;
use crate::output::summarize_payload;
use crate::output_types::DashboardOutput;
use anyhow::Result;
use cropdash_core::error::AdvisoryError;
use cropdash_core::models::{MetricKey, MetricSnapshot};
use cropdash_orchestration::research::DASHBOARD_LOAD_FAILED;
use cropdash_orchestration::ResearchDashboard;
use std::sync::Arc;
use tabled::Tabled;

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    key: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Payload")]
    summary: String,
}

/// Load the research dashboard, mapping failures to the dashboard-level error
pub async fn load_dashboard(
    ctx: &CommandContext,
) -> Result<(ResearchDashboard<Client>, Arc<MetricSnapshot>)> {
    let research = ResearchDashboard::new(ctx.client.clone());
    let loaded = research.load().await;
    match loaded {
        Ok(snapshot) => Ok((research, snapshot)),
        Err(e @ AdvisoryError::SnapshotIncomplete { .. }) => {
            Err(errors::dashboard_incomplete(DASHBOARD_LOAD_FAILED, &e).into())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn execute(args: DashboardArgs, ctx: &CommandContext) -> Result<()> {
    let focus = args
        .metric
        .as_deref()
        .map(|name| {
            MetricKey::from_endpoint(name)
                .ok_or_else(|| errors::invalid_value("metric", &format!("unknown metric endpoint: {}", name)))
        })
        .transpose()?;

    let (_research, snapshot) = load_dashboard(ctx).await?;

    if let Some(key) = focus {
        let payload = snapshot.get(key);
        if ctx.output.is_json() {
            return ctx.output.result(payload);
        }
        ctx.output.section(key.snapshot_key());
        ctx.output.text(serde_json::to_string_pretty(payload)?);
        return Ok(());
    }

    if ctx.output.is_json() {
        return ctx.output.result(DashboardOutput {
            fetched_at: snapshot.fetched_at(),
            metrics: snapshot.to_json(),
        });
    }

    ctx.output.section("Research Dashboard");
    ctx.output.kv("Fetched", snapshot.fetched_at().format("%Y-%m-%d %H:%M:%S UTC"));
    let rows: Vec<MetricRow> = snapshot
        .keys()
        .map(|key| MetricRow {
            key: key.snapshot_key().to_string(),
            endpoint: key.endpoint().to_string(),
            summary: summarize_payload(snapshot.get(key)),
        })
        .collect();
    ctx.output.table(rows);
    ctx.output.success(format!("{} metrics loaded", MetricKey::ALL.len()));

    Ok(())
}
