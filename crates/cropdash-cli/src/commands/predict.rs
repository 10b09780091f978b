//! Predict command implementation

use super::search::suggestion_rows;
use super::{type_query, CommandContext};
use crate::cli::PredictArgs;
use crate::errors;
use crate::output_types::PredictOutput;
use anyhow::Result;
use cropdash_orchestration::prediction::PREDICTION_FAILED;
use cropdash_orchestration::FarmerDashboard;
use std::time::Duration;
use tabled::Tabled;

#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Crop")]
    crop: String,
    #[tabled(rename = "Local Name")]
    localized: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
}

pub async fn execute(args: PredictArgs, ctx: &CommandContext) -> Result<()> {
    let language = ctx.config.language.value;
    let farmer = FarmerDashboard::new(ctx.client.clone(), ctx.config.search_settings(), language);

    type_query(farmer.search(), &args.text, Duration::from_millis(args.keystroke_ms)).await;
    let view = farmer.search().settled().await;

    if view.suggestions.is_empty() {
        return Err(errors::no_suggestions(&args.text).into());
    }
    if args.pick == 0 || args.pick > view.suggestions.len() {
        if !ctx.output.is_json() {
            ctx.output.table(suggestion_rows(&view.suggestions));
        }
        return Err(errors::pick_out_of_range(args.pick, view.suggestions.len()).into());
    }

    let location = view.suggestions[args.pick - 1].clone();
    farmer.accept_suggestion(location.clone());
    ctx.output.info(format!("Selected {}", location.name));

    let result = match farmer.submit().await {
        Ok(result) => result,
        Err(e) if e.is_transient() => {
            return Err(errors::backend_unavailable(PREDICTION_FAILED, &e).into());
        }
        Err(e) => return Err(e.into()),
    };

    let recommendations = result.recommendations();
    let advisory = result.advisory();

    if ctx.output.is_json() {
        return ctx.output.result(PredictOutput {
            location,
            language: language.code().to_string(),
            recommendations,
            advisory,
            raw: result.raw().clone(),
        });
    }

    ctx.output.section(format!("Recommendations for {}", location.name));
    if let Some(applied) = result.applied_language() {
        if applied != language {
            ctx.output.warning(format!(
                "Requested {} but the backend answered in {}",
                language.display_name(),
                applied.display_name()
            ));
        }
    }
    let rows: Vec<RecommendationRow> = recommendations
        .iter()
        .enumerate()
        .map(|(i, r)| RecommendationRow {
            rank: i + 1,
            crop: r.crop.clone(),
            localized: r.crop_localized.clone().unwrap_or_default(),
            confidence: r.confidence.clone(),
        })
        .collect();
    ctx.output.table(rows);

    if !advisory.is_empty() {
        ctx.output.section("Advisory");
        for (key, tip) in &advisory {
            ctx.output.kv(humanize(key), tip);
        }
    }

    Ok(())
}

/// `fertilizer_tip` -> `Fertilizer tip`
fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
