//! Search command implementation

use super::{type_query, CommandContext};
use crate::cli::SearchArgs;
use crate::output_types::SearchOutput;
use anyhow::Result;
use cropdash_core::models::Suggestion;
use cropdash_orchestration::SuggestionSearch;
use std::time::Duration;
use tabled::Tabled;

#[derive(Tabled)]
pub struct SuggestionRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Location")]
    pub name: String,
    #[tabled(rename = "Latitude")]
    pub latitude: String,
    #[tabled(rename = "Longitude")]
    pub longitude: String,
}

pub fn suggestion_rows(suggestions: &[Suggestion]) -> Vec<SuggestionRow> {
    suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| SuggestionRow {
            index: i + 1,
            name: s.name.clone(),
            latitude: format!("{:.4}", s.latitude),
            longitude: format!("{:.4}", s.longitude),
        })
        .collect()
}

pub async fn execute(args: SearchArgs, ctx: &CommandContext) -> Result<()> {
    let search = SuggestionSearch::new(ctx.client.clone(), ctx.config.search_settings());

    type_query(&search, &args.text, Duration::from_millis(args.keystroke_ms)).await;
    let view = search.settled().await;

    if ctx.output.is_json() {
        return ctx.output.result(SearchOutput {
            query: view.query,
            suggestions: view.suggestions,
        });
    }

    ctx.output.section(format!("Suggestions for \"{}\"", view.query));
    if view.suggestions.is_empty() {
        let min = ctx.config.min_query_chars.value;
        if view.query.chars().count() <= min {
            ctx.output.info(format!("Type more than {} characters to search", min));
        } else {
            ctx.output.info("No matching locations");
        }
    } else {
        ctx.output.table(suggestion_rows(&view.suggestions));
    }

    Ok(())
}
