//! Debounce and staleness behaviour of the suggestion search
//!
//! All tests run on paused time so the 500 ms window is virtual.

use cropdash_client::MemoryRemoteClient;
use cropdash_core::config::SearchSettings;
use cropdash_core::models::Suggestion;
use cropdash_orchestration::SuggestionSearch;
use std::time::Duration;
use tokio::time::sleep;

fn pune_client() -> MemoryRemoteClient {
    MemoryRemoteClient::new().with_suggestions("Pune", vec![Suggestion::new("Pune, India", 18.52, 73.85)])
}

async fn type_slowly<C>(search: &SuggestionSearch<C>, text: &str, gap: Duration)
where
    C: cropdash_core::RemoteClient + 'static,
{
    let mut typed = String::new();
    for ch in text.chars() {
        typed.push(ch);
        search.on_query_changed(typed.clone());
        sleep(gap).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_keystrokes_within_window_issue_one_lookup() {
    let client = pune_client();
    let search = SuggestionSearch::new(client.clone(), SearchSettings::default());

    type_slowly(&search, "Pune", Duration::from_millis(100)).await;
    let view = search.settled().await;

    assert_eq!(client.search_calls(), vec!["Pune"]);
    assert_eq!(view.suggestions.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_lookup_waits_for_full_debounce() {
    let client = pune_client();
    let search = SuggestionSearch::new(client.clone(), SearchSettings::default());

    search.on_query_changed("Pune");
    sleep(Duration::from_millis(499)).await;
    assert!(client.search_calls().is_empty());

    sleep(Duration::from_millis(2)).await;
    search.settled().await;
    assert_eq!(client.search_calls(), vec!["Pune"]);
}

#[tokio::test(start_paused = true)]
async fn test_pauses_longer_than_window_issue_separate_lookups() {
    let client = pune_client();
    let search = SuggestionSearch::new(client.clone(), SearchSettings::default());

    search.on_query_changed("Pune");
    sleep(Duration::from_millis(600)).await;
    search.on_query_changed("Pune C");
    search.settled().await;

    assert_eq!(client.search_calls(), vec!["Pune", "Pune C"]);
}

#[tokio::test(start_paused = true)]
async fn test_short_query_makes_no_request_and_clears_list() {
    let client = pune_client();
    let search = SuggestionSearch::new(client.clone(), SearchSettings::default());

    search.on_query_changed("Pune");
    search.settled().await;
    assert_eq!(search.view().suggestions.len(), 1);

    search.on_query_changed("Pun");
    let view = search.settled().await;

    assert_eq!(client.search_calls(), vec!["Pune"]);
    assert!(view.suggestions.is_empty());
    assert!(view.active_typing);
}

#[tokio::test(start_paused = true)]
async fn test_threshold_counts_characters_not_bytes() {
    let client = MemoryRemoteClient::new();
    let search = SuggestionSearch::new(client.clone(), SearchSettings::default());

    // Three characters, six bytes.
    search.on_query_changed("ñáé");
    search.settled().await;

    assert!(client.search_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_pune_scenario_end_to_end() {
    let client = pune_client();
    let search = SuggestionSearch::new(client.clone(), SearchSettings::default());

    search.on_query_changed("Pun");
    search.settled().await;
    assert!(client.search_calls().is_empty());

    search.on_query_changed("Pune");
    let view = search.settled().await;
    assert_eq!(client.search_calls(), vec!["Pune"]);
    assert_eq!(view.suggestions, vec![Suggestion::new("Pune, India", 18.52, 73.85)]);

    let accepted = search.on_suggestion_accepted(view.suggestions[0].clone());
    let view = search.view();
    assert_eq!(accepted.name, "Pune, India");
    assert_eq!(view.query, "Pune, India");
    assert!(view.suggestions.is_empty());
    assert!(!view.active_typing);
}

#[tokio::test(start_paused = true)]
async fn test_accept_before_timer_suppresses_lookup() {
    let client = MemoryRemoteClient::with_fixtures();
    let search = SuggestionSearch::new(client.clone(), SearchSettings::default());

    search.on_query_changed("Nashik");
    sleep(Duration::from_millis(200)).await;
    search.on_suggestion_accepted(Suggestion::new("Nashik, Maharashtra, India", 19.9975, 73.7898));
    sleep(Duration::from_secs(2)).await;

    let view = search.view();
    assert!(client.search_calls().is_empty());
    assert!(view.suggestions.is_empty());
    assert_eq!(view.query, "Nashik, Maharashtra, India");
}

#[tokio::test(start_paused = true)]
async fn test_accept_during_lookup_discards_response() {
    let client = MemoryRemoteClient::with_fixtures().with_search_latency("Ludhiana", Duration::from_secs(1));
    let search = SuggestionSearch::new(client.clone(), SearchSettings::default());

    search.on_query_changed("Ludhiana");
    sleep(Duration::from_millis(600)).await;
    assert!(search.view().is_loading());

    search.on_suggestion_accepted(Suggestion::new("Ludhiana, Punjab, India", 30.901, 75.8573));
    let view = search.settled().await;

    // The request still went out; its answer was ignored.
    assert_eq!(client.search_calls(), vec!["Ludhiana"]);
    assert!(view.suggestions.is_empty());
    assert!(!view.active_typing);
}

#[tokio::test(start_paused = true)]
async fn test_slow_older_response_never_overwrites_newer() {
    let client = MemoryRemoteClient::with_fixtures()
        .with_suggestions("Nash", vec![Suggestion::new("Nashville, USA", 36.16, -86.78)])
        .with_search_latency("Nash", Duration::from_secs(2));
    let search = SuggestionSearch::new(client.clone(), SearchSettings::default());

    search.on_query_changed("Nash");
    sleep(Duration::from_millis(600)).await;
    search.on_query_changed("Nashik");
    let view = search.settled().await;

    assert_eq!(client.search_calls(), vec!["Nash", "Nashik"]);
    assert_eq!(view.suggestions.len(), 1);
    assert_eq!(view.suggestions[0].name, "Nashik, Maharashtra, India");
}

#[tokio::test(start_paused = true)]
async fn test_failed_lookup_degrades_to_empty_list() {
    let failing = MemoryRemoteClient::new().fail_search();
    let search = SuggestionSearch::new(failing.clone(), SearchSettings::default());
    search.on_query_changed("Pune");
    let view = search.settled().await;

    assert_eq!(failing.search_calls(), vec!["Pune"]);
    assert!(view.suggestions.is_empty());
    assert!(!view.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_custom_settings_are_honoured() {
    let client = MemoryRemoteClient::new().with_suggestions("Pu", vec![Suggestion::new("Puri", 19.81, 85.83)]);
    let settings = SearchSettings {
        debounce: Duration::from_millis(100),
        min_query_chars: 1,
    };
    let search = SuggestionSearch::new(client.clone(), settings);

    let started = tokio::time::Instant::now();
    search.on_query_changed("Pu");
    let view = search.settled().await;

    assert!(started.elapsed() >= Duration::from_millis(100));
    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(view.suggestions[0].name, "Puri");
}
