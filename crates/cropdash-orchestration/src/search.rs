//! Debounced location-suggestion search
//!
//! Keystrokes arrive through [`SuggestionSearch::on_query_changed`]. Each edit
//! bumps a generation counter and re-arms the single debounce timer; when the
//! timer elapses a lookup is issued for the query text of that generation.
//! A lookup result is applied only while its generation is still current, so
//! a response that lands after the user typed again, or after a suggestion was
//! accepted, can never repopulate the list.
//!
//! In-flight lookups are never cancelled. Only the timer is.

use cropdash_core::config::SearchSettings;
use cropdash_core::models::Suggestion;
use cropdash_core::ports::RemoteClient;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Observable state of the search box
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchView {
    /// Current text of the input
    pub query: String,
    /// Dropdown contents
    pub suggestions: Vec<Suggestion>,
    /// True from the first edit until a suggestion is accepted
    pub active_typing: bool,
    /// Incremented on every edit and on acceptance
    pub generation: u64,
    timer_armed: bool,
    in_flight: usize,
}

impl SearchView {
    /// A lookup has been issued and not yet answered
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn has_pending_timer(&self) -> bool {
        self.timer_armed
    }

    /// Nothing scheduled and nothing in flight
    pub fn is_settled(&self) -> bool {
        !self.timer_armed && self.in_flight == 0
    }
}

struct Inner<C> {
    client: C,
    settings: SearchSettings,
    state: watch::Sender<SearchView>,
}

/// Turns a stream of edits into at most one lookup per settled pause
pub struct SuggestionSearch<C: RemoteClient + 'static> {
    inner: Arc<Inner<C>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<C: RemoteClient + 'static> SuggestionSearch<C> {
    pub fn new(client: C, settings: SearchSettings) -> Self {
        let (state, _) = watch::channel(SearchView::default());
        Self {
            inner: Arc::new(Inner {
                client,
                settings,
                state,
            }),
            pending: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> SearchSettings {
        self.inner.settings
    }

    /// Record an edit and restart the debounce timer
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_query_changed(&self, text: impl Into<String>) {
        let text = text.into();
        // Held across the bump and the swap so the stored timer always
        // belongs to the newest generation.
        let mut pending = self.pending.lock().unwrap();

        let mut generation = 0;
        self.inner.state.send_modify(|state| {
            state.query = text;
            state.active_typing = true;
            state.generation += 1;
            state.timer_armed = true;
            generation = state.generation;
        });

        let inner = Arc::clone(&self.inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(inner.settings.debounce).await;
            Inner::fire(&inner, generation);
        });

        if let Some(previous) = pending.replace(timer) {
            previous.abort();
        }
    }

    /// Commit a selection and suppress any lookup scheduled before it
    ///
    /// Returns the accepted item so the caller can hand it to the prediction
    /// flow.
    pub fn on_suggestion_accepted(&self, item: Suggestion) -> Suggestion {
        let mut pending = self.pending.lock().unwrap();
        if let Some(timer) = pending.take() {
            timer.abort();
        }

        self.inner.state.send_modify(|state| {
            state.active_typing = false;
            state.generation += 1;
            state.query = item.name.clone();
            state.suggestions.clear();
            state.timer_armed = false;
        });
        drop(pending);

        tracing::debug!(name = %item.name, "Suggestion accepted");
        item
    }

    pub fn view(&self) -> SearchView {
        self.inner.state.borrow().clone()
    }

    /// Watch every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.inner.state.subscribe()
    }

    /// Wait until no timer is armed and no lookup is in flight
    pub async fn settled(&self) -> SearchView {
        let mut rx = self.inner.state.subscribe();
        loop {
            {
                let view = rx.borrow_and_update();
                if view.is_settled() {
                    return view.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.view();
            }
        }
    }
}

impl<C: RemoteClient + 'static> Drop for SuggestionSearch<C> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(timer) = pending.take() {
                timer.abort();
            }
        }
    }
}

enum Fire {
    Skip,
    Clear,
    Lookup(String),
}

impl<C: RemoteClient + 'static> Inner<C> {
    /// Debounce timer for `generation` elapsed
    fn fire(inner: &Arc<Self>, generation: u64) {
        let mut action = Fire::Skip;
        inner.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            state.timer_armed = false;
            if !state.active_typing {
                return true;
            }
            if state.query.chars().count() > inner.settings.min_query_chars {
                state.in_flight += 1;
                action = Fire::Lookup(state.query.clone());
            } else {
                state.suggestions.clear();
                action = Fire::Clear;
            }
            true
        });

        match action {
            Fire::Skip => {}
            Fire::Clear => {
                tracing::debug!(generation, "Query below threshold, suggestions cleared");
            }
            Fire::Lookup(query) => {
                tracing::debug!(query = %query, generation, "Issuing suggestion lookup");
                let inner = Arc::clone(inner);
                // Detached: superseding the timer never aborts a request.
                tokio::spawn(async move {
                    inner.lookup(generation, query).await;
                });
            }
        }
    }

    async fn lookup(&self, generation: u64, query: String) {
        let outcome = self.client.search_locations(&query).await;

        self.state.send_modify(|state| {
            state.in_flight -= 1;
            if state.generation != generation {
                tracing::debug!(
                    query = %query,
                    generation,
                    current = state.generation,
                    "Discarding stale suggestion lookup"
                );
                return;
            }
            match outcome {
                Ok(suggestions) => {
                    tracing::debug!(query = %query, count = suggestions.len(), "Suggestions updated");
                    state.suggestions = suggestions;
                }
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "Suggestion lookup failed");
                    state.suggestions.clear();
                }
            }
        });
    }
}
