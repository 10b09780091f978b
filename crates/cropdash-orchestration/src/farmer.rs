use crate::prediction::{PredictionFlow, PredictionView};
use crate::search::{SearchView, SuggestionSearch};
use cropdash_core::config::SearchSettings;
use cropdash_core::error::Result;
use cropdash_core::models::{Language, PredictionResult, Suggestion};
use cropdash_core::ports::RemoteClient;
use std::sync::{Arc, RwLock};

/// State of the farmer page: location search feeding a prediction
pub struct FarmerDashboard<C: RemoteClient + Clone + 'static> {
    search: SuggestionSearch<C>,
    prediction: PredictionFlow<C>,
    language: RwLock<Language>,
}

impl<C: RemoteClient + Clone + 'static> FarmerDashboard<C> {
    pub fn new(client: C, settings: SearchSettings, language: Language) -> Self {
        Self {
            search: SuggestionSearch::new(client.clone(), settings),
            prediction: PredictionFlow::new(client),
            language: RwLock::new(language),
        }
    }

    pub fn on_query_changed(&self, text: impl Into<String>) {
        self.search.on_query_changed(text);
    }

    /// Accept a suggestion and make it the location to predict for
    pub fn accept_suggestion(&self, item: Suggestion) {
        let accepted = self.search.on_suggestion_accepted(item);
        self.prediction.select_location(accepted);
    }

    pub fn set_language(&self, language: Language) {
        *self.language.write().unwrap() = language;
    }

    pub fn language(&self) -> Language {
        *self.language.read().unwrap()
    }

    /// Predict for the accepted location in the current language
    pub async fn submit(&self) -> Result<Arc<PredictionResult>> {
        self.prediction.submit_selected(self.language()).await
    }

    pub fn can_submit(&self) -> bool {
        self.prediction.can_submit()
    }

    pub fn search(&self) -> &SuggestionSearch<C> {
        &self.search
    }

    pub fn search_view(&self) -> SearchView {
        self.search.view()
    }

    pub fn prediction_view(&self) -> PredictionView {
        self.prediction.view()
    }
}
