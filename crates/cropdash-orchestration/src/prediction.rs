use cropdash_core::error::{AdvisoryError, Result};
use cropdash_core::models::{Language, PredictionRequest, PredictionResult, Suggestion};
use cropdash_core::ports::RemoteClient;
use std::sync::{Arc, Mutex};

/// User-facing message shown when a submission fails
pub const PREDICTION_FAILED: &str = "Failed to fetch prediction. Ensure backend is running.";

/// What the recommendation panel renders
#[derive(Debug, Clone, Default)]
pub struct PredictionView {
    pub selected: Option<Suggestion>,
    pub result: Option<Arc<PredictionResult>>,
    pub error: Option<String>,
    pub loading: bool,
}

/// Select-then-submit cycle with at most one request outstanding
///
/// A result is never merged: success replaces the previous one, failure
/// clears it and sets a single error message.
pub struct PredictionFlow<C> {
    client: C,
    view: Mutex<PredictionView>,
}

/// Clears `loading` when the submission ends, including when it is dropped
struct LoadingGuard<'a>(&'a Mutex<PredictionView>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut view) = self.0.lock() {
            view.loading = false;
        }
    }
}

impl<C: RemoteClient> PredictionFlow<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            view: Mutex::new(PredictionView::default()),
        }
    }

    pub fn select_location(&self, location: Suggestion) {
        tracing::debug!(name = %location.name, "Location selected");
        self.view.lock().unwrap().selected = Some(location);
    }

    /// A location is selected and nothing is in flight
    pub fn can_submit(&self) -> bool {
        let view = self.view.lock().unwrap();
        view.selected.is_some() && !view.loading
    }

    /// Request a recommendation for `location`
    ///
    /// Returns `Busy` without touching state if a request is already
    /// outstanding.
    pub async fn submit(&self, location: &Suggestion, lang: Language) -> Result<Arc<PredictionResult>> {
        {
            let mut view = self.view.lock().unwrap();
            if view.loading {
                return Err(AdvisoryError::Busy {
                    operation: "Prediction".to_string(),
                });
            }
            view.loading = true;
            view.error = None;
            view.result = None;
        }
        let _guard = LoadingGuard(&self.view);

        let request = PredictionRequest::for_location(location, lang);
        tracing::info!(
            name = %location.name,
            latitude = request.latitude,
            longitude = request.longitude,
            lang = %lang,
            "Submitting prediction"
        );

        match self.client.predict(&request).await {
            Ok(result) => {
                let result = Arc::new(result);
                self.view.lock().unwrap().result = Some(Arc::clone(&result));
                tracing::info!(
                    recommendations = result.recommendations().len(),
                    "Prediction received"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::error!(error = %e, "Prediction failed");
                let mut view = self.view.lock().unwrap();
                view.result = None;
                view.error = Some(PREDICTION_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Submit the currently selected location
    pub async fn submit_selected(&self, lang: Language) -> Result<Arc<PredictionResult>> {
        let selected = self.view.lock().unwrap().selected.clone();
        let location = selected.ok_or_else(|| AdvisoryError::InvalidParameter {
            key: "location".to_string(),
            reason: "no location selected".to_string(),
        })?;
        self.submit(&location, lang).await
    }

    pub fn view(&self) -> PredictionView {
        self.view.lock().unwrap().clone()
    }
}
