use super::location::{Language, Suggestion};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Body of `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub lang: Language,
}

impl PredictionRequest {
    pub fn for_location(location: &Suggestion, lang: Language) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            lang,
        }
    }
}

/// One ranked crop from the prediction payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecommendation {
    pub crop: String,
    #[serde(default)]
    pub crop_localized: Option<String>,
    /// Pre-formatted by the backend, e.g. "87.5%"
    #[serde(default)]
    pub confidence: String,
}

/// Opaque payload returned by the prediction endpoint
///
/// The core only carries it; the accessors below read the well-known fields
/// leniently and return empty values when the backend omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionResult(pub Value);

impl PredictionResult {
    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn recommendations(&self) -> Vec<CropRecommendation> {
        self.0
            .get("recommendations")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn advisory(&self) -> BTreeMap<String, String> {
        self.0
            .get("advisory")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Language the backend actually applied, which may differ from the request
    pub fn applied_language(&self) -> Option<Language> {
        self.0
            .pointer("/language/applied")
            .and_then(Value::as_str)
            .and_then(|code| code.parse().ok())
    }
}
