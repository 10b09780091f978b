use crate::error::{AdvisoryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A geocoded place returned by the location search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Display name, e.g. "Pune, Maharashtra, India"
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Suggestion {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Languages the prediction backend can localize advisories into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Mr,
    Es,
    Fr,
}

impl Language {
    pub const ALL: [Language; 5] =
        [Language::En, Language::Hi, Language::Mr, Language::Es, Language::Fr];

    /// ISO 639-1 code sent as `lang`
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Mr => "mr",
            Language::Es => "es",
            Language::Fr => "fr",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Mr => "Marathi",
            Language::Es => "Spanish",
            Language::Fr => "French",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AdvisoryError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| {
                lang.code() == normalized || lang.display_name().to_lowercase() == normalized
            })
            .ok_or_else(|| AdvisoryError::ConfigInvalid {
                key: "language".to_string(),
                reason: format!("Unsupported language: {}. Use one of en, hi, mr, es, fr", s),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert_eq!("MR".parse::<Language>().unwrap(), Language::Mr);
        assert_eq!("Hindi".parse::<Language>().unwrap(), Language::Hi);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_serializes_as_code() {
        let json = serde_json::to_string(&Language::Fr).unwrap();
        assert_eq!(json, "\"fr\"");
    }

    #[test]
    fn test_suggestion_deserializes_from_search_payload() {
        let raw = r#"{"name":"Pune, India","latitude":18.52,"longitude":73.85}"#;
        let suggestion: Suggestion = serde_json::from_str(raw).unwrap();
        assert_eq!(suggestion, Suggestion::new("Pune, India", 18.52, 73.85));
    }
}
