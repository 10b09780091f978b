//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use cropdash_core::config::{
    CliConfigOverrides, ConfigSource, ConfigValue, LayeredConfig, DEFAULT_BASE_URL,
};
use cropdash_core::models::Language;
use proptest::prelude::*;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn clear_env() {
    env::remove_var("CROPDASH_BASE_URL");
    env::remove_var("CROPDASH_DEBOUNCE_MS");
    env::remove_var("CROPDASH_MIN_QUERY_CHARS");
    env::remove_var("CROPDASH_LANGUAGE");
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", contents).unwrap();
    file
}

#[test]
fn test_partial_file_configuration() {
    let file = config_file(
        r#"
debounce_ms = 300
# Everything else stays at defaults
"#,
    );

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.debounce_ms.value, 300);
    assert_eq!(config.debounce_ms.source, ConfigSource::File);
    assert_eq!(config.base_url.value, DEFAULT_BASE_URL);
    assert_eq!(config.base_url.source, ConfigSource::Default);
    assert_eq!(config.language.source, ConfigSource::Default);
}

#[test]
fn test_missing_file_is_an_error() {
    let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/cropdash.toml");
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let file = config_file(
        r#"
base_url = "http://file.example/api"
language = "fr"
"#,
    );

    env::set_var("CROPDASH_LANGUAGE", "mr");
    env::set_var("CROPDASH_DEBOUNCE_MS", "750");

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(config.base_url.value, "http://file.example/api");
    assert_eq!(config.base_url.source, ConfigSource::File);
    assert_eq!(config.language.value, Language::Mr);
    assert_eq!(config.language.source, ConfigSource::Environment);
    assert_eq!(config.search_settings().debounce, Duration::from_millis(750));

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    clear_env();
    env::set_var("CROPDASH_DEBOUNCE_MS", "soon");
    env::set_var("CROPDASH_BASE_URL", "not a url");
    env::set_var("CROPDASH_LANGUAGE", "de");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.debounce_ms.value, 500);
    assert_eq!(config.debounce_ms.source, ConfigSource::Default);
    assert_eq!(config.base_url.source, ConfigSource::Default);
    assert_eq!(config.language.value, Language::En);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_everything() {
    clear_env();
    let file = config_file(r#"min_query_chars = 5"#);
    env::set_var("CROPDASH_MIN_QUERY_CHARS", "4");

    let mut config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();
    config.update_from_cli(CliConfigOverrides {
        min_query_chars: Some(2),
        ..Default::default()
    });

    assert_eq!(config.min_query_chars.value, 2);
    assert_eq!(config.min_query_chars.source, ConfigSource::Cli);
    assert_eq!(config.search_settings().min_query_chars, 2);

    clear_env();
}

fn source_strategy() -> impl Strategy<Value = ConfigSource> {
    prop_oneof![
        Just(ConfigSource::Default),
        Just(ConfigSource::File),
        Just(ConfigSource::Environment),
        Just(ConfigSource::Cli),
    ]
}

proptest! {
    /// Whatever order the layers are applied in, the highest-precedence write wins
    #[test]
    fn prop_highest_precedence_wins(updates in prop::collection::vec((0u32..1000, source_strategy()), 1..12)) {
        let mut value = ConfigValue::new(u32::MAX, ConfigSource::Default);
        for (v, source) in &updates {
            value.update(*v, *source);
        }

        let best = updates.iter().map(|(_, s)| s.precedence()).max().unwrap();
        if best == 0 {
            prop_assert_eq!(value.value, u32::MAX);
        } else {
            let expected = updates.iter().find(|(_, s)| s.precedence() == best).unwrap().0;
            prop_assert_eq!(value.value, expected);
            prop_assert_eq!(value.source.precedence(), best);
        }
    }
}
