use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn missing_database_url_is_an_error() {
    let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
    assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
}

#[test]
fn blank_database_url_is_an_error() {
    let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).unwrap_err();
    assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
}

#[test]
fn defaults_apply() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")])).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    assert!(cfg.backend.is_none());
    assert_eq!(cfg.chat, ChatSessionConfig::default());
}

#[test]
fn invalid_port_is_rejected() {
    let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x"), ("PORT", "http")])).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "PORT", value: "http".into() });
}

#[test]
fn zero_sweep_interval_is_rejected() {
    let err = AppConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("CHAT_SWEEP_INTERVAL_SECS", " 0 "),
    ]))
    .unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "CHAT_SWEEP_INTERVAL_SECS", value: "0".into() });
}

#[test]
fn custom_sweep_interval_is_used() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("CHAT_SWEEP_INTERVAL_SECS", "15"),
    ]))
    .unwrap();
    assert_eq!(cfg.chat.sweep_interval, Duration::from_secs(15));
}

#[test]
fn backend_url_trailing_slash_trimmed() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("BACKEND_URL", "https://backend.example.com/"),
        ("BACKEND_REQUEST_TIMEOUT_SECS", "5"),
    ]))
    .unwrap();
    let backend = cfg.backend.expect("backend configured");
    assert_eq!(backend.base_url, "https://backend.example.com");
    assert_eq!(backend.request_timeout, Duration::from_secs(5));
    assert_eq!(backend.connect_timeout, Duration::from_secs(DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS));
}

#[test]
fn empty_backend_url_means_unconfigured() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x"), ("BACKEND_URL", "")])).unwrap();
    assert!(cfg.backend.is_none());
}

#[test]
fn malformed_numbers_fall_back_to_defaults() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("DATABASE_URL", "postgres://x"),
        ("DB_MAX_CONNECTIONS", "lots"),
        ("CHAT_SESSION_IDLE_SECS", "90"),
    ]))
    .unwrap();
    assert_eq!(cfg.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    assert_eq!(cfg.chat.idle_timeout, Duration::from_secs(90));
}

#[test]
fn env_parse_unset_returns_default() {
    assert_eq!(env_parse("__TEST_ACCORRIA_SURELY_UNSET_71__", 42_u32), 42);
}
