//! Unit tests for config module
//!
//! Tests configuration types, defaults, and serialization.
//! No filesystem dependencies except the explicit temp file case.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use crate::config::{Config, ConfigPaths};

#[test]
fn config_default_matches_documented_policy() {
    let config = Config::default();

    assert_eq!(config.registry.video_tab, "Videos");
    assert_eq!(config.registry.stale_after(), Duration::from_secs(300));
    assert_eq!(config.registry.sweep_interval(), Duration::from_secs(30));
    assert_eq!(config.registry.max_recovery_attempts, 3);

    let disposal = &config.registry.disposal;
    assert_eq!(disposal.unregister.timeout(), Duration::from_millis(500));
    assert_eq!(disposal.unregister.max_attempts, 3);
    assert_eq!(disposal.superseded.timeout(), Duration::from_secs(1));
    assert_eq!(disposal.superseded.max_attempts, 2);
    assert_eq!(disposal.teardown.timeout(), Duration::from_millis(100));
    assert_eq!(disposal.teardown.max_attempts, 1);
}

#[test]
fn config_serialize_toml() {
    let config = Config::default();

    let toml_str = toml::to_string(&config).unwrap();
    assert!(toml_str.contains("[registry]"));
    assert!(toml_str.contains("[persistence]"));
}

#[test]
fn config_empty_toml() {
    let config = Config::from_toml_str("").unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn config_partial_override_keeps_other_defaults() {
    let toml_str = r#"
        [registry]
        video_tab = "Reels"
        stale_after_secs = 60

        [registry.disposal.teardown]
        timeout_ms = 250
        max_attempts = 2
    "#;

    let config = Config::from_toml_str(toml_str).unwrap();

    assert_eq!(config.registry.video_tab, "Reels");
    assert_eq!(config.registry.stale_after(), Duration::from_secs(60));
    assert_eq!(config.registry.sweep_interval_secs, 30);
    assert_eq!(config.registry.disposal.teardown.max_attempts, 2);
    assert_eq!(config.registry.disposal.unregister.max_attempts, 3);
    assert!(config.persistence.enabled);
}

#[test]
fn config_rejects_empty_video_tab() {
    let result = Config::from_toml_str("[registry]\nvideo_tab = \"  \"\n");

    assert!(result.is_err());
}

#[test]
fn config_rejects_zero_disposal_attempts() {
    let toml_str = r#"
        [registry.disposal.unregister]
        timeout_ms = 500
        max_attempts = 0
    "#;

    let err = Config::from_toml_str(toml_str).unwrap_err();
    assert!(err.to_string().contains("max_attempts"));
}

#[test]
fn config_malformed_toml_is_an_error() {
    assert!(Config::from_toml_str("[registry\nvideo_tab = 1").is_err());
}

#[test]
fn sweep_interval_is_never_zero() {
    let mut config = Config::default();
    config.registry.sweep_interval_secs = 0;

    assert_eq!(config.registry.sweep_interval(), Duration::from_secs(1));
}

#[test]
fn load_from_missing_file_uses_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn load_from_file_reads_values() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[persistence]\ndebounce_ms = 10\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.persistence.debounce(), Duration::from_millis(10));
}

#[test]
fn config_paths_end_with_app_name() {
    if let Ok(dir) = ConfigPaths::config_dir() {
        assert!(dir.ends_with("reelguard"));
    }
    if let Ok(dir) = ConfigPaths::state_dir() {
        assert!(dir.ends_with("reelguard"));
    }
}
