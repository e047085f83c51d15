//! Integration tests for the registry's durable state across restarts.

#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::{fs, sync::Arc, time::Duration};

use async_trait::async_trait;
use reelguard::{
    config::{Config, PersistenceConfig, RegistryConfig},
    service_manager::Services,
    services::video::{
        Capabilities, Playable, PlayerError, PlayerStatePatch, VideoPlayerRegistry,
        persistence::{FileStateStore, PersistedSnapshot, StateStore},
    },
};
use tempfile::TempDir;

struct SilentPlayer;

#[async_trait]
impl Playable for SilentPlayer {
    fn capabilities(&self) -> Capabilities {
        Capabilities::PLAY | Capabilities::PAUSE | Capabilities::RESET
    }

    async fn play(&self) -> Result<(), PlayerError> {
        Ok(())
    }

    async fn pause(&self) -> Result<(), PlayerError> {
        Ok(())
    }

    async fn reset(&self) -> Result<(), PlayerError> {
        Err(PlayerError::Other("pipeline stuck".to_string()))
    }
}

fn file_store(dir: &TempDir) -> Arc<FileStateStore> {
    Arc::new(FileStateStore::new(dir.path().join("state/player-state.json")))
}

fn start(store: Arc<FileStateStore>) -> VideoPlayerRegistry {
    let registry = VideoPlayerRegistry::new(
        RegistryConfig::default(),
        store,
        Duration::from_millis(5),
    );
    registry.init();
    registry
}

#[tokio::test]
async fn playing_intent_survives_a_restart() {
    let dir = TempDir::new().unwrap();

    let first = start(file_store(&dir));
    first.register("feed-1", Arc::new(SilentPlayer), None);
    first.update_player_state("feed-1", PlayerStatePatch::playing(true));
    first.teardown().await;

    let second = start(file_store(&dir));
    assert!(second.metadata("feed-1").unwrap().is_playing);

    second.register("feed-1", Arc::new(SilentPlayer), None);
    assert_eq!(
        second.playback_snapshot("feed-1").unwrap().is_playing,
        Some(true)
    );
    second.teardown().await;
}

#[tokio::test]
async fn exhausted_recovery_budget_survives_a_restart() {
    let dir = TempDir::new().unwrap();

    let first = start(file_store(&dir));
    first.register("feed-1", Arc::new(SilentPlayer), None);
    for _ in 0..3 {
        assert!(!first.recover_player("feed-1").await);
    }
    first.teardown().await;

    let second = start(file_store(&dir));
    second.register("feed-1", Arc::new(SilentPlayer), None);
    assert!(!second.recover_player("feed-1").await);

    let metrics = second.error_metrics();
    assert_eq!(metrics.recovery_failures, 3);
    // The shutdown of the first run could not release the handle either.
    assert_eq!(metrics.disposal_errors, 1);
    assert_eq!(metrics.total_errors, 4);

    let error = second.metadata("feed-1").unwrap().last_error.unwrap();
    assert_eq!(error.code, "UNKNOWN_ERROR");
    second.teardown().await;
}

#[tokio::test]
async fn debounced_writer_reaches_disk_without_teardown() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    let registry = start(store.clone());

    registry.set_current_tab("Home");
    registry.update_player_state("feed-7", PlayerStatePatch::playing(true));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let saved = PersistedSnapshot::load(store.as_ref()).unwrap().unwrap();
    assert_eq!(saved.current_tab, "Home");
    assert_eq!(saved.players_meta.len(), 1);
    registry.teardown().await;
}

#[tokio::test]
async fn legacy_state_file_is_migrated_on_start() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    store
        .save(r#"{ "currentTab": "Profile", "players": { "feed-2": { "isPlaying": true } } }"#)
        .unwrap();

    let registry = start(store.clone());

    assert_eq!(registry.current_tab(), "Profile");
    assert!(registry.metadata("feed-2").unwrap().is_playing);

    registry.teardown().await;
    let raw = fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("\"playersMeta\""));
    assert!(raw.contains("\"version\": 2"));
}

#[tokio::test]
async fn services_use_an_in_memory_store_when_persistence_is_disabled() {
    let config = Config {
        persistence: PersistenceConfig {
            enabled: false,
            ..PersistenceConfig::default()
        },
        ..Config::default()
    };

    let services = Services::new(config).unwrap();
    services.init();
    services.video.register("feed-1", Arc::new(SilentPlayer), None);
    assert_eq!(services.video.player_count(), 1);

    services.teardown().await;
    assert_eq!(services.video.player_count(), 0);
}
