//! Unit tests for the persisted snapshot, its migrations and the stores.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tempfile::TempDir;

use super::{
    CURRENT_VERSION, FileStateStore, MemoryStateStore, PersistedSnapshot, SnapshotWriter,
    StateStore,
};
use crate::{
    ReelguardError, Result,
    services::video::{ErrorMetrics, PlayerId, PlayerMetadata},
};

fn sample_snapshot() -> PersistedSnapshot {
    let mut snapshot = PersistedSnapshot::empty("Videos");
    snapshot.players_meta.insert(
        PlayerId::from("feed-1"),
        PlayerMetadata {
            is_playing: true,
            recovery_attempts: 2,
            ..PlayerMetadata::default()
        },
    );
    snapshot.error_metrics = ErrorMetrics {
        disposal_errors: 1,
        recovery_successes: 2,
        recovery_failures: 0,
        total_errors: 1,
    };
    snapshot
}

#[test]
fn encodes_camel_case_layout() {
    let encoded = sample_snapshot().encode().unwrap();

    assert!(encoded.contains("\"currentTab\": \"Videos\""));
    assert!(encoded.contains("\"playersMeta\""));
    assert!(encoded.contains("\"isPlaying\": true"));
    assert!(encoded.contains("\"recoveryAttempts\": 2"));
    assert!(encoded.contains("\"disposalErrors\": 1"));
    assert!(encoded.contains(&format!("\"version\": {CURRENT_VERSION}")));
}

#[test]
fn decodes_what_it_encodes() {
    let snapshot = sample_snapshot();
    let decoded = PersistedSnapshot::decode(&snapshot.encode().unwrap()).unwrap();

    assert_eq!(decoded, snapshot);
}

#[test]
fn missing_metadata_fields_take_defaults() {
    let raw = r#"{
        "version": 2,
        "currentTab": "Home",
        "playersMeta": { "feed-7": { "isPlaying": true } }
    }"#;

    let decoded = PersistedSnapshot::decode(raw).unwrap();
    let meta = &decoded.players_meta[&PlayerId::from("feed-7")];

    assert!(meta.is_playing);
    assert_eq!(meta.recovery_attempts, 0);
    assert!(meta.last_error.is_none());
    assert_eq!(decoded.error_metrics, ErrorMetrics::default());
}

#[test]
fn migrates_unversioned_v1_snapshot() {
    let raw = r#"{
        "currentTab": "Videos",
        "players": { "feed-2": { "isPlaying": true, "recoveryAttempts": 3 } }
    }"#;

    let decoded = PersistedSnapshot::decode(raw).unwrap();

    assert_eq!(decoded.version, CURRENT_VERSION);
    assert_eq!(decoded.current_tab, "Videos");
    let meta = &decoded.players_meta[&PlayerId::from("feed-2")];
    assert!(meta.is_playing);
    assert_eq!(meta.recovery_attempts, 3);
    assert_eq!(decoded.error_metrics, ErrorMetrics::default());
}

#[test]
fn migrates_explicit_v1_snapshot_without_players() {
    let decoded = PersistedSnapshot::decode(r#"{ "version": 1 }"#).unwrap();

    assert_eq!(decoded.version, CURRENT_VERSION);
    assert!(decoded.players_meta.is_empty());
    assert_eq!(decoded.current_tab, "");
}

#[test]
fn rejects_future_version() {
    let raw = format!(r#"{{ "version": {}, "currentTab": "" }}"#, CURRENT_VERSION + 1);

    match PersistedSnapshot::decode(&raw) {
        Err(ReelguardError::UnsupportedVersion { found, supported }) => {
            assert_eq!(found, CURRENT_VERSION + 1);
            assert_eq!(supported, CURRENT_VERSION);
        }
        other => panic!("expected UnsupportedVersion, got {other:?}"),
    }
}

#[test]
fn rejects_malformed_input() {
    assert!(matches!(
        PersistedSnapshot::decode("not json"),
        Err(ReelguardError::Snapshot(_))
    ));
    assert!(matches!(
        PersistedSnapshot::decode("[1, 2]"),
        Err(ReelguardError::Snapshot(_))
    ));
    assert!(matches!(
        PersistedSnapshot::decode(r#"{ "version": "two" }"#),
        Err(ReelguardError::Snapshot(_))
    ));
}

#[test]
fn load_from_empty_store_is_none() {
    let store = MemoryStateStore::new();

    assert!(PersistedSnapshot::load(&store).unwrap().is_none());
}

#[test]
fn memory_store_counts_saves_and_clears() {
    let store = MemoryStateStore::with_contents("{}");

    store.save("one").unwrap();
    store.save("two").unwrap();
    assert_eq!(store.save_count(), 2);
    assert_eq!(store.load().unwrap().as_deref(), Some("two"));

    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());
    assert_eq!(store.location(), "memory");
}

#[test]
fn file_store_round_trip_creates_parent_dirs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/state/player-state.json");
    let store = FileStateStore::new(&path);

    assert!(store.load().unwrap().is_none());

    store.save(&sample_snapshot().encode().unwrap()).unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let loaded = PersistedSnapshot::load(&store).unwrap().unwrap();
    assert_eq!(loaded, sample_snapshot());
    assert_eq!(store.location(), path.display().to_string());
}

#[test]
fn file_store_clear_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = FileStateStore::new(dir.path().join("player-state.json"));

    store.clear().unwrap();
    store.save("{}").unwrap();
    store.clear().unwrap();
    store.clear().unwrap();

    assert!(store.load().unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn writer_coalesces_bursts() {
    let store = Arc::new(MemoryStateStore::new());
    let writer = SnapshotWriter::new(store.clone(), Duration::from_millis(250));
    writer.start();
    writer.start();

    for tab in ["Home", "Search", "Videos"] {
        writer.publish(PersistedSnapshot::empty(tab));
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.save_count(), 0);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(store.save_count(), 1);

    let saved = PersistedSnapshot::load(store.as_ref()).unwrap().unwrap();
    assert_eq!(saved.current_tab, "Videos");
}

#[tokio::test(start_paused = true)]
async fn writer_flushes_latest_on_stop() {
    let store = Arc::new(MemoryStateStore::new());
    let writer = SnapshotWriter::new(store.clone(), Duration::from_secs(60));
    writer.start();

    writer.publish(PersistedSnapshot::empty("Profile"));
    writer.flush_and_stop();

    assert_eq!(store.save_count(), 1);
    let saved = PersistedSnapshot::load(store.as_ref()).unwrap().unwrap();
    assert_eq!(saved.current_tab, "Profile");
}

/// Store whose saves block the calling thread.
struct SlowStore {
    inner: MemoryStateStore,
    delay: Duration,
}

impl StateStore for SlowStore {
    fn load(&self) -> Result<Option<String>> {
        self.inner.load()
    }

    fn save(&self, contents: &str) -> Result<()> {
        std::thread::sleep(self.delay);
        self.inner.save(contents)
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear()
    }

    fn location(&self) -> String {
        "slow".to_string()
    }
}

#[tokio::test]
async fn slow_store_does_not_stall_the_runtime() {
    let store = Arc::new(SlowStore {
        inner: MemoryStateStore::new(),
        delay: Duration::from_millis(400),
    });
    let writer = SnapshotWriter::new(store.clone(), Duration::from_millis(5));
    writer.start();

    let started = Instant::now();
    writer.publish(PersistedSnapshot::empty("Home"));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(started.elapsed() < Duration::from_millis(300));
    assert_eq!(store.inner.save_count(), 0);

    writer.flush_and_stop();
    assert_eq!(store.inner.save_count(), 2);
}

#[test]
fn writer_without_publish_flushes_nothing() {
    let store = Arc::new(MemoryStateStore::new());
    let writer = SnapshotWriter::new(store.clone(), Duration::from_millis(10));

    writer.flush_and_stop();

    assert_eq!(store.save_count(), 0);
    assert_eq!(writer.store().location(), "memory");
}
