//! Unit tests for the video player registry.
//!
//! Player handles are in-process mocks with scripted failures; timing-sensitive
//! tests run on Tokio's paused clock.

#![allow(clippy::unwrap_used, clippy::panic)]


use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{Capabilities, Playable, PlayerError, RegistryEvent, VideoPlayerRegistry};
use crate::{
    config::RegistryConfig,
    services::video::persistence::{MemoryStateStore, PersistedSnapshot},
};

enum Behavior {
    Succeed,
    Fail,
    Hang,
    Panic,
}

/// Scripted player handle recording every call it receives.
pub(super) struct MockPlayer {
    capabilities: Capabilities,
    failures: Mutex<HashMap<&'static str, usize>>,
    hanging: HashSet<&'static str>,
    panicking: HashSet<&'static str>,
    calls: Mutex<Vec<&'static str>>,
}

impl MockPlayer {
    pub(super) fn new() -> Self {
        Self {
            capabilities: Capabilities::all(),
            failures: Mutex::new(HashMap::new()),
            hanging: HashSet::new(),
            panicking: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// `operation` fails on every call.
    pub(super) fn failing(self, operation: &'static str) -> Self {
        self.failing_times(operation, usize::MAX)
    }

    /// `operation` fails on its first `times` calls.
    pub(super) fn failing_times(self, operation: &'static str, times: usize) -> Self {
        self.failures.lock().unwrap().insert(operation, times);
        self
    }

    /// `operation` never completes.
    pub(super) fn hanging(mut self, operation: &'static str) -> Self {
        self.hanging.insert(operation);
        self
    }

    /// `operation` panics inside the handle.
    pub(super) fn panicking(mut self, operation: &'static str) -> Self {
        self.panicking.insert(operation);
        self
    }

    pub(super) fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub(super) fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    pub(super) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn behavior(&self, operation: &'static str) -> Behavior {
        self.calls.lock().unwrap().push(operation);

        if self.panicking.contains(operation) {
            return Behavior::Panic;
        }
        if self.hanging.contains(operation) {
            return Behavior::Hang;
        }

        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(operation) {
            Some(left) if *left > 0 => {
                if *left != usize::MAX {
                    *left -= 1;
                }
                Behavior::Fail
            }
            _ => Behavior::Succeed,
        }
    }

    async fn invoke(&self, operation: &'static str) -> Result<(), PlayerError> {
        match self.behavior(operation) {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(PlayerError::Native {
                code: "E42".to_string(),
                message: format!("{operation} rejected"),
            }),
            Behavior::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
            Behavior::Panic => panic!("{operation} exploded"),
        }
    }
}

#[async_trait]
impl Playable for MockPlayer {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn play(&self) -> Result<(), PlayerError> {
        self.invoke("play").await
    }

    async fn pause(&self) -> Result<(), PlayerError> {
        self.invoke("pause").await
    }

    async fn set_muted(&self, muted: bool) -> Result<(), PlayerError> {
        self.invoke(if muted { "mute" } else { "unmute" }).await
    }

    async fn reset(&self) -> Result<(), PlayerError> {
        self.invoke("reset").await
    }

    async fn release(&self) -> Result<(), PlayerError> {
        self.invoke("release").await
    }
}

/// Handle with a fixed error type, for classification tests.
pub(super) struct ErroringPlayer(pub PlayerError);

#[async_trait]
impl Playable for ErroringPlayer {
    fn capabilities(&self) -> Capabilities {
        Capabilities::RESET
    }

    async fn reset(&self) -> Result<(), PlayerError> {
        Err(self.0.clone())
    }
}

/// Config keeping the reaper out of the way of short tests.
pub(super) fn quiet_config() -> RegistryConfig {
    RegistryConfig {
        sweep_interval_secs: 3600,
        ..RegistryConfig::default()
    }
}

pub(super) fn registry_with(
    config: RegistryConfig,
    store: Arc<MemoryStateStore>,
) -> VideoPlayerRegistry {
    let registry = VideoPlayerRegistry::new(config, store, Duration::from_millis(10));
    registry.init();
    registry
}

pub(super) fn registry() -> (VideoPlayerRegistry, Arc<MemoryStateStore>) {
    let store = Arc::new(MemoryStateStore::new());
    (registry_with(quiet_config(), store.clone()), store)
}

pub(super) fn seeded_store(snapshot: &PersistedSnapshot) -> Arc<MemoryStateStore> {
    Arc::new(MemoryStateStore::with_contents(snapshot.encode().unwrap()))
}

pub(super) fn drain_events(rx: &mut broadcast::Receiver<RegistryEvent>) -> Vec<RegistryEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub(super) fn same_handle(a: &Arc<dyn Playable>, b: &Arc<MockPlayer>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
