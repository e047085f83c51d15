use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings of the durable player state snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Whether the snapshot is written to disk at all.
    pub enabled: bool,

    /// File name of the snapshot inside the state directory.
    pub state_file: String,

    /// Quiet period before a burst of mutations is flushed.
    pub debounce_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            state_file: "player-state.json".to_string(),
            debounce_ms: 250,
        }
    }
}

impl PersistenceConfig {
    /// Debounce window of the snapshot writer.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
