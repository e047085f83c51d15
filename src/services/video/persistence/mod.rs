//! Durable snapshot of the registry's non-sensitive state.
//!
//! Only the current tab, per-id metadata and error metrics are persisted.
//! Live references hold native handles and are never written out.

mod migrations;
mod store;
mod writer;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use migrations::CURRENT_VERSION;
pub use store::{FileStateStore, MemoryStateStore, StateStore};
pub use writer::SnapshotWriter;

use super::{ErrorMetrics, PlayerId, PlayerMetadata};
use crate::{ReelguardError, Result};

/// Versioned persisted layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    /// Schema version of this snapshot
    pub version: u32,

    /// Tab that was active when the snapshot was taken
    pub current_tab: String,

    /// Metadata of every known id
    #[serde(default)]
    pub players_meta: BTreeMap<PlayerId, PlayerMetadata>,

    /// Process-wide failure counters
    #[serde(default)]
    pub error_metrics: ErrorMetrics,
}

impl PersistedSnapshot {
    /// Empty snapshot at the current schema version.
    pub fn empty(current_tab: impl Into<String>) -> Self {
        Self {
            version: CURRENT_VERSION,
            current_tab: current_tab.into(),
            players_meta: BTreeMap::new(),
            error_metrics: ErrorMetrics::default(),
        }
    }

    /// Serializes the snapshot as pretty JSON.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ReelguardError::Snapshot(e.to_string()))
    }

    /// Parses a stored snapshot, migrating older versions forward.
    ///
    /// # Errors
    /// Returns error if the JSON is malformed, the version is newer than
    /// [`CURRENT_VERSION`], or a migration fails.
    pub fn decode(raw: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ReelguardError::Snapshot(e.to_string()))?;
        let migrated = migrations::migrate(value)?;

        serde_json::from_value(migrated).map_err(|e| ReelguardError::Snapshot(e.to_string()))
    }

    /// Loads the snapshot held by `store`, if any.
    ///
    /// # Errors
    /// Returns error if the store cannot be read or its contents are invalid.
    pub fn load(store: &dyn StateStore) -> Result<Option<Self>> {
        store.load()?.map(|raw| Self::decode(&raw)).transpose()
    }
}

#[cfg(test)]
mod tests;
