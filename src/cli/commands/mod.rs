//! Built-in CLI commands, grouped by category.

pub mod metrics;
pub mod players;
pub mod state;

use crate::services::video::persistence::{PersistedSnapshot, StateStore};

use super::CliError;

/// Reads the stored snapshot, falling back to an empty one.
fn load_snapshot(store: &dyn StateStore) -> Result<PersistedSnapshot, CliError> {
    Ok(PersistedSnapshot::load(store)?.unwrap_or_else(|| PersistedSnapshot::empty("")))
}

/// Writes `snapshot` back to the store.
fn save_snapshot(store: &dyn StateStore, snapshot: &PersistedSnapshot) -> Result<(), CliError> {
    store.save(&snapshot.encode()?)?;
    Ok(())
}
