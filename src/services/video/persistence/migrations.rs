use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{ReelguardError, Result};

/// Newest snapshot schema this build writes.
pub const CURRENT_VERSION: u32 = 2;

/// Snapshots without a version field predate versioning and use the v1 layout.
const UNVERSIONED: u32 = 1;

type MigrationFn = fn(Value) -> Result<Value>;

/// Each entry upgrades a snapshot from `from` to `from + 1`.
const MIGRATIONS: &[(u32, MigrationFn)] = &[(1, v1_to_v2)];

/// Upgrades `value` step by step to [`CURRENT_VERSION`].
pub(super) fn migrate(mut value: Value) -> Result<Value> {
    let mut version = read_version(&value)?;

    if version > CURRENT_VERSION {
        return Err(ReelguardError::UnsupportedVersion {
            found: version,
            supported: CURRENT_VERSION,
        });
    }

    while version < CURRENT_VERSION {
        let (_, step) = MIGRATIONS
            .iter()
            .find(|(from, _)| *from == version)
            .ok_or_else(|| {
                ReelguardError::Snapshot(format!("no migration from version {version}"))
            })?;

        debug!(from = version, to = version + 1, "Migrating persisted state");
        value = step(value)?;
        version += 1;
    }

    Ok(value)
}

fn read_version(value: &Value) -> Result<u32> {
    let object = value
        .as_object()
        .ok_or_else(|| ReelguardError::Snapshot("snapshot is not an object".to_string()))?;

    match object.get("version") {
        None => Ok(UNVERSIONED),
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| ReelguardError::Snapshot(format!("invalid version field: {v}"))),
    }
}

/// v1 kept metadata under `players` and had no error metrics.
fn v1_to_v2(value: Value) -> Result<Value> {
    let Value::Object(mut object) = value else {
        return Err(ReelguardError::Snapshot("snapshot is not an object".to_string()));
    };

    let players = object
        .remove("players")
        .unwrap_or_else(|| Value::Object(Map::new()));
    let current_tab = object
        .remove("currentTab")
        .unwrap_or_else(|| Value::String(String::new()));

    Ok(json!({
        "version": 2,
        "currentTab": current_tab,
        "playersMeta": players,
        "errorMetrics": {
            "disposalErrors": 0,
            "recoverySuccesses": 0,
            "recoveryFailures": 0,
            "totalErrors": 0,
        },
    }))
}
