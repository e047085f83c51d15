use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ErrorSeverity, PlayerError};

/// Durable intent and health record of a player slot.
///
/// Outlives the live reference and survives restarts; it is only removed by
/// an explicit unregister or a full state clear.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerMetadata {
    /// Last known intended playback flag. Optimistic: it may disagree with
    /// the native player after a failed call.
    pub is_playing: bool,

    /// Most recent recorded failure
    pub last_error: Option<ErrorSnapshot>,

    /// Recovery attempts made for this id so far
    pub recovery_attempts: u32,

    /// When the last successful recovery happened
    pub last_recovery_time: Option<DateTime<Utc>>,
}

/// Serializable snapshot of a failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSnapshot {
    /// Stable error code
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Classified severity
    pub severity: ErrorSeverity,

    /// When the failure was recorded
    pub at: DateTime<Utc>,
}

impl ErrorSnapshot {
    /// Classifies `error` and stamps it with the current time.
    pub fn capture(error: &PlayerError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
            severity: error.severity(),
            at: Utc::now(),
        }
    }
}
