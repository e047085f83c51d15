use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Errors reported by a player handle or by the registry's calls into it
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlayerError {
    /// Handle doesn't implement the requested operation
    #[error("operation '{0}' is not supported by this player")]
    Unsupported(&'static str),

    /// Native call did not settle in time
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// Operation that timed out
        operation: &'static str,
        /// Timeout that was exceeded
        after: Duration,
    },

    /// Handle was already released by the native layer
    #[error("player {0} is already released")]
    Released(PlayerId),

    /// Native layer rejected the call with a known error code
    #[error("native player error {code}: {message}")]
    Native {
        /// Native error code
        code: String,
        /// Native error message
        message: String,
    },

    /// Failure the registry has no classification for
    #[error("{0}")]
    Other(String),
}

/// How bad a recorded failure is for the affected player
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Expected and harmless
    Low,
    /// Degrades a single player
    Medium,
    /// Player is likely unusable until remounted
    High,
}

impl PlayerError {
    /// Stable code used in persisted error snapshots.
    pub fn code(&self) -> String {
        match self {
            Self::Unsupported(_) => "PLAYER_UNSUPPORTED".to_string(),
            Self::Timeout { .. } => "PLAYER_TIMEOUT".to_string(),
            Self::Released(_) => "PLAYER_RELEASED".to_string(),
            Self::Native { code, .. } => format!("NATIVE_{code}"),
            Self::Other(_) => "UNKNOWN_ERROR".to_string(),
        }
    }

    /// Severity assigned to this kind of failure.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Unsupported(_) => ErrorSeverity::Low,
            Self::Timeout { .. } | Self::Native { .. } => ErrorSeverity::Medium,
            Self::Released(_) | Self::Other(_) => ErrorSeverity::High,
        }
    }

    /// Whether the failure belongs to a known kind.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}
