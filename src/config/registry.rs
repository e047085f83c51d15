use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Player registry configuration.
///
/// Durations are stored as plain integers so the TOML stays readable; use
/// the accessor methods to get [`Duration`] values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Name of the only tab with playback semantics.
    pub video_tab: String,

    /// A reference idle for longer than this is reaped.
    pub stale_after_secs: u64,

    /// Period of the stale reaper sweep.
    pub sweep_interval_secs: u64,

    /// Delay before resuming playback after entering the video tab.
    pub frame_delay_ms: u64,

    /// Hard cap of recovery attempts per id.
    pub max_recovery_attempts: u32,

    /// Upper bound of a single recovery reset.
    pub recovery_timeout_ms: u64,

    /// Delay before a superseded handle is torn down.
    pub superseded_delay_ms: u64,

    /// Timeout and attempt presets for each disposal path.
    pub disposal: DisposalPresets,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            video_tab: "Videos".to_string(),
            stale_after_secs: 300,
            sweep_interval_secs: 30,
            frame_delay_ms: 16,
            max_recovery_attempts: 3,
            recovery_timeout_ms: 2000,
            superseded_delay_ms: 50,
            disposal: DisposalPresets::default(),
        }
    }
}

impl RegistryConfig {
    /// Inactivity threshold of the stale reaper.
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    /// Period between two stale sweeps. Never zero.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    /// Deferral applied before resuming the video tab.
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }

    /// Timeout applied to a recovery reset.
    pub fn recovery_timeout(&self) -> Duration {
        Duration::from_millis(self.recovery_timeout_ms)
    }

    /// Delay before disposing a superseded handle.
    pub fn superseded_delay(&self) -> Duration {
        Duration::from_millis(self.superseded_delay_ms)
    }
}

/// Disposal presets for the three teardown paths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisposalPresets {
    /// Graceful disposal on unmount.
    pub unregister: DisposalPresetConfig,

    /// Scheduled disposal of a handle replaced by a newer registration.
    pub superseded: DisposalPresetConfig,

    /// Forced disposal at process shutdown.
    pub teardown: DisposalPresetConfig,
}

impl Default for DisposalPresets {
    fn default() -> Self {
        Self {
            unregister: DisposalPresetConfig {
                timeout_ms: 500,
                max_attempts: 3,
            },
            superseded: DisposalPresetConfig {
                timeout_ms: 1000,
                max_attempts: 2,
            },
            teardown: DisposalPresetConfig {
                timeout_ms: 100,
                max_attempts: 1,
            },
        }
    }
}

/// Timeout and attempt budget of a single disposal path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisposalPresetConfig {
    /// Upper bound of each attempt, in milliseconds.
    pub timeout_ms: u64,

    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
}

impl DisposalPresetConfig {
    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
