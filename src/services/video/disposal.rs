//! Strategy-driven teardown of native player handles.
//!
//! Disposal never fails from the caller's point of view: every outcome,
//! including timeouts and errors from the handle, is folded into a
//! [`DisposalOutcome`].

use std::{sync::Arc, time::Duration};

use tokio::time;
use tracing::{debug, instrument, warn};

use super::{
    Capabilities, Playable, PlayerError, PlayerId,
    playable::{pause_if_supported, release_if_supported, set_muted_if_supported},
    supervisor::TaskSupervisor,
};
use crate::config::DisposalPresetConfig;

/// How a handle is torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposalStrategy {
    /// Clean stop (pause, mute) then release
    Graceful,
    /// Release immediately without a clean stop; last resort
    Forced,
    /// Graceful, time-boxed for a superseded or background handle
    Scheduled,
}

impl DisposalStrategy {
    fn stops_cleanly(self) -> bool {
        matches!(self, Self::Graceful | Self::Scheduled)
    }
}

/// Parameters of a single disposal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisposalConfig {
    /// Teardown strategy
    pub strategy: DisposalStrategy,
    /// Upper bound of each attempt
    pub timeout: Duration,
    /// Total attempts including the first; zero is treated as one
    pub max_attempts: u32,
}

impl DisposalConfig {
    /// Builds a config from a configured preset.
    pub fn from_preset(strategy: DisposalStrategy, preset: &DisposalPresetConfig) -> Self {
        Self {
            strategy,
            timeout: preset.timeout(),
            max_attempts: preset.max_attempts,
        }
    }
}

/// Result of a disposal
#[derive(Debug, Clone, PartialEq)]
pub struct DisposalOutcome {
    /// Whether the handle was released
    pub success: bool,
    /// Attempts actually made
    pub attempts: u32,
    /// Last failure, if the disposal did not succeed
    pub error: Option<PlayerError>,
}

/// Tear down `handle` according to `config`, retrying failed attempts.
///
/// A timed-out attempt counts as a failure; the native call it wrapped is
/// left running detached.
#[instrument(skip(handle, capabilities), fields(strategy = ?config.strategy))]
pub async fn dispose_video_player(
    id: &PlayerId,
    handle: &dyn Playable,
    capabilities: Capabilities,
    config: DisposalConfig,
) -> DisposalOutcome {
    let max_attempts = config.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        let result = time::timeout(
            config.timeout,
            dispose_once(handle, capabilities, config.strategy),
        )
        .await;

        match result {
            Ok(Ok(())) => {
                debug!(attempt, "Disposed player {}", id);
                return DisposalOutcome {
                    success: true,
                    attempts: attempt,
                    error: None,
                };
            }
            Ok(Err(e)) => {
                debug!(attempt, error = %e, "Disposal attempt failed for player {}", id);
                last_error = Some(e);
            }
            Err(_) => {
                debug!(attempt, "Disposal attempt timed out for player {}", id);
                last_error = Some(PlayerError::Timeout {
                    operation: "dispose",
                    after: config.timeout,
                });
            }
        }
    }

    warn!(
        attempts = max_attempts,
        "Failed to dispose player {}: {}",
        id,
        last_error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    );

    DisposalOutcome {
        success: false,
        attempts: max_attempts,
        error: last_error,
    }
}

async fn dispose_once(
    handle: &dyn Playable,
    capabilities: Capabilities,
    strategy: DisposalStrategy,
) -> Result<(), PlayerError> {
    if strategy.stops_cleanly() {
        pause_if_supported(handle, capabilities).await?;
        set_muted_if_supported(handle, capabilities, true).await?;
    }

    release_if_supported(handle, capabilities).await
}

/// Dispose `handle` on `supervisor` after `delay`, without the caller
/// awaiting it. `on_outcome` runs inside the detached task.
pub fn schedule_video_player_disposal<F>(
    supervisor: &TaskSupervisor,
    id: PlayerId,
    handle: Arc<dyn Playable>,
    capabilities: Capabilities,
    delay: Duration,
    config: DisposalConfig,
    on_outcome: F,
) where
    F: FnOnce(&PlayerId, DisposalOutcome) + Send + 'static,
{
    debug!(delay = ?delay, "Scheduling disposal of player {}", id);

    supervisor.spawn("scheduled-disposal", async move {
        if !delay.is_zero() {
            time::sleep(delay).await;
        }
        let outcome = dispose_video_player(&id, handle.as_ref(), capabilities, config).await;
        on_outcome(&id, outcome);
    });
}
