use std::sync::PoisonError;

use futures::future::join_all;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

use super::{PlayerId, registry::VideoPlayerRegistry};

impl VideoPlayerRegistry {
    /// Unregister every reference idle for longer than the stale threshold.
    ///
    /// Returns the reaped ids, sorted.
    #[instrument(skip(self))]
    pub async fn cleanup_stale_players(&self) -> Vec<PlayerId> {
        let threshold = self.inner.config.stale_after();
        let now = Instant::now();

        let mut stale: Vec<PlayerId> = self
            .inner
            .lock()
            .players
            .values()
            .filter(|reference| now.saturating_duration_since(reference.last_activity) > threshold)
            .map(|reference| reference.id.clone())
            .collect();
        stale.sort();

        if stale.is_empty() {
            return stale;
        }

        info!(count = stale.len(), "Reaping stale players");
        join_all(stale.iter().map(|id| self.unregister(id.clone()))).await;

        stale
    }

    /// Start the periodic sweep. The task holds only a weak reference, so it
    /// ends on its own once the registry is dropped.
    pub(super) fn start_reaper(&self) {
        let period = self.inner.config.sweep_interval();
        let weak = self.downgrade();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                VideoPlayerRegistry::from_inner(inner)
                    .cleanup_stale_players()
                    .await;
            }

            debug!("Stale reaper stopped");
        });

        debug!(period = ?period, "Started stale reaper");
        let previous = self
            .inner
            .reaper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub(super) fn stop_reaper(&self) {
        if let Some(handle) = self
            .inner
            .reaper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }

    /// Whether the periodic sweep is running.
    pub fn reaper_running(&self) -> bool {
        self.inner
            .reaper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
