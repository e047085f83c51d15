use std::sync::Arc;

use chrono::Utc;
use tokio::time;
use tracing::{debug, info, instrument, warn};

use super::{
    ErrorSnapshot, PlaybackState, Playable, PlayerError, PlayerId, RegistryEvent,
    playable::reset_if_supported, registry::VideoPlayerRegistry,
};

impl VideoPlayerRegistry {
    /// Try to unstick `id` by resetting its native pipeline.
    ///
    /// Each id gets at most `max_recovery_attempts` tries over its lifetime;
    /// the count is kept in metadata and only a full state clear resets it.
    /// Once the cap is reached this returns `false` without touching the
    /// handle. Failures are classified and stored in the id's metadata.
    #[instrument(skip(self, id), fields(player = tracing::field::Empty))]
    pub async fn recover_player(&self, id: impl Into<PlayerId>) -> bool {
        let id = id.into();
        tracing::Span::current().record("player", tracing::field::display(&id));
        let max_attempts = self.inner.config.max_recovery_attempts;

        let target = {
            let mut guard = self.inner.lock();
            let state = &mut *guard;

            let attempts = state.metadata.get(&id).map_or(0, |meta| meta.recovery_attempts);
            if attempts >= max_attempts {
                debug!(attempts, "Recovery cap reached for player {}", id);
                None
            } else if let Some(reference) = state.players.get(&id) {
                let target = (Arc::clone(&reference.handle), reference.capabilities);
                state.metadata.entry(id.clone()).or_default().recovery_attempts += 1;
                self.inner.persist(state);
                Some(target)
            } else {
                debug!("Recovery requested for unmounted player {}", id);
                None
            }
        };

        let Some((handle, capabilities)) = target else {
            self.inner.emit(RegistryEvent::RecoveryFailed(id));
            return false;
        };

        let timeout = self.inner.config.recovery_timeout();
        let result = match time::timeout(timeout, reset_if_supported(handle.as_ref(), capabilities))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(PlayerError::Timeout {
                operation: "reset",
                after: timeout,
            }),
        };

        match result {
            Ok(reset) => {
                if !reset {
                    debug!("Player {} cannot reset, nothing to recover", id);
                }
                self.record_recovery_success(&id, &handle);
                info!("Recovered player {}", id);
                true
            }
            Err(e) => {
                if e.is_recognized() {
                    debug!(error = %e, "Recovery failed for player {}", id);
                } else {
                    warn!(error = %e, "Recovery failed for player {} with unclassified error", id);
                }
                self.record_recovery_failure(&id, &handle, &e);
                false
            }
        }
    }

    fn record_recovery_success(&self, id: &PlayerId, handle: &Arc<dyn Playable>) {
        {
            let mut guard = self.inner.lock();
            let state = &mut *guard;

            state.metrics.record_recovery_success();
            // Metadata removed mid-flight belongs to an unregistered id; do not resurrect it.
            if let Some(meta) = state.metadata.get_mut(id) {
                meta.last_recovery_time = Some(Utc::now());
            }
            if let Some(reference) = state
                .players
                .get_mut(id)
                .filter(|reference| reference.holds(handle))
            {
                reference.state = PlaybackState::Idle;
                reference.touch();
            }
            self.inner.persist(state);
        }

        self.inner.emit(RegistryEvent::Recovered(id.clone()));
    }

    fn record_recovery_failure(
        &self,
        id: &PlayerId,
        handle: &Arc<dyn Playable>,
        error: &PlayerError,
    ) {
        {
            let mut guard = self.inner.lock();
            let state = &mut *guard;

            state.metrics.record_recovery_failure();
            if let Some(meta) = state.metadata.get_mut(id) {
                meta.last_error = Some(ErrorSnapshot::capture(error));
            }
            if let Some(reference) = state
                .players
                .get_mut(id)
                .filter(|reference| reference.holds(handle))
            {
                reference.error_count += 1;
            }
            self.inner.persist(state);
        }

        self.inner.emit(RegistryEvent::RecoveryFailed(id.clone()));
    }
}
