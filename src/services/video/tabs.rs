//! Single-tab playback policy.
//!
//! Only the video tab plays. Leaving it pauses everything at once; entering
//! it resumes the players that intended to play, one frame later so the
//! navigation transition can settle.

use futures::future::join_all;
use tokio::time;
use tracing::{debug, instrument, warn};

use super::{
    PlaybackState, PlayerError, RegistryEvent,
    playable::{pause_if_supported, play_if_supported, set_muted_if_supported},
    registry::{CallTarget, VideoPlayerRegistry},
};

impl VideoPlayerRegistry {
    /// Pause and mute every live player, tolerating individual failures.
    ///
    /// Every registered id ends with `is_playing == false` in its metadata,
    /// whether or not its native pause succeeded. Returns the number of
    /// players whose pause or mute failed.
    #[instrument(skip(self))]
    pub async fn pause_all_videos(&self) -> usize {
        let targets = {
            let mut state = self.inner.lock();
            let ids: Vec<_> = state.players.keys().cloned().collect();
            for id in ids {
                state.metadata.entry(id).or_default().is_playing = false;
            }
            self.inner.persist(&state);
            drop(state);
            self.call_targets(|_, _| true)
        };

        let results = join_all(targets.iter().map(|target| async move {
            let result = async {
                pause_if_supported(target.handle.as_ref(), target.capabilities).await?;
                set_muted_if_supported(target.handle.as_ref(), target.capabilities, true).await
            }
            .await;
            (target, result)
        }))
        .await;

        let failures = self.settle(&results, PlaybackState::Paused);
        debug!(players = targets.len(), failures, "Paused all videos");
        failures
    }

    /// Resume the players that intended to play when entering `tab`.
    ///
    /// Does nothing unless `tab` is the video tab and the registry already
    /// considers the video tab active. A failed play triggers a recovery;
    /// only a failed recovery is logged.
    #[instrument(skip(self))]
    pub async fn resume_videos_for_tab(&self, tab: &str) {
        let video_tab = self.inner.config.video_tab.as_str();
        if tab != video_tab || self.current_tab() != video_tab {
            debug!("Not resuming: requested {}, active {}", tab, self.current_tab());
            return;
        }

        let targets = self.call_targets(|state, reference| {
            state
                .metadata
                .get(&reference.id)
                .is_some_and(|meta| meta.is_playing)
        });

        let results = join_all(targets.iter().map(|target| async move {
            let handle = target.handle.as_ref();
            if let Err(e) = set_muted_if_supported(handle, target.capabilities, false).await {
                debug!(error = %e, "Failed to unmute player {}", target.id);
            }

            let result = play_if_supported(handle, target.capabilities).await;
            if let Err(e) = &result {
                debug!(error = %e, "Play failed for player {}, recovering", target.id);
                if !self.recover_player(target.id.clone()).await {
                    warn!(error = %e, "Failed to resume player {}", target.id);
                }
            }
            (target, result)
        }))
        .await;

        self.settle(&results, PlaybackState::Playing);
    }

    /// Switch the active tab, applying the playback policy on transitions.
    ///
    /// The switch itself is a single compare-and-swap, so concurrent callers
    /// apply each transition once. Leaving the video tab then fires a pause of
    /// every player; entering it defers the resume by one frame.
    /// Neither is awaited by the caller. Must be called inside a Tokio
    /// runtime.
    #[instrument(skip(self, tab), fields(tab = tracing::field::Empty))]
    pub fn set_current_tab(&self, tab: impl Into<String>) {
        let tab = tab.into();
        tracing::Span::current().record("tab", tracing::field::display(&tab));

        let video_tab = self.inner.config.video_tab.clone();
        let previous = {
            let mut state = self.inner.lock();
            if state.current_tab == tab {
                return;
            }
            let previous = std::mem::replace(&mut state.current_tab, tab.clone());
            self.inner.persist(&state);
            self.inner.current_tab.set(tab.clone());
            previous
        };

        if previous == video_tab {
            let registry = self.clone();
            self.inner.supervisor.spawn("pause-all", async move {
                registry.pause_all_videos().await;
            });
        }

        if tab == video_tab {
            let registry = self.clone();
            let frame_delay = self.inner.config.frame_delay();
            let entered = tab.clone();
            self.inner.supervisor.spawn("resume-tab", async move {
                if frame_delay.is_zero() {
                    tokio::task::yield_now().await;
                } else {
                    time::sleep(frame_delay).await;
                }
                registry.resume_videos_for_tab(&entered).await;
            });
        }

        self.inner.emit(RegistryEvent::TabChanged { from: previous, to: tab });
    }

    /// Apply fan-out results to the references that are still live.
    ///
    /// A reference superseded or removed while the call was in flight is
    /// left alone. Returns the number of failures.
    fn settle(
        &self,
        results: &[(&CallTarget, Result<(), PlayerError>)],
        on_success: PlaybackState,
    ) -> usize {
        let mut guard = self.inner.lock();
        let state = &mut *guard;
        let mut failures = 0;

        for (target, result) in results {
            let live = state
                .players
                .get_mut(&target.id)
                .filter(|reference| reference.holds(&target.handle));

            match (result, live) {
                (Ok(()), Some(reference)) => {
                    reference.state = on_success;
                    reference.touch();
                }
                (Ok(()), None) => {}
                (Err(_), live) => {
                    failures += 1;
                    if let Some(reference) = live {
                        reference.error_count += 1;
                    }
                    state.metrics.record_general_error();
                }
            }
        }

        if failures > 0 {
            self.inner.persist(state);
        }

        failures
    }
}
