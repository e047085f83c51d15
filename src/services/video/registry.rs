use std::{
    borrow::Borrow,
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use futures::{Stream, future::join_all};
use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::{debug, info, instrument, warn};

use super::{
    Capabilities, ErrorMetrics, PlaybackSnapshot, PlaybackState, Playable, PlayerId,
    PlayerMetadata, PlayerStatePatch, RegistryEvent,
    disposal::{
        DisposalConfig, DisposalStrategy, dispose_video_player, schedule_video_player_disposal,
    },
    persistence::{PersistedSnapshot, SnapshotWriter, StateStore},
    supervisor::TaskSupervisor,
};
use crate::{config::RegistryConfig, services::common::Property};

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

/// Live record binding an id to its native handle.
pub struct PlayerReference {
    /// Slot id
    pub id: PlayerId,

    /// Native handle; the registry owns its lifecycle, not its internals
    pub handle: Arc<dyn Playable>,

    /// Mirrored playback state
    pub state: PlaybackState,

    /// Operations the handle supports
    pub capabilities: Capabilities,

    /// Cached playback fields from event callbacks
    pub snapshot: PlaybackSnapshot,

    /// Last state-changing call; drives staleness
    pub last_activity: Instant,

    /// Disposal attempts made on this handle
    pub disposal_attempts: u32,

    /// Failed native calls on this handle
    pub error_count: u32,
}

impl PlayerReference {
    fn new(
        id: PlayerId,
        handle: Arc<dyn Playable>,
        capabilities: Capabilities,
        is_playing: bool,
    ) -> Self {
        Self {
            id,
            handle,
            state: PlaybackState::Idle,
            capabilities,
            snapshot: PlaybackSnapshot {
                is_playing: Some(is_playing),
                ..PlaybackSnapshot::default()
            },
            last_activity: Instant::now(),
            disposal_attempts: 0,
            error_count: 0,
        }
    }

    pub(super) fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Whether this reference still wraps `handle`.
    pub(super) fn holds(&self, handle: &Arc<dyn Playable>) -> bool {
        same_handle(&self.handle, handle)
    }
}

fn same_handle(a: &Arc<dyn Playable>, b: &Arc<dyn Playable>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Target of a fan-out native call, collected under the lock.
#[derive(Clone)]
pub(super) struct CallTarget {
    pub id: PlayerId,
    pub handle: Arc<dyn Playable>,
    pub capabilities: Capabilities,
}

impl CallTarget {
    fn of(reference: &PlayerReference) -> Self {
        Self {
            id: reference.id.clone(),
            handle: Arc::clone(&reference.handle),
            capabilities: reference.capabilities,
        }
    }
}

/// Bookkeeping guarded by the registry lock.
///
/// The lock is never held across an `.await`: every operation updates this
/// state first and only then calls into native handles.
#[derive(Default)]
pub(super) struct RegistryState {
    pub players: HashMap<PlayerId, PlayerReference>,
    pub metadata: HashMap<PlayerId, PlayerMetadata>,
    pub metrics: ErrorMetrics,
    pub current_tab: String,
    pub reaper_started: bool,
    /// Handles detached from `players` whose disposal has not settled yet
    pub pending_disposals: HashMap<u64, CallTarget>,
    next_disposal: u64,
}

impl RegistryState {
    /// Keep `target` reachable until [`RegistryInner::settle_disposal`] is
    /// called with the returned token.
    fn track_disposal(&mut self, target: CallTarget) -> u64 {
        self.next_disposal += 1;
        self.pending_disposals.insert(self.next_disposal, target);
        self.next_disposal
    }

    fn to_snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot {
            players_meta: self
                .metadata
                .iter()
                .map(|(id, meta)| (id.clone(), meta.clone()))
                .collect(),
            error_metrics: self.metrics,
            ..PersistedSnapshot::empty(self.current_tab.clone())
        }
    }
}

pub(super) struct RegistryInner {
    pub config: RegistryConfig,
    pub state: Mutex<RegistryState>,
    pub current_tab: Property<String>,
    pub supervisor: TaskSupervisor,
    pub writer: SnapshotWriter,
    pub events_tx: broadcast::Sender<RegistryEvent>,
    pub reaper: Mutex<Option<JoinHandle<()>>>,
}

impl RegistryInner {
    pub fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish the durable subset of `state` to the snapshot writer.
    pub fn persist(&self, state: &RegistryState) {
        self.writer.publish(state.to_snapshot());
    }

    pub fn emit(&self, event: RegistryEvent) {
        let _ = self.events_tx.send(event);
    }

    pub fn settle_disposal(&self, token: u64) {
        self.lock().pending_disposals.remove(&token);
    }

    pub fn record_disposal_error(&self, id: &PlayerId) {
        let mut state = self.lock();
        state.metrics.record_disposal_error();
        self.persist(&state);
        drop(state);

        self.emit(RegistryEvent::DisposalFailed(id.clone()));
    }
}

impl Drop for RegistryInner {
    fn drop(&mut self) {
        if let Some(handle) = self
            .reaper
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

/// Process-wide manager of every live video player in the feed.
///
/// Construct one instance at process start, call [`init`](Self::init) to
/// seed it from persisted state and [`teardown`](Self::teardown) at
/// shutdown. Clones share the same registry.
///
/// No operation returns an error: native failures are counted in
/// [`ErrorMetrics`], recorded in [`PlayerMetadata`] and logged.
#[derive(Clone)]
pub struct VideoPlayerRegistry {
    pub(super) inner: Arc<RegistryInner>,
}

impl VideoPlayerRegistry {
    /// Create a registry persisting into `store`.
    ///
    /// Nothing is loaded until [`init`](Self::init) is called.
    pub fn new(config: RegistryConfig, store: Arc<dyn StateStore>, debounce: Duration) -> Self {
        let (events_tx, _) = broadcast::channel(256);
        let video_tab = config.video_tab.clone();

        let inner = RegistryInner {
            state: Mutex::new(RegistryState {
                current_tab: video_tab.clone(),
                ..RegistryState::default()
            }),
            current_tab: Property::new(video_tab),
            supervisor: TaskSupervisor::new(),
            writer: SnapshotWriter::new(store, debounce),
            events_tx,
            reaper: Mutex::new(None),
            config,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    pub(super) fn from_inner(inner: Arc<RegistryInner>) -> Self {
        Self { inner }
    }

    pub(super) fn downgrade(&self) -> Weak<RegistryInner> {
        Arc::downgrade(&self.inner)
    }

    /// Seed metadata, metrics and the current tab from the persisted
    /// snapshot, then start the debounced writer.
    ///
    /// An unreadable or invalid snapshot is logged and ignored; the registry
    /// starts fresh. Must be called inside a Tokio runtime.
    #[instrument(skip(self))]
    pub fn init(&self) {
        let store = Arc::clone(self.inner.writer.store());

        match PersistedSnapshot::load(store.as_ref()) {
            Ok(Some(snapshot)) => {
                let mut state = self.inner.lock();
                state.metadata = snapshot.players_meta.into_iter().collect();
                state.metrics = snapshot.error_metrics;
                if !snapshot.current_tab.is_empty() {
                    state.current_tab = snapshot.current_tab;
                }
                self.inner.current_tab.set(state.current_tab.clone());

                info!(
                    players = state.metadata.len(),
                    tab = %state.current_tab,
                    "Restored persisted player state"
                );
            }
            Ok(None) => info!("Starting with empty player state"),
            Err(e) => warn!(error = %e, location = %store.location(), "Ignoring persisted player state"),
        }

        self.inner.writer.start();
    }

    /// Install `handle` under `id`.
    ///
    /// Any live handle already registered under `id` is detached at once and
    /// disposed in the background, so the caller never waits for it. The new
    /// reference starts `Idle` and inherits the persisted playing intent.
    /// The first registration starts the stale reaper.
    ///
    /// Must be called inside a Tokio runtime.
    #[instrument(skip(self, id, handle, capabilities), fields(player = tracing::field::Empty))]
    pub fn register(
        &self,
        id: impl Into<PlayerId>,
        handle: Arc<dyn Playable>,
        capabilities: Option<Capabilities>,
    ) {
        let id = id.into();
        tracing::Span::current().record("player", tracing::field::display(&id));
        let capabilities = capabilities.unwrap_or_else(|| handle.capabilities());

        let (superseded, start_reaper) = {
            let mut state = self.inner.lock();
            let superseded = match state.players.remove(&id) {
                Some(old) if old.holds(&handle) => {
                    debug!("Player {} re-registered with the same handle", id);
                    None
                }
                Some(old) => {
                    let target = CallTarget::of(&old);
                    Some((state.track_disposal(target.clone()), target))
                }
                None => None,
            };
            let is_playing = state.metadata.entry(id.clone()).or_default().is_playing;
            state.players.insert(
                id.clone(),
                PlayerReference::new(id.clone(), Arc::clone(&handle), capabilities, is_playing),
            );
            let start_reaper = !std::mem::replace(&mut state.reaper_started, true);
            self.inner.persist(&state);
            (superseded, start_reaper)
        };

        if let Some((token, old)) = superseded {
            debug!("Player {} superseded, disposing previous handle", id);
            self.dispose_superseded(token, old);
            self.inner.emit(RegistryEvent::Superseded(id.clone()));
        }

        self.inner.emit(RegistryEvent::Registered(id));

        if start_reaper {
            self.start_reaper();
        }
    }

    fn dispose_superseded(&self, token: u64, old: CallTarget) {
        let presets = &self.inner.config.disposal;
        let config = DisposalConfig::from_preset(DisposalStrategy::Scheduled, &presets.superseded);
        let weak = self.downgrade();

        schedule_video_player_disposal(
            &self.inner.supervisor,
            old.id,
            old.handle,
            old.capabilities,
            self.inner.config.superseded_delay(),
            config,
            move |id, outcome| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                inner.settle_disposal(token);
                if !outcome.success {
                    inner.record_disposal_error(id);
                }
            },
        );
    }

    /// Remove `id` and dispose its handle. Never fails.
    ///
    /// Bookkeeping is removed before any native call, so no caller can see
    /// a removed-but-live or present-but-disposed entry. When graceful
    /// disposal fails, a forced disposal runs in the background and the
    /// failure is counted regardless of its outcome. Until disposal settles
    /// the handle stays reachable by [`teardown`](Self::teardown).
    #[instrument(skip(self, id), fields(player = tracing::field::Empty))]
    pub async fn unregister(&self, id: impl Into<PlayerId>) {
        let id = id.into();
        tracing::Span::current().record("player", tracing::field::display(&id));

        let removed = {
            let mut state = self.inner.lock();
            let removed = match state.players.remove(&id) {
                Some(reference) => {
                    let token = state.track_disposal(CallTarget::of(&reference));
                    Some((token, reference))
                }
                None => None,
            };
            state.metadata.remove(&id);
            self.inner.persist(&state);
            removed
        };

        let Some((token, mut reference)) = removed else {
            debug!("Unregister for unknown player {}", id);
            return;
        };

        self.inner.emit(RegistryEvent::Unregistered(id.clone()));

        let presets = &self.inner.config.disposal;
        let graceful = DisposalConfig::from_preset(DisposalStrategy::Graceful, &presets.unregister);
        let outcome = dispose_video_player(
            &id,
            reference.handle.as_ref(),
            reference.capabilities,
            graceful,
        )
        .await;
        reference.disposal_attempts += outcome.attempts;

        if outcome.success {
            reference.state = PlaybackState::Disposed;
            self.inner.settle_disposal(token);
            return;
        }

        self.inner.record_disposal_error(&id);

        let forced = DisposalConfig::from_preset(DisposalStrategy::Forced, &presets.teardown);
        let weak = self.downgrade();
        schedule_video_player_disposal(
            &self.inner.supervisor,
            id,
            reference.handle,
            reference.capabilities,
            Duration::ZERO,
            forced,
            move |id, outcome| {
                if let Some(inner) = weak.upgrade() {
                    inner.settle_disposal(token);
                }
                if !outcome.success {
                    warn!("Forced disposal of player {} failed, handle may leak", id);
                }
            },
        );
    }

    /// Merge a playback update into the cached snapshot of `id`.
    ///
    /// The mirrored state flips to `Playing` only when both position and
    /// duration are known and positive. The persisted playing intent follows
    /// the explicit flag when present, even if `id` is no longer mounted.
    #[instrument(skip(self, id, patch), fields(player = tracing::field::Empty))]
    pub fn update_player_state(&self, id: impl Into<PlayerId>, patch: PlayerStatePatch) {
        let id = id.into();
        tracing::Span::current().record("player", tracing::field::display(&id));

        let mut state = self.inner.lock();

        match state.players.get_mut(&id) {
            Some(reference) => {
                reference.snapshot.merge(&patch);
                reference.touch();
                if reference.snapshot.shows_progress() {
                    reference.state = PlaybackState::Playing;
                }
            }
            None => debug!("State update for unmounted player {}", id),
        }

        if let Some(is_playing) = patch.is_playing {
            state.metadata.entry(id).or_default().is_playing = is_playing;
        }

        self.inner.persist(&state);
    }

    /// Force-dispose every remaining reference, stop the reaper and the
    /// snapshot writer, and flush the final snapshot.
    ///
    /// Detached work gets one teardown timeout to finish. Whatever is still
    /// running is then aborted, and handles whose disposal had not settled
    /// are force-disposed together with the live references.
    ///
    /// Metadata and metrics survive; only live references are dropped.
    #[instrument(skip(self))]
    pub async fn teardown(&self) {
        self.stop_reaper();

        let forced = DisposalConfig::from_preset(
            DisposalStrategy::Forced,
            &self.inner.config.disposal.teardown,
        );
        let supervisor = &self.inner.supervisor;
        if time::timeout(forced.timeout, supervisor.wait_idle()).await.is_err() {
            debug!(in_flight = supervisor.in_flight(), "Aborting detached work at shutdown");
        }
        supervisor.abort_all();

        let (drained, abandoned) = {
            let mut state = self.inner.lock();
            state.reaper_started = false;
            let drained: Vec<CallTarget> = state
                .players
                .drain()
                .map(|(_, reference)| CallTarget::of(&reference))
                .collect();
            let abandoned: Vec<CallTarget> = state
                .pending_disposals
                .drain()
                .map(|(_, target)| target)
                .collect();
            self.inner.persist(&state);
            (drained, abandoned)
        };

        info!(
            players = drained.len(),
            abandoned = abandoned.len(),
            "Tearing down video player registry"
        );

        let outcomes = join_all(drained.iter().chain(&abandoned).map(|target| {
            dispose_video_player(&target.id, target.handle.as_ref(), target.capabilities, forced)
        }))
        .await;

        let failed = outcomes.iter().filter(|outcome| !outcome.success).count();
        if failed > 0 {
            warn!(failed, "Some players could not be disposed at shutdown");
            let mut state = self.inner.lock();
            for _ in 0..failed {
                state.metrics.record_disposal_error();
            }
            self.inner.persist(&state);
        }

        self.inner.writer.flush_and_stop();
    }

    /// Reset every metadata record, including recovery caps, and all metrics.
    ///
    /// Live references are kept.
    #[instrument(skip(self))]
    pub fn clear_persisted_state(&self) {
        let mut state = self.inner.lock();
        state.metadata.clear();
        state.metrics = ErrorMetrics::default();
        self.inner.persist(&state);
        info!("Cleared persisted player state");
    }

    /// Number of live references.
    pub fn player_count(&self) -> usize {
        self.inner.lock().players.len()
    }

    /// Whether `id` currently has a live reference.
    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().players.contains_key(id)
    }

    /// Ids of all live references, sorted.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.inner.lock().players.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Mirrored playback state of `id`.
    pub fn player_state(&self, id: &str) -> Option<PlaybackState> {
        self.inner.lock().players.get(id).map(|reference| reference.state)
    }

    /// Cached playback fields of `id`.
    pub fn playback_snapshot(&self, id: &str) -> Option<PlaybackSnapshot> {
        self.inner.lock().players.get(id).map(|reference| reference.snapshot)
    }

    /// The only handle reachable under `id`.
    pub fn handle(&self, id: &str) -> Option<Arc<dyn Playable>> {
        self.inner
            .lock()
            .players
            .get(id)
            .map(|reference| Arc::clone(&reference.handle))
    }

    /// Failed native calls recorded against the live reference of `id`.
    pub fn error_count(&self, id: &str) -> Option<u32> {
        self.inner.lock().players.get(id).map(|reference| reference.error_count)
    }

    /// Durable metadata of `id`.
    pub fn metadata(&self, id: &str) -> Option<PlayerMetadata> {
        self.inner.lock().metadata.get(id).cloned()
    }

    /// Current failure counters.
    pub fn error_metrics(&self) -> ErrorMetrics {
        self.inner.lock().metrics
    }

    /// Currently active navigation tab.
    pub fn current_tab(&self) -> String {
        self.inner.lock().current_tab.clone()
    }

    /// Stream of the active tab, starting with the current one.
    pub fn current_tab_monitored(&self) -> impl Stream<Item = String> + Send + use<> {
        self.inner.current_tab.watch()
    }

    /// Durable subset of the registry state.
    pub fn snapshot(&self) -> PersistedSnapshot {
        self.inner.lock().to_snapshot()
    }

    /// Subscribe to lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<RegistryEvent> {
        self.inner.events_tx.subscribe()
    }

    /// Supervisor running this registry's detached work.
    pub fn supervisor(&self) -> &TaskSupervisor {
        &self.inner.supervisor
    }

    /// Registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    pub(super) fn call_targets<F>(&self, mut select: F) -> Vec<CallTarget>
    where
        F: FnMut(&RegistryState, &PlayerReference) -> bool,
    {
        let guard = self.inner.lock();
        let state = &*guard;
        state
            .players
            .values()
            .filter(|reference| select(state, reference))
            .map(CallTarget::of)
            .collect()
    }
}
