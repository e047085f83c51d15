use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle, time};
use tracing::{debug, error, instrument};

use super::{PersistedSnapshot, StateStore};

/// Debounced writer of registry snapshots.
///
/// Mutations publish the latest snapshot; a background task saves it once
/// the stream of changes has been quiet for the debounce window. Only the
/// newest snapshot of a burst is written. Saves run on the blocking pool and
/// never overlap.
pub struct SnapshotWriter {
    store: Arc<dyn StateStore>,
    saving: Arc<Mutex<()>>,
    tx: watch::Sender<Option<PersistedSnapshot>>,
    debounce: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SnapshotWriter {
    /// Writer saving into `store` after `debounce` of quiet
    pub fn new(store: Arc<dyn StateStore>, debounce: Duration) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            store,
            saving: Arc::new(Mutex::new(())),
            tx,
            debounce,
            task: Mutex::new(None),
        }
    }

    /// Backing store
    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Record `snapshot` as the newest state to persist.
    pub fn publish(&self, snapshot: PersistedSnapshot) {
        self.tx.send_replace(Some(snapshot));
    }

    /// Spawn the background flush loop. Idempotent.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.is_some() {
            return;
        }

        let mut rx = self.tx.subscribe();
        let store = Arc::clone(&self.store);
        let saving = Arc::clone(&self.saving);
        let debounce = self.debounce;

        *task = Some(tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                time::sleep(debounce).await;
                let latest = rx.borrow_and_update().clone();
                let Some(snapshot) = latest else {
                    continue;
                };
                let store = Arc::clone(&store);
                let saving = Arc::clone(&saving);
                let saved = tokio::task::spawn_blocking(move || {
                    save(store.as_ref(), &saving, &snapshot);
                })
                .await;
                if let Err(e) = saved {
                    error!(error = %e, "Snapshot save task failed");
                }
            }
            debug!("Snapshot writer stopped");
        }));
    }

    /// Stop the flush loop and synchronously save the newest snapshot.
    ///
    /// A save already running on the blocking pool finishes first.
    pub fn flush_and_stop(&self) {
        if let Some(task) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }

        let latest = self.tx.borrow().clone();
        if let Some(snapshot) = latest {
            save(self.store.as_ref(), &self.saving, &snapshot);
        }
    }
}

#[instrument(skip_all)]
fn save(store: &dyn StateStore, saving: &Mutex<()>, snapshot: &PersistedSnapshot) {
    let _saving = saving.lock().unwrap_or_else(PoisonError::into_inner);
    let result = snapshot.encode().and_then(|encoded| store.save(&encoded));
    match result {
        Ok(()) => debug!(location = %store.location(), "Persisted player state"),
        Err(e) => error!(error = %e, "Failed to persist player state"),
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        if let Some(task) = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}
