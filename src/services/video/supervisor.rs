use std::{
    collections::HashMap,
    future::Future,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

use tokio::{sync::Notify, task::AbortHandle};
use tracing::{debug, warn};

/// Runs detached work the initiator never awaits.
///
/// Tasks report their results through shared state (metrics, events), not
/// back to the caller. The supervisor only tracks what is in flight so that
/// shutdown can abort leftovers and tests can wait for quiescence.
#[derive(Clone, Default)]
pub struct TaskSupervisor {
    inner: Arc<SupervisorInner>,
}

#[derive(Default)]
struct SupervisorInner {
    tasks: Mutex<HashMap<u64, AbortHandle>>,
    next_id: AtomicU64,
    in_flight: AtomicUsize,
    finished: AtomicU64,
    panicked: AtomicU64,
    idle: Notify,
}

/// Counters describing the supervisor's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SupervisorStats {
    /// Tasks spawned so far
    pub spawned: u64,
    /// Tasks that ran to completion or were aborted
    pub finished: u64,
    /// Tasks that panicked
    pub panicked: u64,
    /// Tasks currently running
    pub in_flight: usize,
}

impl TaskSupervisor {
    /// Create an empty supervisor
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` on the current Tokio runtime without awaiting it.
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);

        let guard = InFlightGuard {
            inner: Arc::clone(&self.inner),
            id,
            label,
        };

        // Held across the spawn so the guard cannot unregister before insertion.
        let mut tasks = self
            .inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let handle = tokio::spawn(async move {
            let _guard = guard;
            task.await;
        });
        tasks.insert(id, handle.abort_handle());
        debug!(task = label, id, "Spawned detached task");
    }

    /// Number of tasks currently running.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Snapshot of the supervisor counters.
    pub fn stats(&self) -> SupervisorStats {
        SupervisorStats {
            spawned: self.inner.next_id.load(Ordering::Relaxed),
            finished: self.inner.finished.load(Ordering::Relaxed),
            panicked: self.inner.panicked.load(Ordering::Relaxed),
            in_flight: self.in_flight(),
        }
    }

    /// Wait until no detached task is running.
    ///
    /// Tasks spawned while waiting extend the wait.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.in_flight() == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Abort every running task. Native calls already issued keep running.
    pub fn abort_all(&self) {
        let handles: Vec<AbortHandle> = self
            .inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, handle)| handle)
            .collect();

        if !handles.is_empty() {
            debug!(count = handles.len(), "Aborting detached tasks");
        }

        for handle in handles {
            handle.abort();
        }
    }
}

struct InFlightGuard {
    inner: Arc<SupervisorInner>,
    id: u64,
    label: &'static str,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.inner.panicked.fetch_add(1, Ordering::Relaxed);
            warn!(task = self.label, id = self.id, "Detached task panicked");
        }

        self.inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
        self.inner.finished.fetch_add(1, Ordering::Relaxed);

        if self.inner.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}
