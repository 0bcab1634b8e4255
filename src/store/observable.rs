//! Reactive layer over the blocking task store
//!
//! `ObservableTaskStore` is the contract every command handler relies on: a
//! live, multi-subscriber view of the current graph plus an atomic
//! "apply mutation" operation. One mutation session (read snapshot →
//! compute → persist → publish) runs at a time; subscribers see committed
//! snapshots in exactly commit order, starting from the latest snapshot at
//! the moment they subscribe.

use std::sync::Arc;

use anyhow::bail;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error};

use crate::graph::TaskGraph;
use crate::models::{Task, TaskId};

use super::{StoreError, TaskStore};

/// One delivery to a subscriber: a committed snapshot, or the store failure
/// that ended the stream.
pub type Update = Result<Arc<TaskGraph>, Arc<StoreError>>;

/// Why a mutation did not commit
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The mutation function rejected the change. Caller-local: nothing was
    /// persisted or published, and the store state is untouched.
    #[error(transparent)]
    Rejected(#[from] anyhow::Error),

    /// The backing store failed (I/O or corrupt data). Terminal: the
    /// failure has been broadcast to all subscribers and every further
    /// mutation on this store returns it again.
    #[error("task store has failed: {0}")]
    StoreFailed(Arc<StoreError>),
}

/// The result of a committed mutation
#[derive(Debug)]
pub struct Commit<T> {
    /// The snapshot the mutation function received
    pub before: Arc<TaskGraph>,
    /// The committed snapshot, as published to subscribers
    pub after: Arc<TaskGraph>,
    /// Whatever the mutation function derived alongside the new graph
    pub value: T,
}

/// Options for [`ObservableTaskStore::create_task`]
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    /// Start the task already completed
    pub completed: bool,
    /// Ids of existing tasks the new task depends on
    pub depends_on: Vec<TaskId>,
}

/// A live subscription to committed snapshots.
///
/// The first [`recv`](Subscription::recv) yields the snapshot that was
/// current when the subscription was created; each subsequent call yields
/// the next committed snapshot, none skipped. Delivery is buffered
/// per-subscriber and unbounded, so a slow subscriber delays nobody.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Update>,
}

impl Subscription {
    /// Waits for the next update. Returns `None` only once the store has
    /// been dropped, or after a store failure has been delivered.
    pub async fn recv(&mut self) -> Option<Update> {
        self.rx.recv().await
    }
}

enum State {
    /// No access yet; the first operation loads from the backing store
    Uninitialized,
    /// Steady state: the latest committed snapshot
    Ready(Arc<TaskGraph>),
    /// The backing store failed; no further mutations succeed
    Failed(Arc<StoreError>),
}

struct Inner {
    store: TaskStore,
    state: State,
    subscribers: Vec<mpsc::UnboundedSender<Update>>,
}

/// Multi-subscriber observable view and atomic-mutation API over a
/// [`TaskStore`].
///
/// Exclusively owns its store (and through it, the backing file). All state
/// sits behind one async mutex, which is what serializes concurrent
/// mutations: at most one is computed-and-persisted at a time, and
/// additional callers queue until the prior one has committed. Commits
/// perform blocking file I/O while holding the lock; payloads are one small
/// JSON document, so no `spawn_blocking` hop is taken.
pub struct ObservableTaskStore {
    inner: Mutex<Inner>,
}

impl ObservableTaskStore {
    pub fn new(store: TaskStore) -> Self {
        Self {
            inner: Mutex::new(Inner {
                store,
                state: State::Uninitialized,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Opens an observable store over a file on disk
    pub fn open(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(TaskStore::open(path))
    }

    /// Subscribes to committed snapshots.
    ///
    /// The current snapshot (loading it first if this is the initial access)
    /// is already queued on the returned subscription. If the store has
    /// failed, the failure is queued instead and the subscription ends
    /// after delivering it.
    pub async fn observe(&self) -> Subscription {
        let mut inner = self.inner.lock().await;
        let (tx, rx) = mpsc::unbounded_channel();

        match inner.ensure_ready() {
            Ok(snapshot) => {
                let _ = tx.send(Ok(snapshot));
                inner.subscribers.push(tx);
            }
            Err(err) => {
                // Failed stores publish nothing further; deliver the error
                // and let the subscription end.
                let _ = tx.send(Err(err));
            }
        }

        Subscription { rx }
    }

    /// The latest committed snapshot, loading it on first access.
    ///
    /// Equivalent to the first element of [`observe`](Self::observe), for
    /// handlers that only need a consistent read.
    pub async fn snapshot(&self) -> Result<Arc<TaskGraph>, Arc<StoreError>> {
        self.inner.lock().await.ensure_ready()
    }

    /// Applies one atomic mutation: snapshot → `mutate` → persist → publish.
    ///
    /// `mutate` must be a pure function of the snapshot it receives. If it
    /// returns an error, nothing is persisted or published and only this
    /// caller sees [`ApplyError::Rejected`]. If persisting fails, the store
    /// transitions to failed, broadcasts the failure to every subscriber,
    /// and rejects all further mutations.
    ///
    /// Concurrent callers are serialized; abandoning the returned future
    /// before it completes does not undo a commit that already started.
    pub async fn apply<T, F>(&self, mutate: F) -> Result<Commit<T>, ApplyError>
    where
        F: FnOnce(&TaskGraph) -> anyhow::Result<(TaskGraph, T)>,
    {
        let mut inner = self.inner.lock().await;
        let before = inner.ensure_ready().map_err(ApplyError::StoreFailed)?;

        let (next, value) = mutate(&before).map_err(ApplyError::Rejected)?;

        if let Err(err) = inner.store.save(&next) {
            error!(%err, "persisting mutation failed; task store is now failed");
            let err = Arc::new(err);
            inner.state = State::Failed(Arc::clone(&err));
            inner.publish(Err(Arc::clone(&err)));
            // A failed store publishes nothing further; dropping the senders
            // ends every subscription after the terminal error is delivered.
            inner.subscribers.clear();
            return Err(ApplyError::StoreFailed(err));
        }

        let after = Arc::new(next);
        inner.state = State::Ready(Arc::clone(&after));
        inner.publish(Ok(Arc::clone(&after)));
        debug!(tasks = after.len(), "committed mutation");

        Ok(Commit {
            before,
            after,
            value,
        })
    }

    /// Creates a task with a fresh monotonic id and applies it as a
    /// mutation. Blank labels are rejected; dependency ids in `options`
    /// must name existing tasks.
    pub async fn create_task(
        &self,
        label: impl Into<String>,
        options: NewTask,
    ) -> Result<Commit<Task>, ApplyError> {
        let label = label.into();
        self.apply(move |graph| {
            if label.trim().is_empty() {
                bail!("task label cannot be empty");
            }
            let Some(id) = graph.next_id() else {
                bail!("task id space is exhausted");
            };

            let task = Task {
                id,
                label,
                completed: options.completed,
            };
            let mut next = graph.with_task(task.clone())?;
            for dep in &options.depends_on {
                next = next.with_dependency(task.id, *dep)?;
            }
            Ok((next, task))
        })
        .await
    }
}

impl Inner {
    /// Loads the initial snapshot on first access; afterwards returns the
    /// held snapshot or the terminal failure.
    fn ensure_ready(&mut self) -> Result<Arc<TaskGraph>, Arc<StoreError>> {
        if let State::Uninitialized = self.state {
            match self.store.load() {
                Ok(graph) => self.state = State::Ready(Arc::new(graph)),
                Err(err) => {
                    error!(%err, "initial load failed; task store is now failed");
                    self.state = State::Failed(Arc::new(err));
                }
            }
        }

        match &self.state {
            State::Ready(snapshot) => Ok(Arc::clone(snapshot)),
            State::Failed(err) => Err(Arc::clone(err)),
            State::Uninitialized => unreachable!("state initialized above"),
        }
    }

    /// Delivers an update to every live subscriber, dropping the ones that
    /// have gone away. Sends happen under the store lock, so every
    /// subscriber queue sees updates in commit order.
    fn publish(&mut self, update: Update) {
        self.subscribers
            .retain(|tx| tx.send(update.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryHandle;

    fn memory_store() -> (ObservableTaskStore, MemoryHandle) {
        let handle = MemoryHandle::new();
        let store = ObservableTaskStore::new(TaskStore::new(handle.clone()));
        (store, handle)
    }

    #[tokio::test]
    async fn test_first_access_bootstraps_empty() {
        let (store, _handle) = memory_store();

        let snapshot = store.snapshot().await.expect("Should load");
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_create_task_assigns_fresh_ids() {
        let (store, _handle) = memory_store();

        let first = store
            .create_task("buy milk", NewTask::default())
            .await
            .expect("Should create");
        let second = store
            .create_task("drink milk", NewTask::default())
            .await
            .expect("Should create");

        assert_eq!(first.value.id, TaskId(1));
        assert_eq!(second.value.id, TaskId(2));
        assert!(first.before.is_empty());
        assert_eq!(second.after.len(), 2);
    }

    #[tokio::test]
    async fn test_create_task_rejects_blank_label() {
        let (store, handle) = memory_store();

        let err = store
            .create_task("   ", NewTask::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplyError::Rejected(_)));

        // Nothing was persisted and the snapshot is untouched
        assert!(handle.contents().is_empty());
        assert!(store.snapshot().await.expect("Should load").is_empty());
    }

    #[tokio::test]
    async fn test_create_task_with_dependencies() {
        let (store, _handle) = memory_store();

        let paper = store
            .create_task("write paper", NewTask::default())
            .await
            .expect("Should create");
        let submit = store
            .create_task(
                "submit paper",
                NewTask {
                    depends_on: vec![paper.value.id],
                    ..NewTask::default()
                },
            )
            .await
            .expect("Should create");

        let deps: Vec<_> = submit
            .after
            .dependencies_of(submit.value.id)
            .map(|t| t.id)
            .collect();
        assert_eq!(deps, vec![paper.value.id]);
    }

    #[tokio::test]
    async fn test_rejected_mutation_leaves_state_untouched() {
        let (store, handle) = memory_store();
        store
            .create_task("keep me", NewTask::default())
            .await
            .expect("Should create");
        let persisted = handle.contents();

        let err = store
            .apply::<(), _>(|_graph| bail!("validation failed"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplyError::Rejected(_)));

        assert_eq!(handle.contents(), persisted);
        assert_eq!(store.snapshot().await.expect("Should load").len(), 1);
    }

    #[tokio::test]
    async fn test_create_task_rejects_exhausted_id_space() {
        let handle = MemoryHandle::new();
        let seeded = TaskGraph::new()
            .with_task(Task::new(TaskId(u64::MAX), "the last task"))
            .unwrap();
        TaskStore::new(handle.clone())
            .save(&seeded)
            .expect("Should save");

        let store = ObservableTaskStore::new(TaskStore::new(handle));
        let err = store
            .create_task("one too many", NewTask::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplyError::Rejected(_)));

        // Caller-local rejection: the snapshot is untouched
        let snapshot = store.snapshot().await.expect("Should load");
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn test_observe_replays_latest_then_streams() {
        let (store, _handle) = memory_store();
        store
            .create_task("first", NewTask::default())
            .await
            .expect("Should create");
        store
            .create_task("second", NewTask::default())
            .await
            .expect("Should create");

        // Late subscriber gets the latest snapshot, not the history
        let mut sub = store.observe().await;
        let replay = sub.recv().await.expect("Should receive").expect("Should be ok");
        assert_eq!(replay.len(), 2);

        store
            .create_task("third", NewTask::default())
            .await
            .expect("Should create");
        let next = sub.recv().await.expect("Should receive").expect("Should be ok");
        assert_eq!(next.len(), 3);
    }
}
