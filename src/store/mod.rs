//! Persistence for the task graph
//!
//! This module handles:
//! - Byte-level access to the backing store (`handle`)
//! - Encoding/decoding the graph (`codec`)
//! - Blocking load/save of whole graphs (`TaskStore`)
//! - The reactive publish/mutate/observe layer (`observable`)

pub mod codec;
pub mod handle;
pub mod observable;

use std::io::Read;

use thiserror::Error;
use tracing::debug;

use crate::graph::TaskGraph;

pub use handle::{FsHandle, MemoryHandle, StorageHandle, WriteHandle};
pub use observable::{ApplyError, Commit, NewTask, ObservableTaskStore, Subscription};

/// Systemic store failures: the persisted bytes cannot be trusted or the
/// backing store cannot be reached. Unlike `GraphError`, these indicate the
/// store can no longer guarantee consistency.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persisted bytes do not describe a valid task graph
    #[error("stored task data is corrupt: {0}")]
    Corrupt(String),

    /// Reading or writing the backing store failed
    #[error("task store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Blocking load/save of a complete task graph through a [`StorageHandle`].
///
/// Exclusively owns its handle. Both operations are synchronous and work on
/// whole graphs: `save` fully overwrites the previous contents, never
/// appends or merges.
pub struct TaskStore {
    handle: Box<dyn StorageHandle>,
}

impl TaskStore {
    pub fn new(handle: impl StorageHandle + 'static) -> Self {
        Self {
            handle: Box::new(handle),
        }
    }

    /// Opens a store over a file on disk
    pub fn open(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(FsHandle::new(path))
    }

    /// Reads and decodes the current graph.
    ///
    /// A backing store that has never been written (missing or zero-byte
    /// file) loads as the empty graph.
    pub fn load(&self) -> Result<TaskGraph, StoreError> {
        let mut reader = self.handle.open_read()?;
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let graph = codec::decode(&bytes)?;
        debug!(tasks = graph.len(), "loaded task graph");
        Ok(graph)
    }

    /// Encodes and writes `graph`, replacing any previous contents.
    ///
    /// The write is committed atomically through the handle: a failure at
    /// any point leaves the previous contents readable.
    pub fn save(&self, graph: &TaskGraph) -> Result<(), StoreError> {
        let bytes = codec::encode(graph)?;

        let mut writer = self.handle.open_write()?;
        writer.write_all(&bytes)?;
        writer.commit()?;

        debug!(tasks = graph.len(), bytes = bytes.len(), "saved task graph");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Task, TaskId};
    use tempfile::TempDir;

    #[test]
    fn test_load_from_absent_file_is_empty() {
        let dir = TempDir::new().expect("Should create temp dir");
        let store = TaskStore::open(dir.path().join("tasks.json"));

        let graph = store.load().expect("Should load");
        assert!(graph.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().expect("Should create temp dir");
        let path = dir.path().join("tasks.json");

        let graph = TaskGraph::new()
            .with_task(Task::new(TaskId(1), "buy milk"))
            .unwrap();

        TaskStore::open(&path).save(&graph).expect("Should save");

        // A fresh store instance over the same file sees the same graph
        let reloaded = TaskStore::open(&path).load().expect("Should load");
        assert_eq!(reloaded, graph);
    }

    #[test]
    fn test_save_overwrites_in_full() {
        let handle = MemoryHandle::new();
        let store = TaskStore::new(handle.clone());

        let big = TaskGraph::new()
            .with_task(Task::new(TaskId(1), "a"))
            .unwrap()
            .with_task(Task::new(TaskId(2), "b"))
            .unwrap();
        store.save(&big).expect("Should save");

        let small = TaskGraph::new()
            .with_task(Task::new(TaskId(3), "c"))
            .unwrap();
        store.save(&small).expect("Should save");

        let reloaded = TaskStore::new(handle).load().expect("Should load");
        assert_eq!(reloaded, small);
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let handle = MemoryHandle::new();
        {
            use std::io::Write;
            let mut writer = handle.open_write().expect("Should open writer");
            writer.write_all(b"not json at all").expect("Should write");
            writer.commit().expect("Should commit");
        }

        let store = TaskStore::new(handle);
        assert!(matches!(store.load().unwrap_err(), StoreError::Corrupt(_)));
    }
}
