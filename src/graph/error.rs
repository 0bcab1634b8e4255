use thiserror::Error;

use crate::models::TaskId;

/// Structural errors raised when building an invalid graph.
///
/// These are always caller-local: the graph value the failed operation was
/// invoked on is unchanged, and nothing reaches persistent storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A node with this id is already present in the graph
    #[error("task {0} already exists in the graph")]
    DuplicateId(TaskId),

    /// The operation referenced an id with no node in the graph
    #[error("task {0} does not exist in the graph")]
    UnknownNode(TaskId),

    /// A task cannot depend on itself
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskId),
}
