//! The task dependency graph
//!
//! `TaskGraph` is a directed graph over immutable [`Task`] nodes where an
//! edge A→B means "A depends on B". Graphs are values: every builder
//! operation clones, applies the change, and hands back a new graph, so a
//! snapshot can be shared across concurrent readers without copy-on-read.

mod error;


use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Task, TaskId};

pub use error::GraphError;

/// Directed dependency graph over tasks.
///
/// Backed by ordered maps so that iteration order, structural equality, and
/// the serialized form are all canonical (ascending id) without an extra
/// normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskGraph {
    /// Map from task id to the task stored under it
    tasks: BTreeMap<TaskId, Task>,
    /// Adjacency sets: task id -> ids of the tasks it depends on.
    /// Every id in `tasks` has an entry here, possibly empty.
    depends_on: BTreeMap<TaskId, BTreeSet<TaskId>>,
}

impl TaskGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new graph that also contains `task`.
    ///
    /// Fails with [`GraphError::DuplicateId`] if a task with the same id is
    /// already present; the receiver is unchanged either way.
    pub fn with_task(&self, task: Task) -> Result<Self, GraphError> {
        if self.tasks.contains_key(&task.id) {
            return Err(GraphError::DuplicateId(task.id));
        }

        let mut next = self.clone();
        next.depends_on.insert(task.id, BTreeSet::new());
        next.tasks.insert(task.id, task);
        Ok(next)
    }

    /// Returns a new graph with a dependency edge `from` → `to`.
    ///
    /// Both endpoints must already be nodes of the graph, and a task cannot
    /// depend on itself. Cycles across multiple tasks are not rejected here;
    /// dependency-policy checks beyond referential integrity belong to the
    /// mutation layer.
    pub fn with_dependency(&self, from: TaskId, to: TaskId) -> Result<Self, GraphError> {
        if from == to {
            return Err(GraphError::SelfDependency(from));
        }
        if !self.tasks.contains_key(&from) {
            return Err(GraphError::UnknownNode(from));
        }
        if !self.tasks.contains_key(&to) {
            return Err(GraphError::UnknownNode(to));
        }

        let mut next = self.clone();
        next.depends_on
            .entry(from)
            .or_default()
            .insert(to);
        Ok(next)
    }

    /// Returns a new graph with the task stored under `task.id` replaced.
    ///
    /// This is how completion and relabeling land in a graph: build the new
    /// task value with the same id, then swap it in. Edges are untouched.
    /// Fails with [`GraphError::UnknownNode`] if the id is not present.
    pub fn with_task_replaced(&self, task: Task) -> Result<Self, GraphError> {
        if !self.tasks.contains_key(&task.id) {
            return Err(GraphError::UnknownNode(task.id));
        }

        let mut next = self.clone();
        next.tasks.insert(task.id, task);
        Ok(next)
    }

    /// All tasks, in ascending id order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Looks up a task by id
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// The tasks that `id` depends on, in ascending id order.
    ///
    /// An unknown id yields an empty iterator; the distinction between
    /// "unknown" and "no dependencies" is available through [`get`](Self::get).
    pub fn dependencies_of(&self, id: TaskId) -> impl Iterator<Item = &Task> {
        self.depends_on
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|dep| self.tasks.get(dep))
    }

    /// The tasks that depend on `id` (reverse edges), in ascending id order
    pub fn dependents_of(&self, id: TaskId) -> impl Iterator<Item = &Task> {
        self.depends_on
            .iter()
            .filter(move |(_, deps)| deps.contains(&id))
            .filter_map(|(dependent, _)| self.tasks.get(dependent))
    }

    /// Raw dependency ids for `id`, used by the codec
    pub(crate) fn dependency_ids(&self, id: TaskId) -> impl Iterator<Item = TaskId> + '_ {
        self.depends_on.get(&id).into_iter().flatten().copied()
    }

    /// Number of tasks in the graph
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the graph holds no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The next free monotonic id: one past the highest id in the graph,
    /// `#1` for an empty graph. `None` if the id space is exhausted (the
    /// highest possible id is already taken).
    pub fn next_id(&self) -> Option<TaskId> {
        match self.tasks.keys().next_back() {
            Some(id) => id.0.checked_add(1).map(TaskId),
            None => Some(TaskId(1)),
        }
    }
}
