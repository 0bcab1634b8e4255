use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a task.
///
/// Ids are issued monotonically by the store (`TaskGraph::next_id`) but may
/// also be supplied externally, e.g. when decoding a persisted graph. Two
/// tasks with the same id are the same logical task even if their label or
/// completion flag differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for TaskId {
    fn from(raw: u64) -> Self {
        TaskId(raw)
    }
}

/// A single task: a labeled unit of work with a completion flag.
///
/// Tasks are immutable values. "Changing" a task means producing a new value
/// with the same id via [`Task::mark_completed`] or [`Task::relabeled`] and
/// swapping it into a graph with `TaskGraph::with_task_replaced`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub label: String,
    pub completed: bool,
}

impl Task {
    /// Creates a new, not-yet-completed task
    pub fn new(id: TaskId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            completed: false,
        }
    }

    /// Returns a copy of this task marked completed
    pub fn mark_completed(&self) -> Self {
        Self {
            completed: true,
            ..self.clone()
        }
    }

    /// Returns a copy of this task with a new label
    pub fn relabeled(&self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_completed_preserves_id_and_label() {
        let task = Task::new(TaskId(7), "water the plants");
        let done = task.mark_completed();

        assert_eq!(done.id, TaskId(7));
        assert_eq!(done.label, "water the plants");
        assert!(done.completed);
        assert!(!task.completed);
    }

    #[test]
    fn test_relabeled_preserves_id_and_flag() {
        let task = Task::new(TaskId(3), "draft").mark_completed();
        let reworded = task.relabeled("final draft");

        assert_eq!(reworded.id, TaskId(3));
        assert_eq!(reworded.label, "final draft");
        assert!(reworded.completed);
    }

    #[test]
    fn test_task_id_display() {
        assert_eq!(TaskId(42).to_string(), "#42");
    }
}
