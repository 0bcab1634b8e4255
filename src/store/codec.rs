//! Serialization codec for the task graph
//!
//! The persisted form is a single JSON document listing every task with its
//! dependency ids:
//!
//! ```json
//! {
//!   "tasks": [
//!     { "id": 1, "label": "write paper", "completed": false, "depends_on": [] },
//!     { "id": 2, "label": "submit paper", "completed": false, "depends_on": [1] }
//!   ]
//! }
//! ```
//!
//! Encoding is deterministic (ascending id order, straight from the graph's
//! ordered maps). Decoding rebuilds the graph through its own validating
//! constructors, so duplicate ids, self-loops, and references to ids absent
//! from the payload all surface as [`StoreError::Corrupt`].

use serde::{Deserialize, Serialize};

use crate::graph::TaskGraph;
use crate::models::{Task, TaskId};

use super::StoreError;

#[derive(Serialize, Deserialize)]
struct GraphDoc {
    tasks: Vec<TaskRecord>,
}

#[derive(Serialize, Deserialize)]
struct TaskRecord {
    id: TaskId,
    label: String,
    completed: bool,
    depends_on: Vec<TaskId>,
}

/// Encodes a graph into its persisted byte form
pub fn encode(graph: &TaskGraph) -> Result<Vec<u8>, StoreError> {
    let doc = GraphDoc {
        tasks: graph
            .tasks()
            .map(|task| TaskRecord {
                id: task.id,
                label: task.label.clone(),
                completed: task.completed,
                depends_on: graph.dependency_ids(task.id).collect(),
            })
            .collect(),
    };

    let mut bytes = serde_json::to_vec_pretty(&doc)
        .map_err(|err| StoreError::Corrupt(format!("failed to serialize task graph: {err}")))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decodes persisted bytes back into a graph.
///
/// Zero bytes (or pure whitespace) is the bootstrap case for a store that
/// has never been written: it decodes to the empty graph.
pub fn decode(bytes: &[u8]) -> Result<TaskGraph, StoreError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(TaskGraph::new());
    }

    let doc: GraphDoc = serde_json::from_slice(bytes)
        .map_err(|err| StoreError::Corrupt(format!("malformed task file: {err}")))?;

    // Nodes first, then edges, so dependency order within the file does not
    // matter but every referenced id must exist in the payload.
    let mut graph = TaskGraph::new();
    for record in &doc.tasks {
        let mut task = Task::new(record.id, record.label.clone());
        task.completed = record.completed;
        graph = graph
            .with_task(task)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
    }
    for record in &doc.tasks {
        for dep in &record.depends_on {
            graph = graph
                .with_dependency(record.id, *dep)
                .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        }
    }

    Ok(graph)
}
