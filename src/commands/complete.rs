//! `braid done <id>`

use anyhow::{bail, Result};
use colored::Colorize;

use crate::graph::GraphError;
use crate::models::TaskId;
use crate::store::ObservableTaskStore;

/// Mark a task completed
pub async fn execute(store: &ObservableTaskStore, id: u64) -> Result<()> {
    let id = TaskId(id);

    let commit = store
        .apply(move |graph| {
            let task = graph.get(id).ok_or(GraphError::UnknownNode(id))?;
            if task.completed {
                bail!("task {id} is already completed");
            }
            let done = task.mark_completed();
            let next = graph.with_task_replaced(done.clone())?;
            Ok((next, done))
        })
        .await?;

    println!(
        "{} Completed {} '{}'",
        "✓".green(),
        commit.value.id.to_string().cyan(),
        commit.value.label
    );

    Ok(())
}
