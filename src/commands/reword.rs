//! `braid reword <id> <label>`

use anyhow::{bail, Result};
use colored::Colorize;

use crate::graph::GraphError;
use crate::models::TaskId;
use crate::store::ObservableTaskStore;

/// Change a task's label
pub async fn execute(store: &ObservableTaskStore, id: u64, label: String) -> Result<()> {
    let id = TaskId(id);

    let commit = store
        .apply(move |graph| {
            if label.trim().is_empty() {
                bail!("new label cannot be empty");
            }
            let task = graph.get(id).ok_or(GraphError::UnknownNode(id))?;
            let old_label = task.label.clone();
            let reworded = task.relabeled(label);
            let next = graph.with_task_replaced(reworded.clone())?;
            Ok((next, (old_label, reworded)))
        })
        .await?;

    let (old_label, task) = commit.value;
    println!(
        "{} Reworded {} '{}' → '{}'",
        "✓".green(),
        task.id.to_string().cyan(),
        old_label.dimmed(),
        task.label
    );

    Ok(())
}
