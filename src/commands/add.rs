//! `braid add <label> [--on <id>]...`

use anyhow::Result;
use colored::Colorize;

use crate::models::TaskId;
use crate::store::{NewTask, ObservableTaskStore};

/// Create a new task, optionally depending on existing tasks
pub async fn execute(
    store: &ObservableTaskStore,
    label: String,
    depends_on: Vec<u64>,
) -> Result<()> {
    let options = NewTask {
        depends_on: depends_on.into_iter().map(TaskId).collect(),
        ..NewTask::default()
    };

    let commit = store.create_task(label, options).await?;
    let task = &commit.value;

    println!(
        "{} Added task {} '{}'",
        "✓".green(),
        task.id.to_string().cyan(),
        task.label
    );
    for dep in commit.after.dependencies_of(task.id) {
        println!(
            "  {} depends on {} '{}'",
            "→".dimmed(),
            dep.id.to_string().cyan(),
            dep.label.dimmed()
        );
    }

    Ok(())
}
