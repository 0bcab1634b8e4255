//! `braid depend <id> --on <id>`

use anyhow::Result;
use colored::Colorize;

use crate::graph::GraphError;
use crate::models::TaskId;
use crate::store::ObservableTaskStore;

/// Add a dependency edge between two existing tasks
pub async fn execute(store: &ObservableTaskStore, id: u64, on: u64) -> Result<()> {
    let (from, to) = (TaskId(id), TaskId(on));

    let commit = store
        .apply(move |graph| {
            let dependent = graph.get(from).ok_or(GraphError::UnknownNode(from))?.clone();
            let dependency = graph.get(to).ok_or(GraphError::UnknownNode(to))?.clone();
            let next = graph.with_dependency(from, to)?;
            Ok((next, (dependent, dependency)))
        })
        .await?;

    let (dependent, dependency) = commit.value;
    println!(
        "{} {} '{}' now depends on {} '{}'",
        "✓".green(),
        dependent.id.to_string().cyan(),
        dependent.label,
        dependency.id.to_string().cyan(),
        dependency.label
    );

    Ok(())
}
