//! `braid watch`
//!
//! Subscribes to the store and reprints the graph on every commit. Commits
//! are only visible from the process that owns the store (the backing file
//! has no cross-process change notification), so this is chiefly useful
//! when braid is embedded as a library or driven from tests.

use anyhow::{anyhow, Result};
use colored::Colorize;

use crate::store::ObservableTaskStore;

use super::list::print_graph;

/// Print the current snapshot, then every committed snapshot in order
pub async fn execute(store: &ObservableTaskStore) -> Result<()> {
    let mut subscription = store.observe().await;

    println!("{}", "Watching task store (Ctrl-C to stop)".dimmed());

    while let Some(update) = subscription.recv().await {
        let snapshot = update.map_err(|err| anyhow!(err))?;

        println!();
        if snapshot.is_empty() {
            println!("{}", "(no tasks)".dimmed());
        } else {
            print_graph(&snapshot);
        }
    }

    Ok(())
}
