//! `braid list`

use anyhow::Result;
use colored::Colorize;

use crate::graph::TaskGraph;
use crate::store::ObservableTaskStore;

/// Render all tasks with completion glyphs and dependency lines
pub async fn execute(store: &ObservableTaskStore) -> Result<()> {
    let snapshot = store.snapshot().await?;

    if snapshot.is_empty() {
        println!("No tasks yet. Add one with 'braid add <label>'.");
        return Ok(());
    }

    print_graph(&snapshot);

    let open = snapshot.tasks().filter(|t| !t.completed).count();
    println!();
    println!(
        "{} task(s), {} open",
        snapshot.len().to_string().bold(),
        open.to_string().bold()
    );

    Ok(())
}

/// Print one line per task plus an indented line per dependency
pub fn print_graph(graph: &TaskGraph) {
    for task in graph.tasks() {
        let glyph = if task.completed {
            "✓".green().bold()
        } else {
            "○".white().dimmed()
        };
        let label = if task.completed {
            task.label.dimmed().strikethrough()
        } else {
            task.label.normal()
        };
        println!("{} {} {}", glyph, task.id.to_string().cyan(), label);

        for dep in graph.dependencies_of(task.id) {
            println!(
                "    {} depends on {} '{}'",
                "→".dimmed(),
                dep.id.to_string().cyan(),
                dep.label.dimmed()
            );
        }
    }
}
