use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "braid")]
#[command(about = "Personal task tracker with dependencies", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the task file (overrides BRAID_FILE and the configured default)
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task
    Add {
        /// Label for the new task
        label: String,

        /// Id of an existing task the new one depends on (repeatable)
        #[arg(long = "on", value_name = "ID")]
        depends_on: Vec<u64>,
    },

    /// List all tasks and their dependencies
    List,

    /// Mark a task completed
    Done {
        /// Id of the task to complete
        id: u64,
    },

    /// Change a task's label
    Reword {
        /// Id of the task to reword
        id: u64,

        /// The new label
        label: String,
    },

    /// Record that one task depends on another
    Depend {
        /// Id of the dependent task
        id: u64,

        /// Id of the task it depends on
        #[arg(long = "on", value_name = "ID")]
        on: u64,
    },

    /// Print each committed snapshot as mutations land
    Watch,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}
