use anyhow::Result;
use clap::CommandFactory;

use crate::commands::{add, complete, depend, list, reword, watch};
use crate::config;
use crate::store::ObservableTaskStore;

use super::types::{Cli, Commands};

pub async fn dispatch(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        let mut command = Cli::command();
        clap_complete::generate(*shell, &mut command, "braid", &mut std::io::stdout());
        return Ok(());
    }

    let path = config::resolve_data_path(cli.file)?;
    let store = ObservableTaskStore::open(path);

    match cli.command {
        Commands::Add { label, depends_on } => add::execute(&store, label, depends_on).await,
        Commands::List => list::execute(&store).await,
        Commands::Done { id } => complete::execute(&store, id).await,
        Commands::Reword { id, label } => reword::execute(&store, id, label).await,
        Commands::Depend { id, on } => depend::execute(&store, id, on).await,
        Commands::Watch => watch::execute(&store).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}
