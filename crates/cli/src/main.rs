//! Anvil CLI — the main entry point.
//!
//! Commands:
//! - `agent`  — Interactive REPL, or a single goal with `--goal`
//! - `tools`  — List the capabilities offered to the backend

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "anvil",
    about = "Anvil — a ReAct coding agent that works inside one workspace",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Work on goals in a workspace
    Agent {
        /// Run a single goal instead of entering interactive mode
        #[arg(short, long)]
        goal: Option<String>,

        /// Sandbox root (defaults to the configured workspace, then the current directory)
        #[arg(short, long, env = "ANVIL_WORKSPACE")]
        workspace: Option<PathBuf>,

        /// Override the per-goal step budget
        #[arg(long)]
        max_steps: Option<u32>,
    },

    /// List the available tools
    Tools {
        /// Sandbox root the listing is built against
        #[arg(short, long, env = "ANVIL_WORKSPACE")]
        workspace: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Agent {
            goal,
            workspace,
            max_steps,
        } => commands::agent::run(goal, workspace, max_steps).await?,
        Commands::Tools { workspace } => commands::tools::run(workspace)?,
    }

    Ok(())
}
