//! Landing CLI - migrations and landing page data from the terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod output;

use commands::{check, init, mark, migrate, page, status, GlobalArgs};

/// Landing - database tooling for landing pages
#[derive(Parser)]
#[command(name = "landing", version, about, long_about = None)]
struct Cli {
    /// Database file (overrides settings and LANDING_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Migrations directory (overrides settings and LANDING_MIGRATIONS_DIR)
    #[arg(long, global = true)]
    migrations_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Migrate {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show applied and pending migrations
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse pending migrations without applying them
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the bundled landing page migrations and save the resolved paths
    Init,

    /// Record a pending migration as applied without running it
    Mark {
        /// Migration name (filename without .sql)
        name: String,
    },

    /// Read and write landing page data
    Page {
        #[command(subcommand)]
        command: page::PageCommands,
    },
}

fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let args = GlobalArgs {
        db: cli.db,
        migrations_dir: cli.migrations_dir,
    };

    match cli.command {
        Commands::Migrate { json } => migrate::run(&args, json),
        Commands::Status { json } => status::run(&args, json),
        Commands::Check { json } => check::run(&args, json),
        Commands::Init => init::run(&args),
        Commands::Mark { name } => mark::run(&args, &name),
        Commands::Page { command } => page::run(&args, command),
    }
}
