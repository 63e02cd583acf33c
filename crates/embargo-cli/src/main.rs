mod cmd;
mod output;
mod root;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, item::ItemSubcommand, jobs::JobsSubcommand,
    workflow::WorkflowSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "embargo",
    about = "Embargo and expiry scheduling for approval workflows",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .embargo/ or .git/)
    #[arg(long, global = true, env = "EMBARGO_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Override the current time (RFC 3339), e.g. to replay a schedule
    #[arg(long, global = true, env = "EMBARGO_NOW")]
    now: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize embargo in the current project
    Init,

    /// Manage content items
    Item {
        #[command(subcommand)]
        subcommand: ItemSubcommand,
    },

    /// Inspect workflow definitions and complete workflows
    Workflow {
        #[command(subcommand)]
        subcommand: WorkflowSubcommand,
    },

    /// Inspect scheduled publish/unpublish jobs
    Jobs {
        #[command(subcommand)]
        subcommand: JobsSubcommand,
    },

    /// Validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn resolve_now(raw: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match raw {
        Some(raw) => Ok(embargo_core::types::parse_timestamp(raw)?),
        None => Ok(Utc::now()),
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = resolve_now(cli.now.as_deref()).and_then(|now| match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Item { subcommand } => cmd::item::run(&root, subcommand, cli.json),
        Commands::Workflow { subcommand } => cmd::workflow::run(&root, subcommand, now, cli.json),
        Commands::Jobs { subcommand } => cmd::jobs::run(&root, subcommand, now, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
