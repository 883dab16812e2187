use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gridsched",
    about = "gridsched — usage-aware node filtering and scoring",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved usage plugin configuration and any warnings.
    Config {
        /// Scheduler configuration file (TOML).
        #[arg(short, long)]
        config: PathBuf,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Evaluate a task against every node in a utilization file.
    ///
    /// The file maps node names to per-period readings:
    /// `{"node-a": {"cpu": {"10m": 50}, "mem": {"10m": 40}}}`.
    Eval {
        /// Scheduler configuration file (TOML).
        #[arg(short, long)]
        config: PathBuf,
        /// Node utilization file (JSON).
        #[arg(short, long)]
        nodes: PathBuf,
        /// Task as namespace/name.
        #[arg(short, long, default_value = "default/task")]
        task: String,
        /// Start with empty node snapshots, as after a scheduler restart.
        #[arg(long)]
        cold: bool,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("gridsched=info".parse()?);
    if cli.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    match cli.command {
        Commands::Config { config, format } => commands::config::show(&config, &format),
        Commands::Eval {
            config,
            nodes,
            task,
            cold,
            format,
        } => commands::eval::eval(&config, &nodes, &task, cold, &format),
    }
}
