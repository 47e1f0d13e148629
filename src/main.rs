use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pipeline::config::{LogFormat, PipelineConfig};

mod cmd;

#[derive(Parser)]
#[command(name = "pipeline")]
#[command(version, about = "Opportunity pipeline kanban board")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// REST base URL. Overrides PIPELINE_API_URL and pipeline.toml.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Filter bar options shared by board views.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct FilterArgs {
    /// Services to show (repeatable): "Life Insurance", Annuity, Medicare
    #[arg(long = "service")]
    pub services: Vec<String>,

    /// Interest levels to show (repeatable): cold, warm, hot
    #[arg(long = "interest")]
    pub interest: Vec<String>,

    /// Only opportunities opened at most this many days ago (0-365)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=365))]
    pub days_open: Option<u32>,

    /// Only opportunities closing on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub max_closing_date: Option<chrono::NaiveDate>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List pipeline stages in board order
    Stages,
    /// Show opportunities grouped by stage
    Board {
        /// Use built-in demo data instead of the backend
        #[arg(long)]
        demo: bool,

        /// Print the grouped board as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Drag an opportunity to a stage and report the outcome
    Move {
        /// Opportunity id
        id: String,

        /// Target stage, e.g. PROSPECT_QUOTE
        stage: String,

        /// Use built-in demo data instead of the backend
        #[arg(long)]
        demo: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the local CRM backend
    Serve {
        /// Port to serve on
        #[arg(short, long, default_value = "3002")]
        port: u16,

        /// Enable dev mode (CORS permissive, bind all interfaces)
        #[arg(long)]
        dev: bool,

        /// Require bearer auth; the issued tokens are written to the session file
        #[arg(long)]
        auth: bool,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default pipeline.toml file
    Init,
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let default = if verbose { "pipeline=debug" } else { "pipeline=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let registry = tracing_subscriber::registry().with(filter);
    // Logs go to stderr so --json output stays machine-readable.
    match format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let config = PipelineConfig::new(project_dir)?.with_api_url(cli.api_url.clone());
    init_tracing(cli.verbose, config.log_format());

    match &cli.command {
        Commands::Stages => cmd::cmd_stages(),
        Commands::Board {
            demo,
            json,
            filters,
        } => cmd::cmd_board(&config, *demo, *json, filters).await?,
        Commands::Move {
            id,
            stage,
            demo,
            json,
        } => cmd::cmd_move(&config, id, stage, *demo, *json).await?,
        Commands::Serve { port, dev, auth } => cmd::cmd_serve(&config, *port, *dev, *auth).await?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}
