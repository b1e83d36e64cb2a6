use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "modelpick")]
#[command(about = "Browse and pick LLM models, keeping recent picks in sync with your providers", long_about = None)]
struct Cli {
    /// Source configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for derived state (defaults to the platform data directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Extra provider catalog file (JSON array of providers)
    #[arg(long, global = true)]
    providers: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the grouped model list for a size class
    List {
        #[arg(long, default_value = "large")]
        class: String,
    },
    /// Prune stale recent models and write the derived configuration
    Reconcile {
        #[arg(long, default_value = "large")]
        class: String,
    },
    /// Record a model as the most recent pick
    Select {
        #[arg(long, default_value = "large")]
        class: String,
        provider: String,
        model: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = commands::open_service(
        cli.config.as_deref(),
        cli.data_dir.as_deref(),
        cli.providers.as_deref(),
    )?;

    match cli.command {
        Commands::List { class } => commands::list::run(&service, &class.as_str().into()).await?,
        Commands::Reconcile { class } => {
            commands::reconcile::run(&service, &class.as_str().into()).await?
        }
        Commands::Select {
            class,
            provider,
            model,
        } => commands::select::run(&service, &class.as_str().into(), &provider, &model).await?,
    }

    Ok(())
}
