use analyzer::AppContext;
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use cli::commands::{sessions, status};
use cli::{AnalyzeCommand, ShowCommand};
use common::{init_logging, LoggingConfig};
use infrastructure::ConfigLoader;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "docimprove")]
#[command(about = "Documentation quality assistant: readability score plus structure, completeness and style critiques")]
#[command(version)]
struct Cli {
    /// Config file (TOML or JSON); searched in the default locations otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base directory for the session database and content store
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Debug-level logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a documentation page and analyze it
    Analyze(AnalyzeCommand),
    /// List the most recent sessions
    Recent {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List every stored session
    History,
    /// Show a stored session's report
    Show(ShowCommand),
    /// API key, model and storage status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        if !path.is_file() {
            bail!("Config file not found: {}", path.display());
        }
        loader = loader.with_path(path.clone());
    }
    let (mut config, source) = loader.load_with_source().await?;

    if let Some(dir) = cli.data_dir {
        config.storage.base_path = dir;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.json_logs {
        config.logging.json = true;
    }

    let logging = LoggingConfig::from_level_name(&config.logging.level, config.logging.json)?;
    init_logging(&logging)?;
    debug!(source = ?source, "Configuration loaded");

    let ctx = AppContext::initialize(config).await?;

    let result = match cli.command {
        Commands::Analyze(cmd) => cmd.execute(&ctx).await,
        Commands::Recent { limit } => sessions::recent(&ctx, limit).await,
        Commands::History => sessions::history(&ctx).await,
        Commands::Show(cmd) => cmd.execute(&ctx).await,
        Commands::Status => status::status(&ctx).await,
    };

    ctx.shutdown()?;
    result
}
