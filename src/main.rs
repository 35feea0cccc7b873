use anyhow::{Context, Result};
use arxiv_explorer::api::{self, AppState};
use arxiv_explorer::config::{find_config_file, get_config, load_config, Config};
use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// arXiv Explorer - Expand research questions, search arXiv and download papers
#[derive(Parser, Debug)]
#[command(name = "arxiv-explorer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HTTP proxy for LLM keyword expansion, arXiv search and PDF download", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Address to listen on, overrides `server.bind`
        #[arg(long, short)]
        bind: Option<String>,
    },

    /// Print the effective configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli);

    let config = resolve_config(&cli)?;

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => serve(config, bind).await,
        Commands::Config => {
            let rendered = toml::to_string_pretty(&config.redacted())
                .context("Failed to render configuration")?;
            print!("{}", rendered);
            Ok(())
        }
    }
}

/// Initialize tracing based on verbosity; `RUST_LOG` wins when set
fn init_tracing(cli: &Cli) {
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let level = if cli.quiet { "error" } else { log_level };

    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| format!("arxiv_explorer={},tower_http={}", level, level)),
    );

    let registry = tracing_subscriber::registry().with(env_filter);
    match cli.log_format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Load configuration from `--config`, a default location, or the environment
fn resolve_config(cli: &Cli) -> Result<Config> {
    let config = if let Some(config_path) = &cli.config {
        load_config(config_path)
            .with_context(|| format!("Failed to load config file {}", config_path.display()))?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)
            .with_context(|| format!("Failed to load config file {}", config_path.display()))?
    } else {
        get_config().context("Failed to read configuration from environment")?
    };
    Ok(config)
}

async fn serve(mut config: Config, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind))?;

    if !config.gemini_configured() {
        tracing::warn!("GEMINI_API_KEY is not set; /api/expand will return configuration errors");
    }

    let state = AppState::from_config(&config).context("Failed to build HTTP client")?;
    api::serve(Arc::new(state), addr)
        .await
        .context("HTTP server failed")
}
