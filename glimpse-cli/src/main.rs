//! Glimpse CLI - ask questions about videos and images.
//!
//! Uploads one video and any number of images to Gemini, waits for the
//! video to finish processing, and prints a single markdown answer.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

mod config;
mod error;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use glimpse::prelude::*;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, IssueLevel, config_path as default_config_path};
use crate::error::{CliError, Result};

/// Glimpse - multimodal video and image analysis with web research
#[derive(Parser)]
#[command(name = "glimpse-cli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "GLIMPSE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question about a video and/or images
    Analyze(AnalyzeArgs),

    /// Show configuration and environment status
    Status,

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the analyze command
#[derive(Args)]
struct AnalyzeArgs {
    /// Question or insight to analyze the media for
    #[arg(default_value = "")]
    query: String,

    /// Video file (mp4, mov, avi)
    #[arg(long)]
    video: Option<PathBuf>,

    /// Image file (jpg, jpeg, png); repeat for several images
    #[arg(short, long = "image")]
    images: Vec<PathBuf>,

    /// Model to use (overrides config)
    #[arg(short = 'M', long, env = "GEMINI_MODEL")]
    model: Option<String>,

    /// Seconds to wait for video processing; 0 waits until Ctrl+C
    #[arg(long)]
    poll_timeout: Option<u64>,

    /// Do not offer web search to the agent
    #[arg(long)]
    no_search: bool,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Show configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },
    /// Validate configuration
    Validate,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::AnalysisFailed) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "glimpse_cli={level},glimpse={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let config_file = cli.config.unwrap_or_else(default_config_path);

    match cli.command {
        Commands::Analyze(args) => cmd_analyze(args, &config_file).await,
        Commands::Status => cmd_status(&config_file).await,
        Commands::Config(args) => cmd_config(args, &config_file).await,
    }
}

/// Run one analysis request.
async fn cmd_analyze(args: AnalyzeArgs, config_file: &Path) -> Result<()> {
    // Check the query before touching any file.
    let mut request = AnalysisRequest::new(args.query);
    if let Err(e) = request.validate() {
        println!("{}", Report::from_outcome(Err(e)));
        return Ok(());
    }

    let mut config = config::load_valid_config(config_file).await?;
    if let Some(model) = args.model {
        config.gemini.model = model;
    }
    if let Some(secs) = args.poll_timeout {
        config.polling.timeout_secs = secs;
    }
    if args.no_search {
        config.search.enabled = false;
    }

    if let Some(path) = &args.video {
        request = request.with_upload(read_upload(path, MediaKind::Video).await?);
    }
    for path in &args.images {
        request = request.with_upload(read_upload(path, MediaKind::Image).await?);
    }

    let pipeline = build_pipeline(&config)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    println!("Processing media and gathering insights...\n");
    let report = Report::from_outcome(pipeline.run(&request, &cancel).await);

    match report {
        Report::Answer(answer) => {
            println!("## {}\n\n{answer}", Report::ANSWER_HEADING);
            Ok(())
        }
        Report::Warning(msg) => {
            println!("{msg}");
            Ok(())
        }
        Report::Failure(msg) => {
            println!("{msg}");
            Err(CliError::AnalysisFailed)
        }
    }
}

/// Read a media file and check it is of the expected kind.
async fn read_upload(path: &Path, expected: MediaKind) -> Result<MediaUpload> {
    let upload = MediaUpload::from_path(path).await?;
    if upload.kind() != expected {
        return Err(CliError::invalid(format!(
            "{} is not a {expected} file (accepted: {})",
            path.display(),
            expected.extensions().join(", ")
        )));
    }
    Ok(upload)
}

/// Wire the Gemini backend, agent and pipeline from configuration.
fn build_pipeline(config: &AppConfig) -> Result<Pipeline> {
    let api_key = std::env::var(GeminiConfig::API_KEY_ENV).unwrap_or_default();
    if api_key.is_empty() {
        tracing::warn!("{} is not set; requests will fail", GeminiConfig::API_KEY_ENV);
    }

    let gemini = Arc::new(Gemini::new(config.gemini_config(api_key))?);

    let ingestor = Ingestor::new(Arc::clone(&gemini) as Arc<dyn MediaIngestion>)
        .with_policy(config.polling.policy());

    let mut agent = Agent::new(&config.agent.name)
        .provider(gemini)
        .max_steps(config.agent.max_steps)
        .markdown(config.agent.markdown);
    if let Some(instructions) = &config.agent.instructions {
        agent = agent.instructions(instructions);
    }
    if config.search.enabled {
        agent = agent.tool(WebSearchTool::new().with_max_results(config.search.max_results));
    }

    let analyzer = Analyzer::new(Arc::new(agent));

    Ok(Pipeline::new(TempMediaStore::new(), ingestor, analyzer))
}

/// Show status.
async fn cmd_status(config_file: &Path) -> Result<()> {
    println!("Glimpse Status\n");

    println!("Configuration:");
    println!("  Path:   {}", config_file.display());
    println!(
        "  Exists: {}",
        if config_file.exists() { "yes" } else { "no" }
    );

    match config::load_config_from(config_file).await {
        Ok(config) => {
            let config = config.with_env();
            println!("  Valid:  {}", if config.is_valid() { "yes" } else { "no" });
            println!();
            println!("Gemini:");
            println!("  Model:    {}", config.gemini.model);
            println!("  Base URL: {}", config.gemini.base_url);
            println!();
            println!("Polling:");
            println!("  Interval: {} ms", config.polling.interval_ms);
            if config.polling.timeout_secs == 0 {
                println!("  Timeout:  none");
            } else {
                println!("  Timeout:  {} s", config.polling.timeout_secs);
            }
            println!();
            println!("Agent:");
            println!("  Name:       {}", config.agent.name);
            println!("  Max steps:  {}", config.agent.max_steps);
            println!(
                "  Web search: {}",
                if config.search.enabled { "enabled" } else { "disabled" }
            );
        }
        Err(e) => {
            println!("  Valid:  no ({e})");
        }
    }

    println!();
    println!("Environment:");
    print_env_status(GeminiConfig::API_KEY_ENV);
    print_env_status("GEMINI_MODEL");
    print_env_status("GEMINI_BASE_URL");

    Ok(())
}

/// Configuration management.
async fn cmd_config(args: ConfigArgs, config_file: &Path) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", config_file.display());
        }
        ConfigCommands::Show => {
            let config = config::load_config_from(config_file).await?.with_env();
            let content = toml::to_string_pretty(&config).map_err(config::ConfigError::from)?;
            println!("{content}");
        }
        ConfigCommands::Init { force } => {
            if config::init_config(config_file, force).await? {
                println!("Configuration created: {}", config_file.display());
                println!();
                println!("Next steps:");
                println!("  1. export {}=<key>", GeminiConfig::API_KEY_ENV);
                println!("  2. glimpse-cli analyze \"What happens here?\" --video clip.mp4");
            } else {
                println!("Configuration already exists at: {}", config_file.display());
                println!("Use --force to overwrite.");
            }
        }
        ConfigCommands::Validate => {
            if !config_file.exists() {
                println!("error: configuration file does not exist");
                return Ok(());
            }

            let config = config::load_config_from(config_file).await?;
            let issues = config.validate();
            for issue in &issues {
                println!("{issue}");
            }
            if issues.iter().any(|i| i.level == IssueLevel::Error) {
                return Err(CliError::invalid("configuration has errors"));
            }
            println!("Configuration is valid");
        }
    }

    Ok(())
}

/// Print whether an environment variable is set, without revealing it.
fn print_env_status(name: &str) {
    let status = match std::env::var(name) {
        Ok(v) if !v.is_empty() => "set",
        _ => "not set",
    };
    println!("  {name}: {status}");
}
