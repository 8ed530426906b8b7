// ============================================================================
// File: src/main.rs
// Entry point and CLI handling
// ============================================================================

mod api_client;
mod config;
mod display;
mod error;
mod health;
mod history;
mod markdown;
mod models;
mod session;
mod verdict;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::api_client::{AnalysisService, ApiClient};
use crate::config::Config;
use crate::health::{HealthMonitor, HealthState};
use crate::markdown::MarkdownExporter;
use crate::models::RequestType;
use crate::session::AnalysisSession;

/// Command-line arguments for the IsItTrue client
#[derive(Parser, Debug)]
#[command(name = "isittrue")]
#[command(about = "Fact-check claims, detect AI-written text and ask questions", long_about = None)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Enable verbose output (request tracing and debug info)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a piece of text
    Analyze {
        /// Text to analyze; read from --file or stdin when omitted
        text: Option<String>,

        /// Analysis mode
        #[arg(short = 't', long = "type", value_enum)]
        request_type: Option<RequestType>,

        /// Response style, 0.0 (precise) to 1.0 (creative)
        #[arg(long)]
        temperature: Option<f32>,

        /// Read the text from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Ask the service which mode fits the text
        #[arg(short, long, conflicts_with = "request_type")]
        detect: bool,
    },

    /// Ask the service which analysis mode fits a text
    DetectType {
        text: String,
    },

    /// Check whether the service is up
    Health {
        /// Keep polling until interrupted
        #[arg(short, long)]
        watch: bool,
    },

    /// Show or manage local history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    /// List past analyses, newest first
    List,
    /// Remove all entries
    Clear,
    /// Write the history to a markdown file
    Export {
        #[arg(short, long, default_value = "isittrue_history.md")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command-line arguments
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // One notification per failure
            display::print_error(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("isittrue={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<()> {
    // Load configuration from JSON file
    let config = Config::load(&args.config)?;
    let client: Arc<dyn AnalysisService> = Arc::new(ApiClient::new(
        config.api_base_url.clone(),
        config.timeout(),
    )?);

    match args.command {
        Command::Analyze {
            text,
            request_type,
            temperature,
            file,
            detect,
        } => {
            let text = read_input(text, file)?;
            let session = AnalysisSession::new(client, config.open_history()?);
            let temperature = temperature.unwrap_or(config.default_temperature);

            let request_type = match request_type {
                Some(request_type) => request_type,
                None if detect => match session.detect_type(&text).await {
                    Ok(detected) => detected,
                    Err(e) if e.is_validation() => return Err(e.into()),
                    Err(e) => {
                        tracing::warn!(error = %e, "Type detection failed, using fact_check");
                        RequestType::default()
                    }
                },
                None => RequestType::default(),
            };

            analyze(&session, &text, request_type, temperature).await
        }

        Command::DetectType { text } => {
            let session = AnalysisSession::new(client, config.open_history()?);
            let detected = session.detect_type(&text).await?;
            println!("{} ({})", detected.label(), detected);
            Ok(())
        }

        Command::Health { watch: false } => {
            let state = match client.check_health().await {
                Ok(status) => HealthState::Reported(status),
                Err(e) => {
                    tracing::debug!(error = %e, "Health check failed");
                    HealthState::Unknown
                }
            };
            display::print_health(&state);
            Ok(())
        }

        Command::Health { watch: true } => {
            let cancel = cancel_on_ctrl_c();
            let monitor = HealthMonitor::spawn(client, config.health_interval(), cancel.clone());
            let mut updates = monitor.subscribe();

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let state = updates.borrow_and_update().clone();
                        display::print_health(&state);
                    }
                }
            }

            monitor.join().await;
            Ok(())
        }

        Command::History { action } => {
            let session = AnalysisSession::new(client, config.open_history()?);
            match action {
                HistoryAction::List => display::print_history(&session.history().await),
                HistoryAction::Clear => {
                    session.clear_history().await?;
                    display::print_success("History cleared");
                }
                HistoryAction::Export { output } => {
                    let entries = session.history().await;
                    MarkdownExporter::new(&entries).export(&output)?;
                    display::print_success(format!("History exported to: {}", output.display()));
                }
            }
            Ok(())
        }
    }
}

async fn analyze(
    session: &AnalysisSession,
    text: &str,
    request_type: RequestType,
    temperature: f32,
) -> Result<()> {
    display::print_header(request_type, temperature);

    let cancel = cancel_on_ctrl_c();
    let spinner = display::create_spinner("Analyzing...");
    let result = session.submit(text, request_type, temperature, cancel).await;
    spinner.finish_and_clear();

    let outcome = result?;
    display::print_result(&outcome);
    println!();
    display::print_success("Analysis complete!");
    Ok(())
}

fn read_input(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return fs::read_to_string(&path)
            .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(anyhow!("Please enter some text to analyze"));
    }
    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
    cancel
}
