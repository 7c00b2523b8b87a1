//! Ceviri - translate text into Turkish and score the result
//!
//! Command-line entry point. Builds the service bundle once, then runs a single
//! translate-and-score request or one of the maintenance commands.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use tracing_appender::{non_blocking, rolling};

use ceviri::cli::{Args, Commands};
use ceviri::config::{Config, LanguageMode};
use ceviri::error::CeviriError;
use ceviri::input;
use ceviri::report::{self, TranslationReport};
use ceviri::services::{check_services, required_services_ok};
use ceviri::workflow::run_translation;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    info!("Starting Ceviri");

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Translate { text, file, reference, reference_file, detect_language, json } => {
            if detect_language {
                config.translate.language_mode = LanguageMode::Detect;
            }

            let stdin = std::io::stdin();
            let piped = (!stdin.is_terminal()).then(|| stdin.lock());
            let source = input::read_source(text, file.as_deref(), piped)?;
            let reference = match (reference, reference_file) {
                (Some(reference), _) => reference,
                (None, Some(path)) => input::read_file(&path)?,
                (None, None) => String::new(),
            };

            let spinner = if json || args.verbose || source.trim().is_empty() {
                None
            } else {
                Some(spinner("Translating…")?)
            };

            let result = run_translation(&config, &source, &reference).await;

            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            let outcome = result?;
            if json {
                println!("{}", serde_json::to_string_pretty(&TranslationReport::new(&outcome))?);
            } else {
                print!("{}", report::render_text(&outcome));
            }
        }
        Commands::Languages => {
            print!("{}", report::render_languages());
        }
        Commands::Check => {
            info!("Checking services...");
            let statuses = check_services(&config).await?;

            print!("{}", report::render_service_check(&statuses));

            if !required_services_ok(&statuses) {
                return Err(CeviriError::Config("A required service is unavailable".to_string()).into());
            }
        }
        Commands::InitConfig { output, force } => {
            Config::write_default(&output, force)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir: PathBuf = std::env::current_dir()?.join(".ceviri").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "ceviri.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::WARN };

    // Console stays quiet unless asked; the file keeps everything at INFO and up
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::from_default_env().add_directive(log_level.into()));

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false) // No ANSI colors in file
        .with_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("ceviri.log").display());

    Ok(())
}
