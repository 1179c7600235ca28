//! Transparency - congressional and campaign-finance aggregation service
//!
//! Serves cached aggregates of Congress.gov, OpenFEC and the
//! congress-legislators directory, or prints a single report as JSON.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, config, bind failure, failed report)

mod analysis;
mod cache;
mod cli;
mod config;
mod error;
mod models;
mod remote;
mod server;
mod service;

use anyhow::{Context, Result};
use cli::{Args, ReportKind};
use config::{Config, CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use server::AppState;
use service::CongressQuery;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if args.init_config {
        return handle_init_config();
    }

    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(config.log_level(args.quiet));

    info!("Transparency v{}", env!("CARGO_PKG_VERSION"));
    source.log();

    if let Err(e) = run(args, config).await {
        error!("{:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .transparency.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Add your Congress.gov and OpenFEC API keys to enable live data.");
    Ok(())
}

/// Initialize logging at the effective verbosity.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

async fn run(args: Args, config: Config) -> Result<()> {
    if config.congress.api_key.is_none() {
        warn!("No Congress.gov API key configured; using the rate-limited demo key");
    }

    let report = args.report;
    let state = AppState::new(config)?;

    match report {
        Some(kind) => print_report(&state, kind, &args).await,
        None => server::serve(state).await,
    }
}

/// Run one report through the same services the server uses and print it.
async fn print_report(state: &Arc<AppState>, kind: ReportKind, args: &Args) -> Result<()> {
    let spinner = (!args.quiet).then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Building {:?} report...", kind).to_lowercase());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    });

    let result = build_report(state, kind, args).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let value = result?;
    let rendered = serde_json::to_string_pretty(&value).context("Failed to render report")?;
    println!("{}", rendered);
    Ok(())
}

async fn build_report(state: &AppState, kind: ReportKind, args: &Args) -> Result<Value> {
    let id = args.id.as_deref();

    let value = match kind {
        ReportKind::House | ReportKind::Senate | ReportKind::Detailed => {
            let view = match kind {
                ReportKind::House => "house",
                ReportKind::Senate => "senate",
                _ => "detailed",
            };
            serde_json::to_value(state.congress.congress(&CongressQuery::of_kind(view)).await?)?
        }
        ReportKind::Donations => {
            let party = args.party.as_deref();
            serde_json::to_value(state.donations.donations(party, party.is_some()).await)?
        }
        ReportKind::Stats => serde_json::to_value(state.members.member_stats(id).await?)?,
        ReportKind::Finances => serde_json::to_value(state.members.member_finances(id).await?)?,
    };

    Ok(value)
}

/// Where the configuration came from; logged once logging is up.
enum ConfigSource {
    File(PathBuf),
    Builtin,
    Unreadable(String),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Builtin => debug!("No config file found, using defaults"),
            ConfigSource::Unreadable(e) => warn!("Failed to load config: {}", e),
        }
    }
}

/// Load configuration from file or use defaults.
///
/// An explicit `--config` must load; a broken default file falls back to
/// defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::File(config_path.clone())));
    }

    Ok(match Config::load_default() {
        Ok(Some(config)) => (config, ConfigSource::File(PathBuf::from(CONFIG_FILE))),
        Ok(None) => (Config::default(), ConfigSource::Builtin),
        Err(e) => (Config::default(), ConfigSource::Unreadable(format!("{:#}", e))),
    })
}
