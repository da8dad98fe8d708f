//! engine-support: turbofan health diagnosis CLI and HTTP service
//!
//! # Usage
//!
//! ```bash
//! # One reading, human-readable report
//! engine-support diagnose --egt 955 --vibration 1.2 --oil-pressure 50 --cycles 5000
//!
//! # JSON lines in, JSON lines out
//! cat readings.jsonl | engine-support batch > diagnoses.jsonl
//!
//! # HTTP API on the configured address
//! engine-support serve --addr 0.0.0.0:8080
//!
//! # Print the compiled-in threshold table
//! engine-support thresholds
//! ```
//!
//! # Environment Variables
//!
//! - `ENGINE_SUPPORT_CONFIG`: path to `engine_support.toml`
//! - `ENGINE_SUPPORT_SERVER_ADDR`: overrides `server.addr`
//! - `ENGINE_SUPPORT_CORS_ORIGINS`: comma-separated allowed origins
//! - `RUST_LOG`: log filter (default: `logging.level`, then `info`)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use engine_support::api::{create_app_with_limit, ApiState};
use engine_support::{
    logging, run_batch, AppConfig, Diagnostician, RawReading, ThresholdTable, TracingAuditSink,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "engine-support")]
#[command(about = "Turbofan engine health diagnosis")]
#[command(version)]
struct CliArgs {
    /// Path to engine_support.toml (overrides ENGINE_SUPPORT_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Diagnose a single reading
    Diagnose {
        /// Exhaust gas temperature, °C
        #[arg(long, allow_negative_numbers = true)]
        egt: f64,
        /// N1 vibration, mils
        #[arg(long, allow_negative_numbers = true)]
        vibration: f64,
        /// Oil pressure, PSI
        #[arg(long, allow_negative_numbers = true)]
        oil_pressure: f64,
        /// Cycles since last overhaul
        #[arg(long, allow_negative_numbers = true)]
        cycles: i128,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Read JSON requests from stdin, one per line; write diagnoses to stdout
    Batch,

    /// Run the HTTP API
    Serve {
        /// Override the listen address (default: server.addr)
        #[arg(short, long, value_name = "HOST:PORT")]
        addr: Option<String>,
    },

    /// Print the threshold table as TOML
    Thresholds,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

// ============================================================================
// Commands
// ============================================================================

fn run_diagnose(diagnostician: &Diagnostician, raw: RawReading, format: OutputFormat) -> Result<()> {
    let diagnosis = diagnostician.diagnose(raw, &TracingAuditSink);
    match format {
        OutputFormat::Text => println!("{diagnosis}"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&diagnosis).context("Failed to encode diagnosis")?
        ),
    }
    Ok(())
}

async fn run_batch_stdio(diagnostician: &Diagnostician) -> Result<()> {
    let reader = tokio::io::BufReader::new(tokio::io::stdin());
    let summary = run_batch(reader, tokio::io::stdout(), diagnostician, &TracingAuditSink).await?;
    info!(
        requests = summary.requests,
        by_status = ?summary.by_status,
        "Batch complete"
    );
    Ok(())
}

async fn run_server(config: &AppConfig, diagnostician: Diagnostician) -> Result<()> {
    let addr = config.server_addr()?;
    let state = ApiState::new(diagnostician, Arc::new(TracingAuditSink));
    let app = create_app_with_limit(state, config.server.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "HTTP server listening");

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown");
        shutdown_token.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}

fn print_thresholds(limits: &ThresholdTable) -> Result<()> {
    let rendered = toml::to_string_pretty(limits).context("Failed to render thresholds")?;
    print!("{rendered}");
    Ok(())
}

// ============================================================================
// Entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let (mut config, report) = AppConfig::load(args.config.as_deref())?;
    if let SubCommand::Serve { addr: Some(addr) } = &args.command {
        config.server.addr.clone_from(addr);
        config.validate()?;
    }

    logging::init(&config.logging)?;
    logging::route_panics_to_tracing();
    report.log();

    let diagnostician = Diagnostician::standard();

    match args.command {
        SubCommand::Diagnose {
            egt,
            vibration,
            oil_pressure,
            cycles,
            format,
        } => run_diagnose(
            &diagnostician,
            RawReading::new(egt, vibration, oil_pressure, cycles),
            format,
        ),
        SubCommand::Batch => run_batch_stdio(&diagnostician).await,
        SubCommand::Serve { .. } => run_server(&config, diagnostician).await,
        SubCommand::Thresholds => print_thresholds(diagnostician.limits()),
    }
}
