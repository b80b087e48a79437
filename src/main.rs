//! CLI entry point for the ESG oracle.
//!
//! Provides subcommands for running the dashboard service, scoring once,
//! scoring a single value by hand, and listing the metric catalog.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use esg_oracle::{
    catalog::Catalog,
    config::Settings,
    history::HistoryEntry,
    oracle::Oracle,
    output::{append_record, print_json, print_report},
    providers::{Provider, build_providers, offline_providers},
    publish::publish,
    scheduler::{S3Target, Sinks, run_schedule},
    scoring::{MetricRange, WeightTable},
    server,
};
use std::ffi::OsStr;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "esg_oracle")]
#[command(about = "Scores public ESG data into a fee", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the oracle on a schedule and serve the dashboard
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Weights JSON file (overrides WEIGHTS_PATH)
        #[arg(short, long)]
        weights: Option<PathBuf>,

        /// CSV file to append each successful run to
        #[arg(long)]
        history_csv: Option<PathBuf>,

        /// Optional: S3 bucket to publish results to (e.g., "my-bucket")
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Score catalog fallback values instead of calling providers
        #[arg(long, default_value_t = false)]
        offline: bool,
    },
    /// Run the oracle once and print the report
    Run {
        /// Weights JSON file (overrides WEIGHTS_PATH)
        #[arg(short, long)]
        weights: Option<PathBuf>,

        /// CSV file to append the result to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also print the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Optional: S3 bucket to publish the result to
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Score catalog fallback values instead of calling providers
        #[arg(long, default_value_t = false)]
        offline: bool,
    },
    /// Normalize a single raw value onto 0-100
    Normalize {
        #[arg(allow_negative_numbers = true)]
        value: f64,

        #[arg(long, allow_negative_numbers = true)]
        min: f64,

        #[arg(long, allow_negative_numbers = true)]
        max: f64,

        /// Higher raw values score lower
        #[arg(long, default_value_t = false)]
        invert: bool,
    },
    /// List every metric the oracle collects
    ListMetrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/esg_oracle.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("esg_oracle.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Serve {
            port,
            weights,
            history_csv,
            s3_bucket,
            offline,
        } => {
            let oracle = build_oracle(&settings, weights, offline)?;
            let sinks = Sinks {
                csv_path: history_csv,
                s3: s3_target(s3_bucket).await,
            };
            serve(&settings, port.unwrap_or(settings.port), oracle, sinks).await?;
        }
        Commands::Run {
            weights,
            output,
            json,
            s3_bucket,
            offline,
        } => {
            let oracle = build_oracle(&settings, weights, offline)?;
            let report = oracle.run_once().await?;

            print_report(&report);
            if json {
                print_json(&report)?;
            }

            let entry = HistoryEntry::from(&report);
            if let Some(path) = output {
                append_record(&path, &entry)?;
            }
            if let Some(target) = s3_target(s3_bucket).await {
                publish(&target.client, &target.bucket, &report, &[entry]).await?;
            }
        }
        Commands::Normalize {
            value,
            min,
            max,
            invert,
        } => {
            let score = MetricRange::new(min, max, invert).normalize(value)?;
            info!(value, min, max, invert, score, "Normalized");
            println!("{score}");
        }
        Commands::ListMetrics => {
            let catalog = Catalog::standard(&settings.bases);
            for provider in catalog.providers() {
                for metric in &provider.metrics {
                    info!(
                        provider = %provider.name,
                        category = %metric.category,
                        metric = %metric.name,
                        min = metric.range.min,
                        max = metric.range.max,
                        invert = metric.range.invert,
                        fallback = metric.fallback,
                        url = %metric.url,
                        "Metric"
                    );
                }
            }
            info!(
                providers = catalog.providers().len(),
                metrics = catalog.metrics().count(),
                "Catalog summary"
            );
        }
    }

    Ok(())
}

/// Loads weights and providers and validates the configuration.
fn build_oracle(settings: &Settings, weights: Option<PathBuf>, offline: bool) -> Result<Oracle> {
    let catalog = Catalog::standard(&settings.bases);

    let weights = match weights.or_else(|| settings.weights_path.clone()) {
        Some(path) => {
            info!(path = %path.display(), "Loading weights");
            WeightTable::load(&path)?
        }
        None => catalog.default_weights(),
    };

    let providers: Vec<Arc<dyn Provider>> = if offline {
        info!("Offline mode: scoring catalog fallbacks");
        offline_providers(&catalog)
    } else {
        build_providers(&catalog, settings.request_timeout)?
    };

    Oracle::new(providers, &catalog, weights).context("invalid oracle configuration")
}

async fn s3_target(bucket: Option<String>) -> Option<S3Target> {
    let bucket = bucket.filter(|b| !b.is_empty())?;
    let config = aws_config::load_from_env().await;
    info!(bucket = %bucket, "S3 publishing enabled");
    Some(S3Target {
        client: aws_sdk_s3::Client::new(&config),
        bucket,
    })
}

/// Starts the scheduler and the dashboard, and stops both on Ctrl+C or SIGTERM.
#[tracing::instrument(skip(settings, oracle, sinks))]
async fn serve(settings: &Settings, port: u16, oracle: Oracle, sinks: Sinks) -> Result<()> {
    let state = server::shared(settings.history_size);

    let scheduler = tokio::spawn(run_schedule(
        Arc::new(oracle),
        state.clone(),
        sinks,
        settings.update_frequency,
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    server::serve(listener, state, shutdown_signal()).await?;

    scheduler.abort();
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C signal"),
            Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received SIGTERM signal");
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
