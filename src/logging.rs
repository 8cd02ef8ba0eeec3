//! # Structured Logging Module
//!
//! Process-wide structured logging that writes to the console and to a
//! dated JSON log file. Installed once by the binary and shared by every
//! component through the global `tracing` dispatcher.

use chrono::Utc;
use std::fs;
use std::path::Path;
use std::process;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "signbot.log";

/// Initialize structured logging with environment-specific configuration.
///
/// Returns the file writer guard on the first call; the caller must keep
/// it alive for the lifetime of the process so buffered lines get flushed.
/// Later calls are no-ops and return `None`.
pub fn init_structured_logging(logs_dir: &Path, environment: &str) -> Option<WorkerGuard> {
    let mut guard = None;

    LOGGER_INITIALIZED.get_or_init(|| {
        let log_level = get_log_level(environment);

        if let Err(e) = fs::create_dir_all(logs_dir) {
            eprintln!("Failed to create log directory {}: {e}", logs_dir.display());
        }

        let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true)
                    .with_filter(build_filter(&log_level)),
            )
            .with(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false)
                    .json()
                    .with_filter(build_filter(&log_level)),
            );

        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = process::id(),
            environment = %environment,
            log_dir = %logs_dir.display(),
            "Structured logging initialized"
        );

        guard = Some(file_guard);
    });

    guard
}

/// `RUST_LOG` wins over the environment-derived default
fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for a contract moving through the workflow
pub fn log_contract_operation(operation: &str, contract: &str, status: &str, details: Option<&str>) {
    tracing::info!(
        operation = %operation,
        contract = %contract,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "CONTRACT_OPERATION"
    );
}

/// Log structured data for a notification channel
pub fn log_channel_operation(channel: &str, operation: &str, status: &str, details: Option<&str>) {
    tracing::info!(
        channel = %channel,
        operation = %operation,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "CHANNEL_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
