// # linefeedd - line feed daemon
//
// Thin integration layer over linefeed-core. It is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Running the LineFeedServer until the peer is gone or a signal arrives
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `LINEFEED_HOST`: Address to bind (default `127.0.0.1`)
// - `LINEFEED_PORT`: Port to bind (default `9999`)
// - `LINEFEED_DELAY_MS`: Pause after each line in milliseconds (default `2000`)
// - `LINEFEED_LOG_LEVEL`: trace, debug, info, warn, error (default `info`)
//
// The payload is the built-in phrase list and is not configurable.
//
// ## Example
//
// ```bash
// export LINEFEED_PORT=9999
// linefeedd &
// nc 127.0.0.1 9999
// ```

use anyhow::{Context, Result};
use linefeed_core::config::{DEFAULT_DELAY_MS, DEFAULT_HOST, DEFAULT_PORT, MAX_DELAY_MS};
use linefeed_core::{LineFeedConfig, LineFeedServer};
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::oneshot;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (bind, accept or write failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinefeedExitCode {
    /// Clean shutdown (signal received)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (the feed stopped on a failure)
    RuntimeError = 2,
}

impl From<LinefeedExitCode> for ExitCode {
    fn from(code: LinefeedExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    host: String,
    port: u16,
    delay_ms: u64,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("LINEFEED_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: parse_var("LINEFEED_PORT", DEFAULT_PORT)?,
            delay_ms: parse_var("LINEFEED_DELAY_MS", DEFAULT_DELAY_MS)?,
            log_level: env::var("LINEFEED_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            anyhow::bail!(
                "LINEFEED_HOST cannot be empty. \
                Unset it to listen on {}",
                DEFAULT_HOST
            );
        }

        if !(1..=MAX_DELAY_MS).contains(&self.delay_ms) {
            anyhow::bail!(
                "LINEFEED_DELAY_MS must be between 1 and {} milliseconds. Got: {}",
                MAX_DELAY_MS,
                self.delay_ms
            );
        }

        // Validate log level
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "LINEFEED_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Build the core configuration
    fn to_feed_config(&self) -> LineFeedConfig {
        LineFeedConfig::new()
            .with_addr(self.host.clone(), self.port)
            .with_delay(std::time::Duration::from_millis(self.delay_ms))
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Read and parse `name`, falling back to `default` when unset
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: '{}'", name, value)),
        Err(_) => Ok(default),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return LinefeedExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return LinefeedExitCode::ConfigError.into();
    }

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return LinefeedExitCode::ConfigError.into();
    }

    info!("Starting linefeedd");

    // One thread of control: accept, then write and wait
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return LinefeedExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> LinefeedExitCode {
    let shutdown = match shutdown_signal() {
        Ok(shutdown) => shutdown,
        Err(e) => {
            error!("Failed to install signal handlers: {:#}", e);
            return LinefeedExitCode::ConfigError;
        }
    };

    run_feed(&config, shutdown).await
}

/// Run the feed until it stops and map the outcome to an exit code
async fn run_feed(
    config: &Config,
    shutdown: Option<oneshot::Receiver<()>>,
) -> LinefeedExitCode {
    let (mut server, events) = match LineFeedServer::new(config.to_feed_config()) {
        Ok(server) => server,
        Err(e) => {
            error!("Invalid feed configuration: {}", e);
            return LinefeedExitCode::ConfigError;
        }
    };
    // Logging already covers every event; with the receiver gone they are skipped
    drop(events);

    info!(
        "Streaming {} phrase(s), one every {} ms",
        server.config().phrases.len(),
        config.delay_ms
    );

    match server.run_with_shutdown(shutdown).await {
        Ok(summary) => {
            info!(
                "Shutting down after {} line(s) ({})",
                summary.lines_sent, summary.reason
            );
            LinefeedExitCode::CleanShutdown
        }
        Err(e) => {
            error!("Feed stopped: {}", e);
            LinefeedExitCode::RuntimeError
        }
    }
}

/// Shutdown trigger for SIGTERM and SIGINT
///
/// The handlers are registered here, before the server starts, so a signal
/// arriving while waiting for the peer is not lost. The returned receiver
/// fires on the first of the two.
#[cfg(unix)]
fn shutdown_signal() -> Result<Option<oneshot::Receiver<()>>> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
        let _ = tx.send(());
    });

    Ok(Some(rx))
}

/// Shutdown trigger (Ctrl-C only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<Option<oneshot::Receiver<()>>> {
    Ok(None)
}
