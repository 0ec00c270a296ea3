//! Logging setup for the receiver.
//!
//! The configured level applies to the receiver's own crates and every other
//! crate logs at `warn`. `RUST_LOG` replaces the whole filter when set.

use crate::config::{AppConfig, LoggingSettings};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Crates whose output follows the configured level.
const RECEIVER_TARGETS: [&str; 3] = ["lib_augmenta", "augmenta_server", "augmenta_event_system"];

/// Output format of the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored, human-readable lines
    Pretty,
    /// One JSON object per line, for log shippers
    Json,
}

impl LogFormat {
    /// JSON wins if either the config file or the command line asks for it.
    pub fn resolve(config: &LoggingSettings, json_override: bool) -> Self {
        if json_override || config.json_format {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Filter directives for a configured level, e.g.
/// `warn,lib_augmenta=debug,augmenta_server=debug,augmenta_event_system=debug`.
pub fn receiver_directives(level: &str) -> String {
    let mut directives = String::from("warn");
    for target in RECEIVER_TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

fn build_filter(config: &LoggingSettings) -> Result<EnvFilter, Box<dyn std::error::Error>> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(receiver_directives(&config.level))?),
    }
}

/// Installs the global tracing subscriber.
///
/// Fails if the level does not parse or a subscriber is already installed.
pub fn setup_logging(
    config: &LoggingSettings,
    json_format: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    match LogFormat::resolve(config, json_format) {
        LogFormat::Json => {
            registry
                .with(fmt::layer()
                    .json()
                    .with_file(false)
                    .with_line_number(false)
                    .with_target(true)
                )
                .try_init()?;
        }
        LogFormat::Pretty => {
            registry
                .with(fmt::layer()
                    .with_ansi(true)
                    .with_file(false)
                    .with_line_number(false)
                    .with_target(false)
                )
                .try_init()?;
        }
    }

    info!("🔧 Logging initialized at '{}' for the receiver crates", config.level);
    Ok(())
}

/// Logs the startup banner with the endpoint the receiver listens on.
pub fn display_banner(config: &AppConfig) {
    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("UNK");
    info!("╔══════════════════════════════════════════╗");
    info!("║          📡 AUGMENTA RECEIVER 📡         ║");
    info!("║                 v{:<24}║", version);
    info!("╚══════════════════════════════════════════╝");
    info!(
        "📡 '{}' listening for protocol {} on {}:{}",
        config.receiver.name,
        config.tracking.protocol_version,
        config.receiver.bind_address,
        config.receiver.input_port
    );
}
