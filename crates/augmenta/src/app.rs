//! Main application logic and lifecycle management.
//!
//! This module contains the `Application` struct that orchestrates receiver
//! startup, periodic health reporting and shutdown.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    logging::display_banner,
    signals::{shutdown_on_signal, wait_for_stop_signal},
};
use augmenta_event_system::{EventSystem, ShutdownState};
use augmenta_server::{ProtocolVersion, Tracker, TrackerServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Interval between periodic health reports.
const HEALTH_REPORT_INTERVAL: Duration = Duration::from_secs(60);

/// Main application struct.
///
/// The `Application` manages the complete lifecycle of the receiver:
/// configuration loading, server initialization, health reporting and
/// graceful shutdown.
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    /// Receiver instance
    server: TrackerServer,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Display startup banner
    /// 5. Initialize the receiver
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        apply_cli_overrides(&mut config, &args)?;

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        }
        info!("✅ Configuration loaded and validated successfully");

        display_banner(&config);

        Self::from_config(config)
    }

    /// Creates an application from an already validated configuration.
    pub fn from_config(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let server = TrackerServer::new(config.to_server_config()?);
        Ok(Self { config, server })
    }

    pub fn tracker(&self) -> Arc<Tracker> {
        self.server.get_tracker()
    }

    /// Runs the receiver until a termination signal arrives.
    ///
    /// # Monitoring Features
    ///
    /// * **Configuration Summary**: Displays key settings at startup
    /// * **Periodic Health Reports**: Binding, data flow and traffic every 60 seconds
    /// * **Final Statistics**: Summary report during shutdown
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting Augmenta receiver application");
        self.log_configuration_summary();

        let tracker = self.server.get_tracker();
        let events = self.server.get_event_system();

        let shutdown_state = ShutdownState::new();
        let shutdown_state_for_server = shutdown_state.clone();

        let server_handle = {
            let server = self.server;
            tokio::spawn(async move {
                match server.start_with_shutdown_state(shutdown_state_for_server).await {
                    Ok(()) => info!("✅ Receiver completed successfully"),
                    Err(e) => error!("❌ Receiver error: {:?}", e),
                }
            })
        };

        let monitoring_handle = {
            let tracker = tracker.clone();
            let events = events.clone();

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(HEALTH_REPORT_INTERVAL);
                interval.tick().await;
                let mut last_received = 0u64;

                loop {
                    interval.tick().await;
                    last_received = log_health_report(&tracker, &events, last_received);
                }
            })
        };

        info!("✅ Augmenta receiver is now running!");
        info!("🔍 Health monitoring active - report every {}s", HEALTH_REPORT_INTERVAL.as_secs());
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        let signal_shutdown_state = shutdown_on_signal().await?;

        // A second signal skips the graceful path.
        tokio::spawn(async move {
            match wait_for_stop_signal().await {
                Ok(signal) => {
                    warn!("⚡ Second {signal} signal - exiting without releasing objects");
                    std::process::exit(1);
                }
                Err(e) => error!("Failed to listen for a second stop signal: {e}"),
            }
        });

        if signal_shutdown_state.is_shutdown_initiated() {
            shutdown_state.initiate_shutdown();
        }

        info!("🛑 Shutdown signal received, beginning graceful shutdown...");

        info!("📡 Phase 1: Stopping health reports...");
        monitoring_handle.abort();

        info!("⏳ Phase 2: Waiting for the receive loop to release tracked objects...");
        match tokio::time::timeout(Duration::from_secs(5), server_handle).await {
            Ok(_) => info!("✅ Receive loop stopped"),
            Err(_) => warn!("⏰ Receive loop did not stop within timeout, proceeding with shutdown"),
        }
        shutdown_state.complete_shutdown();

        log_final_statistics(&tracker, &events);

        info!("✅ Augmenta receiver shutdown complete");
        Ok(())
    }

    /// Logs the configuration summary at startup.
    fn log_configuration_summary(&self) {
        let receiver = &self.config.receiver;
        let tracking = &self.config.tracking;
        info!("📋 Configuration Summary:");
        info!("  🏷️ Receiver: {}", receiver.name);
        info!("  🌐 Input: {}:{}", receiver.bind_address, receiver.input_port);
        info!("  📜 Protocol: {}", tracking.protocol_version);
        info!(
            "  📐 Pixel size: {} | Scaling: {} | Flip: x={} y={}",
            tracking.pixel_size, tracking.scaling, tracking.flip_x, tracking.flip_y
        );
        info!(
            "  🎯 Desired objects: {:?} (count {})",
            tracking.desired_mode, tracking.desired_count
        );
        info!("  ⏱️ Object timeout: {}s", tracking.object_timeout_secs);
        if tracking.mute {
            warn!("  🔇 Input is muted");
        }
    }
}

/// Applies command-line overrides on top of the loaded configuration.
pub fn apply_cli_overrides(config: &mut AppConfig, args: &CliArgs) -> Result<(), String> {
    if let Some(port) = args.port {
        config.receiver.input_port = port;
    }

    if let Some(protocol) = &args.protocol {
        config.tracking.protocol_version = protocol.parse::<ProtocolVersion>()?;
    }

    if let Some(log_level) = &args.log_level {
        config.logging.level = log_level.clone();
    }

    if args.json_logs {
        config.logging.json_format = true;
    }
    if args.flip_x {
        config.tracking.flip_x = true;
    }
    if args.flip_y {
        config.tracking.flip_y = true;
    }
    if args.mute {
        config.tracking.mute = true;
    }

    Ok(())
}

/// Logs one health report and returns the running message count.
fn log_health_report(tracker: &Tracker, events: &EventSystem, last_received: u64) -> u64 {
    let health = tracker.health();
    let stats = tracker.stats();
    let event_stats = events.get_stats();
    let received_this_period = stats.messages_received.saturating_sub(last_received);

    info!(
        "📊 Receiver Health - {:?} | receiving: {} | {} objects | {} msgs/min | {} handlers",
        health.state,
        health.receiving_data,
        tracker.object_count(),
        received_this_period,
        event_stats.total_handlers
    );

    if stats.decode_errors > 0 {
        warn!("⚠️ {} malformed message(s) dropped so far", stats.decode_errors);
    }
    if event_stats.handler_failures > 0 {
        warn!("⚠️ {} subscriber call(s) failed so far", event_stats.handler_failures);
    }

    stats.messages_received
}

/// Logs final statistics during shutdown.
fn log_final_statistics(tracker: &Tracker, events: &EventSystem) {
    let stats = tracker.stats();
    let event_stats = events.get_stats();
    info!("📊 Final Statistics:");
    info!("  - Messages received: {}", stats.messages_received);
    info!("  - Messages applied: {}", stats.messages_applied);
    info!("  - Messages filtered: {}", stats.messages_ignored);
    info!("  - Messages muted: {}", stats.messages_muted);
    info!("  - Unknown addresses: {}", stats.unknown_addresses);
    info!("  - Decode errors: {}", stats.decode_errors);
    info!("  - Notifications emitted: {}", event_stats.events_emitted);
}
