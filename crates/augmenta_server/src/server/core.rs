//! Core receiver implementation.
//!
//! This module contains the main `TrackerServer` struct, which owns the
//! message transport, drives the lifecycle clock and feeds every received
//! message to the [`Tracker`].

use crate::{
    config::ServerConfig,
    error::{ServerError, TransportError},
    protocol::OscMessage,
    server::handlers::Tracker,
    transport::{MessageTransport, TransportReceiver, UdpOscTransport},
};
use augmenta_event_system::{create_event_system, EventSystem, ShutdownState};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// The Augmenta receiver.
///
/// `TrackerServer` binds the input port through its [`MessageTransport`],
/// runs a single loop that multiplexes incoming datagrams, clock ticks, port
/// changes and shutdown, and routes everything through one [`Tracker`].
///
/// # Architecture
///
/// * **Transport**: explicitly owned, rebound on port change or after a failure
/// * **Tracker**: single writer for registry, scene and health state
/// * **Event System**: synchronous fan-out of notifications to subscribers
/// * **Lifecycle Clock**: periodic tick driving expiry, health decay and reconnects
pub struct TrackerServer {
    /// Server configuration settings
    config: ServerConfig,

    /// Tracking core shared with the application
    tracker: Arc<Tracker>,

    /// Transport used to bind the input port
    transport: Arc<dyn MessageTransport>,

    /// Current input port; changes trigger a rebind
    port_sender: watch::Sender<u16>,

    /// Channel for coordinating server shutdown
    shutdown_sender: broadcast::Sender<()>,
}

impl TrackerServer {
    /// Creates a receiver bound over UDP on the configured interface.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration parameters for receiver behavior
    pub fn new(config: ServerConfig) -> Self {
        let transport = Arc::new(UdpOscTransport::new(config.bind_ip));
        Self::with_transport(config, transport)
    }

    /// Creates a receiver using a custom transport.
    pub fn with_transport(config: ServerConfig, transport: Arc<dyn MessageTransport>) -> Self {
        let events = create_event_system();
        let tracker = Arc::new(Tracker::new(
            config.tracking.clone(),
            events,
            config.receive_timeout(),
            config.reconnect_interval(),
        ));
        let (port_sender, _) = watch::channel(config.input_port);
        let (shutdown_sender, _) = broadcast::channel(1);

        Self {
            config,
            tracker,
            transport,
            port_sender,
            shutdown_sender,
        }
    }

    /// Starts the receiver with graceful shutdown support.
    ///
    /// Runs until shutdown is initiated through `shutdown_state` or
    /// [`TrackerServer::shutdown`] is called.
    ///
    /// # Startup Sequence
    ///
    /// 1. Validate the timing configuration
    /// 2. Register core logging subscribers
    /// 3. Bind the input port (a failure is logged and retried later)
    /// 4. Multiplex datagrams, ticks, port changes and shutdown until stopped
    /// 5. Release every tracked object
    ///
    /// # Returns
    ///
    /// `Ok(())` if the receiver started and stopped cleanly, or
    /// [`ServerError::InvalidConfig`] if the configuration cannot drive the loop.
    pub async fn start_with_shutdown_state(&self, shutdown_state: ShutdownState) -> Result<(), ServerError> {
        self.start_internal(Some(shutdown_state)).await
    }

    /// Starts the receiver and runs until [`TrackerServer::shutdown`] is called.
    pub async fn start(&self) -> Result<(), ServerError> {
        self.start_internal(None).await
    }

    /// Internal method for starting the server with optional shutdown state.
    async fn start_internal(&self, shutdown_state: Option<ShutdownState>) -> Result<(), ServerError> {
        if let Err(e) = self.config.validate() {
            error!("❌ Refusing to start receiver '{}': {e}", self.config.receiver_name);
            return Err(e);
        }

        let mut shutdown_receiver = self.shutdown_sender.subscribe();
        let mut port_receiver = self.port_sender.subscribe();
        let mut port = *port_receiver.borrow_and_update();

        info!(
            "🚀 Starting Augmenta receiver '{}' on {}:{} (protocol {})",
            self.config.receiver_name,
            self.config.bind_ip,
            port,
            self.tracker.settings().protocol_version
        );

        self.register_core_handlers();

        let mut receiver = self.try_bind(port).await;

        let tick_interval = Duration::from_millis(self.config.tick_interval_ms);
        let mut ticker = interval(tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();
        info!("🕒 Lifecycle clock started with interval: {}ms", tick_interval.as_millis());

        let external_shutdown = async {
            match &shutdown_state {
                Some(state) => state.wait().await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(external_shutdown);

        loop {
            tokio::select! {
                _ = &mut external_shutdown => {
                    info!("🛑 Receive loop stopping - shutdown initiated");
                    break;
                }
                _ = shutdown_receiver.recv() => {
                    info!("Internal shutdown signal received");
                    break;
                }
                changed = port_receiver.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    port = *port_receiver.borrow_and_update();
                    info!("🔁 Rebinding input to port {}", port);
                    drop(receiver.take());
                    self.tracker.mark_unbound();
                    receiver = self.try_bind(port).await;
                }
                _ = ticker.tick() => {
                    let now = Instant::now();
                    let elapsed = now.duration_since(last_tick);
                    last_tick = now;

                    if self.tracker.tick(elapsed) && receiver.is_none() {
                        debug!("Retrying bind on port {}", port);
                        receiver = self.try_bind(port).await;
                    }
                }
                result = next_datagram(&mut receiver) => {
                    match result {
                        Ok(messages) => {
                            for message in &messages {
                                self.tracker.handle_message(message);
                            }
                        }
                        Err(TransportError::Osc { from, source }) => {
                            warn!("⚠️ Dropping malformed datagram from {}: {}", from, source);
                        }
                        Err(e) => {
                            error!("❌ Receive failed on port {}: {}", port, e);
                            receiver = None;
                            self.tracker.mark_unbound();
                        }
                    }
                }
            }
        }

        info!("🧹 Performing receiver cleanup...");
        drop(receiver);
        self.tracker.mark_unbound();
        let released = self.tracker.remove_all();
        info!("✅ Receiver cleanup completed ({} object(s) released)", released);

        Ok(())
    }

    async fn try_bind(&self, port: u16) -> Option<Box<dyn TransportReceiver>> {
        match self.transport.bind(port).await {
            Ok(receiver) => {
                self.tracker.mark_bound(receiver.local_addr());
                Some(receiver)
            }
            Err(e) => {
                error!(
                    "❌ {} - retrying every {}s",
                    e, self.config.reconnect_interval_secs
                );
                self.tracker.mark_unbound();
                None
            }
        }
    }

    /// Registers core logging subscribers.
    ///
    /// These provide visibility only; consumers register their own handlers
    /// through [`TrackerServer::get_event_system`].
    fn register_core_handlers(&self) {
        let events = self.tracker.events();

        events.on_object_enter("core::log_enter", |object, channel| {
            debug!("👋 Object {} (oid {}) entered on {:?}", object.id, object.oid, channel);
            Ok(())
        });

        events.on_object_leave("core::log_leave", |object, channel| {
            debug!("👋 Object {} (oid {}) left on {:?}", object.id, object.oid, channel);
            Ok(())
        });

        events.on_scene_updated("core::log_scene", |scene| {
            debug!(
                "🌍 Scene {}x{}m, {} object(s) reported",
                scene.width, scene.height, scene.reported_object_count
            );
            Ok(())
        });

        events.on_output_updated("core::log_output", |output| {
            debug!(
                "🖥️ Output offset {:?}, {:?}m, {:?}px",
                output.offset, output.size_in_meters, output.size_in_pixels
            );
            Ok(())
        });
    }

    /// Changes the input port. The running loop rebinds immediately.
    pub fn rebind(&self, port: u16) {
        self.port_sender.send_replace(port);
    }

    /// Current configured input port.
    pub fn input_port(&self) -> u16 {
        *self.port_sender.borrow()
    }

    /// Initiates server shutdown.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the shutdown signal was sent successfully.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        info!("🛑 Shutting down receiver...");
        let _ = self.shutdown_sender.send(());
        Ok(())
    }

    /// Gets a reference to the event system.
    pub fn get_event_system(&self) -> Arc<EventSystem> {
        self.tracker.events()
    }

    /// Gets the tracking core.
    pub fn get_tracker(&self) -> Arc<Tracker> {
        self.tracker.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Waits for the next datagram, or forever while unbound.
async fn next_datagram(
    receiver: &mut Option<Box<dyn TransportReceiver>>,
) -> Result<Vec<OscMessage>, TransportError> {
    match receiver {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}
