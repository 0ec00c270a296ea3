//! Message handling and the lifecycle clock.
//!
//! [`Tracker`] is the single writer for all tracking state. Incoming messages
//! and clock ticks both go through it. State is mutated under one short-lived
//! lock and the resulting notifications are dispatched after the lock is
//! released, so subscribers are free to call back into the tracker.

use crate::error::DecodeError;
use crate::health::{HealthMonitor, HealthStatus};
use crate::protocol::{decode, OscMessage, ProtocolEvent};
use crate::tracking::{ObjectRegistry, TrackerSettings, WorldState};
use augmenta_event_system::{EventSystem, Notification, ObjectId, OutputState, SceneState, TrackedObject};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};

/// What happened to one incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Dropped before decoding because input is muted
    Muted,
    /// Address not part of the configured protocol version
    Unknown,
    /// Arguments did not match the address layout
    Rejected,
    /// Decoded, but filtered out or referring to an unknown id
    Ignored,
    /// Applied and dispatched
    Applied,
}

/// Counters for incoming traffic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerStats {
    pub messages_received: u64,
    pub messages_applied: u64,
    pub messages_ignored: u64,
    pub messages_muted: u64,
    pub unknown_addresses: u64,
    pub decode_errors: u64,
}

#[derive(Debug, Default)]
struct AtomicStats {
    received: AtomicU64,
    applied: AtomicU64,
    ignored: AtomicU64,
    muted: AtomicU64,
    unknown: AtomicU64,
    decode_errors: AtomicU64,
}

#[derive(Debug)]
struct TrackingState {
    registry: ObjectRegistry,
    world: WorldState,
    health: HealthMonitor,
}

/// The tracking core: decoder, registry, scene state and health in one place.
pub struct Tracker {
    settings: RwLock<TrackerSettings>,
    state: Mutex<TrackingState>,
    events: Arc<EventSystem>,
    stats: AtomicStats,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("settings", &*self.settings.read())
            .field("objects", &self.state.lock().registry.len())
            .finish()
    }
}

impl Tracker {
    /// Creates a tracker dispatching to `events`.
    ///
    /// # Arguments
    ///
    /// * `settings` - Initial tracking settings
    /// * `events` - Event system receiving every notification
    /// * `receive_timeout` - How long data counts as flowing after a message
    /// * `reconnect_interval` - Delay between bind attempts while unbound
    pub fn new(
        settings: TrackerSettings,
        events: Arc<EventSystem>,
        receive_timeout: Duration,
        reconnect_interval: Duration,
    ) -> Self {
        Self {
            settings: RwLock::new(settings),
            state: Mutex::new(TrackingState {
                registry: ObjectRegistry::new(),
                world: WorldState::new(),
                health: HealthMonitor::new(receive_timeout, reconnect_interval),
            }),
            events,
            stats: AtomicStats::default(),
        }
    }

    /// Processes one incoming message.
    ///
    /// The mute switch is checked before decoding. Decode failures are
    /// logged and counted, never propagated: one bad message must not stop
    /// ingestion.
    pub fn handle_message(&self, message: &OscMessage) -> MessageOutcome {
        self.stats.received.fetch_add(1, Ordering::Relaxed);
        let settings = self.settings.read().clone();

        if settings.mute {
            self.stats.muted.fetch_add(1, Ordering::Relaxed);
            return MessageOutcome::Muted;
        }

        let decoded = match decode(settings.protocol_version, &message.address, &message.args) {
            Ok(decoded) => decoded,
            Err(e) => {
                self.record_decode_error(&e);
                return MessageOutcome::Rejected;
            }
        };

        let Some(mut event) = decoded else {
            trace!("Ignoring unknown address {}", message.address);
            self.stats.unknown.fetch_add(1, Ordering::Relaxed);
            self.state.lock().health.record_message();
            return MessageOutcome::Unknown;
        };

        settings.mirror().apply(&mut event);

        let notification = {
            let mut state = self.state.lock();
            state.health.record_message();
            apply(&mut state, &event, &settings)
        };

        match notification {
            Some(notification) => {
                self.stats.applied.fetch_add(1, Ordering::Relaxed);
                self.events.emit(&notification);
                MessageOutcome::Applied
            }
            None => {
                self.stats.ignored.fetch_add(1, Ordering::Relaxed);
                MessageOutcome::Ignored
            }
        }
    }

    /// Advances the lifecycle clock.
    ///
    /// Ages every object by `elapsed`, expires objects past the timeout and
    /// updates health timers.
    ///
    /// # Returns
    ///
    /// `true` if the transport should try to bind again.
    pub fn tick(&self, elapsed: Duration) -> bool {
        let timeout = self.settings.read().object_timeout_secs;
        let (expired, retry_bind) = {
            let mut state = self.state.lock();
            let expired = state
                .registry
                .sweep_expired(timeout, elapsed.as_secs_f32());
            let retry_bind = state.health.tick(elapsed);
            (expired, retry_bind)
        };

        for notification in &expired {
            if let Some((object, _)) = notification.object() {
                trace!("⏱️ Object {} expired after {:.2}s", object.id, object.inactive_time);
            }
        }
        self.events.emit_all(&expired);
        retry_bind
    }

    /// Removes every tracked object, dispatching a leave for each.
    pub fn remove_all(&self) -> usize {
        let leaves = self.state.lock().registry.remove_all();
        self.events.emit_all(&leaves);
        leaves.len()
    }

    pub fn mark_bound(&self, address: SocketAddr) {
        self.state.lock().health.mark_bound(address);
    }

    pub fn mark_unbound(&self) {
        self.state.lock().health.mark_unbound();
    }

    /// Snapshot of every tracked object, ascending by id.
    pub fn objects(&self) -> Vec<TrackedObject> {
        self.state.lock().registry.iter().cloned().collect()
    }

    pub fn object(&self, id: ObjectId) -> Option<TrackedObject> {
        self.state.lock().registry.get(id).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.state.lock().registry.len()
    }

    pub fn scene(&self) -> SceneState {
        self.state.lock().world.scene
    }

    pub fn output(&self) -> OutputState {
        self.state.lock().world.output
    }

    pub fn health(&self) -> HealthStatus {
        self.state.lock().health.status()
    }

    pub fn settings(&self) -> TrackerSettings {
        self.settings.read().clone()
    }

    /// Replaces the tracking settings.
    pub fn update_settings(&self, settings: TrackerSettings) {
        *self.settings.write() = settings;
    }

    pub fn events(&self) -> Arc<EventSystem> {
        self.events.clone()
    }

    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            messages_received: self.stats.received.load(Ordering::Relaxed),
            messages_applied: self.stats.applied.load(Ordering::Relaxed),
            messages_ignored: self.stats.ignored.load(Ordering::Relaxed),
            messages_muted: self.stats.muted.load(Ordering::Relaxed),
            unknown_addresses: self.stats.unknown.load(Ordering::Relaxed),
            decode_errors: self.stats.decode_errors.load(Ordering::Relaxed),
        }
    }

    fn record_decode_error(&self, error: &DecodeError) {
        self.stats.decode_errors.fetch_add(1, Ordering::Relaxed);
        warn!("⚠️ Dropping malformed message: {}", error);
    }
}

fn apply(
    state: &mut TrackingState,
    event: &ProtocolEvent,
    settings: &TrackerSettings,
) -> Option<Notification> {
    match event {
        ProtocolEvent::SceneUpdate { .. } | ProtocolEvent::OutputUpdate(_) => {
            state.world.apply_event(event, settings.pixel_size)
        }
        _ => {
            let desired = settings.desired();
            let reported = state.world.scene.reported_object_count;
            state
                .registry
                .apply_event(event, |oid| desired.is_desired(oid, reported))
        }
    }
}
