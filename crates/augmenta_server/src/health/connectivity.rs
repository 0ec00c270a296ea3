//! Connectivity state machine.
//!
//! Tracks whether the input port is bound and whether data is flowing:
//!
//! * `Unbound -> Bound` on a successful bind
//! * `Bound -> Unbound` on bind failure or explicit rebind
//! * `receiving_data` is true while a valid message arrived within the
//!   receive timeout, and decays as the lifecycle clock ticks
//! * while unbound, a reconnect timer asks for a new bind attempt every
//!   reconnect interval; binding resets it

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info};

/// Whether the input port is currently bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    #[default]
    Unbound,
    Bound,
}

/// Snapshot of the receiver's health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: ConnectionState,
    pub receiving_data: bool,
    pub bound_address: Option<SocketAddr>,
}

/// Connectivity state plus the timers driving it.
#[derive(Debug)]
pub struct HealthMonitor {
    state: ConnectionState,
    bound_address: Option<SocketAddr>,
    receiving_data: bool,
    since_last_message: Duration,
    since_last_bind_attempt: Duration,
    receive_timeout: Duration,
    reconnect_interval: Duration,
}

impl HealthMonitor {
    /// Creates an unbound monitor.
    ///
    /// # Arguments
    ///
    /// * `receive_timeout` - How long `receiving_data` stays true after a message
    /// * `reconnect_interval` - Delay between bind attempts while unbound
    pub fn new(receive_timeout: Duration, reconnect_interval: Duration) -> Self {
        Self {
            state: ConnectionState::Unbound,
            bound_address: None,
            receiving_data: false,
            since_last_message: receive_timeout,
            since_last_bind_attempt: Duration::ZERO,
            receive_timeout,
            reconnect_interval,
        }
    }

    pub fn mark_bound(&mut self, address: SocketAddr) {
        if self.state != ConnectionState::Bound {
            info!("🔗 Input bound on {}", address);
        }
        self.state = ConnectionState::Bound;
        self.bound_address = Some(address);
        self.since_last_bind_attempt = Duration::ZERO;
    }

    pub fn mark_unbound(&mut self) {
        if self.state == ConnectionState::Bound {
            debug!("Input unbound");
        }
        self.state = ConnectionState::Unbound;
        self.bound_address = None;
        self.since_last_bind_attempt = Duration::ZERO;
    }

    /// Records a valid incoming message.
    pub fn record_message(&mut self) {
        self.since_last_message = Duration::ZERO;
        self.receiving_data = true;
    }

    /// Advances the timers by `elapsed`.
    ///
    /// # Returns
    ///
    /// `true` if the caller should attempt to bind again.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.since_last_message = self.since_last_message.saturating_add(elapsed);
        self.receiving_data = self.since_last_message <= self.receive_timeout;

        if self.state == ConnectionState::Bound {
            return false;
        }

        self.since_last_bind_attempt += elapsed;
        if self.since_last_bind_attempt > self.reconnect_interval {
            self.since_last_bind_attempt = Duration::ZERO;
            return true;
        }
        false
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_receiving_data(&self) -> bool {
        self.receiving_data
    }

    pub fn status(&self) -> HealthStatus {
        HealthStatus {
            state: self.state,
            receiving_data: self.receiving_data,
            bound_address: self.bound_address,
        }
    }
}
