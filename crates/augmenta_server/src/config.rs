//! Receiver configuration types and defaults.
//!
//! This module contains the receiver configuration structure and default
//! values used to initialize and customize the receiver behavior.

use crate::error::ServerError;
use crate::tracking::TrackerSettings;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Configuration structure for the receiver.
///
/// Contains the network settings, lifecycle clock timing and the initial
/// tracking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name used in log output to tell several receivers apart
    pub receiver_name: String,

    /// Interface the input socket binds to
    pub bind_ip: IpAddr,

    /// UDP port Augmenta data arrives on
    pub input_port: u16,

    /// Lifecycle clock interval in milliseconds
    pub tick_interval_ms: u64,

    /// Seconds between bind attempts while unbound
    pub reconnect_interval_secs: f32,

    /// Seconds after the last message before data counts as no longer flowing
    pub receive_timeout_secs: f32,

    /// Initial tracking settings
    pub tracking: TrackerSettings,
}

impl ServerConfig {
    /// Rejects timing values the receive loop cannot run with.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.tick_interval_ms == 0 {
            return Err(ServerError::InvalidConfig(
                "tick_interval_ms must be greater than 0".to_string(),
            ));
        }
        for (name, secs) in [
            ("reconnect_interval_secs", self.reconnect_interval_secs),
            ("receive_timeout_secs", self.receive_timeout_secs),
        ] {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(ServerError::InvalidConfig(format!(
                    "{name} must be a positive number of seconds, got {secs}"
                )));
            }
        }
        Ok(())
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::try_from_secs_f32(self.receive_timeout_secs).unwrap_or(Duration::from_secs(2))
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::try_from_secs_f32(self.reconnect_interval_secs).unwrap_or(Duration::from_secs(5))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            receiver_name: "augmenta".to_string(),
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            input_port: 12000,
            tick_interval_ms: 20, // 50 ticks per second by default
            reconnect_interval_secs: 5.0,
            receive_timeout_secs: 2.0,
            tracking: TrackerSettings::default(),
        }
    }
}
