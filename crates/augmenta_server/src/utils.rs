//! Utility functions and helper methods for the receiver.
//!
//! This module provides convenient factory functions for creating receiver
//! instances with different configurations.

use crate::{config::ServerConfig, server::TrackerServer};

/// Creates a new receiver with default configuration.
///
/// Listens on UDP port 12000 on all interfaces, expecting protocol V2.
///
/// # Example
///
/// ```rust
/// use augmenta_server::create_server;
///
/// let server = create_server();
/// assert_eq!(server.input_port(), 12000);
/// ```
pub fn create_server() -> TrackerServer {
    TrackerServer::new(ServerConfig::default())
}

/// Creates a new receiver with custom configuration.
///
/// # Arguments
///
/// * `config` - A `ServerConfig` instance with desired settings
///
/// # Example
///
/// ```rust
/// use augmenta_server::{create_server_with_config, ServerConfig};
///
/// let config = ServerConfig {
///     input_port: 9000,
///     ..Default::default()
/// };
///
/// let server = create_server_with_config(config);
/// assert_eq!(server.input_port(), 9000);
/// ```
pub fn create_server_with_config(config: ServerConfig) -> TrackerServer {
    TrackerServer::new(config)
}
