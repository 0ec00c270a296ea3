//! Connectivity and data-flow health of the receiver.

pub mod connectivity;

pub use connectivity::{ConnectionState, HealthMonitor, HealthStatus};
