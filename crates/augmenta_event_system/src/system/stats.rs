/// Statistics tracking for the event system
use serde::{Deserialize, Serialize};

/// Core event system statistics for monitoring
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EventSystemStats {
    /// Total number of registered event handlers
    pub total_handlers: usize,
    /// Total number of notifications emitted since system start
    pub events_emitted: u64,
    /// Total number of handler invocations
    pub handler_invocations: u64,
    /// Handler invocations that returned an error
    pub handler_failures: u64,
}
