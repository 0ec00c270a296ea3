//! # Utility Functions
//!
//! Factory helpers for the event system.

use crate::system::EventSystem;
use std::sync::Arc;

/// Creates a new shareable event system instance.
///
/// The returned event system is fully initialized and ready to accept
/// handler registrations and emissions.
///
/// # Returns
///
/// A new `Arc<EventSystem>` ready for use.
pub fn create_event_system() -> Arc<EventSystem> {
    Arc::new(EventSystem::new())
}
