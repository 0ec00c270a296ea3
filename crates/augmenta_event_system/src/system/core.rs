/// Core EventSystem implementation
use crate::events::{EventHandler, NotificationKind};
use super::stats::EventSystemStats;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Opaque handle returned by every subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    /// Creates a new random subscription id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered handler together with its subscription handle.
pub(super) type Subscriber = (SubscriptionId, Arc<dyn EventHandler>);

/// The core event system that routes notifications to subscribers.
///
/// This is the central hub between the tracking core and its consumers. Each
/// notification kind owns an ordered list of subscribers. Delivery is
/// synchronous and follows registration order.
///
/// Uses DashMap for concurrent access to the subscriber lists, so registration
/// from one thread never waits on delivery happening on another.
pub struct EventSystem {
    /// Subscribers keyed by notification kind, in registration order
    pub(super) handlers: DashMap<NotificationKind, Vec<Subscriber>>,
    /// System statistics for monitoring
    pub(super) stats: RwLock<EventSystemStats>,
}

impl std::fmt::Debug for EventSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSystem")
            .field("handlers", &"[handlers]")
            .field("stats", &*self.stats.read())
            .finish()
    }
}

impl EventSystem {
    /// Creates a new event system with no registered handlers.
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
            stats: RwLock::new(EventSystemStats::default()),
        }
    }

    /// Gets the current event system statistics
    #[inline]
    pub fn get_stats(&self) -> EventSystemStats {
        self.stats.read().clone()
    }

    /// Number of subscribers registered for one notification kind.
    pub fn handler_count(&self, kind: NotificationKind) -> usize {
        self.handlers.get(&kind).map(|list| list.len()).unwrap_or(0)
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}
