/// Event emission methods
use crate::events::Notification;
use super::core::EventSystem;
use tracing::{trace, warn};

impl EventSystem {
    /// Delivers a notification to every subscriber of its kind.
    ///
    /// Subscribers run synchronously, in registration order, before this
    /// returns. The subscriber list is snapshotted first, so a handler may
    /// subscribe, unsubscribe or emit again without deadlocking. A failing
    /// handler is logged and counted; the remaining handlers still run.
    ///
    /// # Returns
    ///
    /// The number of handlers that were invoked.
    pub fn emit(&self, notification: &Notification) -> usize {
        let kind = notification.kind();
        let subscribers = self
            .handlers
            .get(&kind)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        if subscribers.is_empty() {
            trace!("No handlers for {}", kind);
        }

        let mut failures = 0u64;
        for (_, handler) in subscribers.iter() {
            if let Err(e) = handler.handle(notification) {
                failures += 1;
                warn!("❌ Handler {} failed on {}: {}", handler.handler_name(), kind, e);
            }
        }

        let mut stats = self.stats.write();
        stats.events_emitted += 1;
        stats.handler_invocations += subscribers.len() as u64;
        stats.handler_failures += failures;

        subscribers.len()
    }

    /// Delivers a batch of notifications in order.
    pub fn emit_all<'a, I>(&self, notifications: I)
    where
        I: IntoIterator<Item = &'a Notification>,
    {
        for notification in notifications {
            self.emit(notification);
        }
    }
}
