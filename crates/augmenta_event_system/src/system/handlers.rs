/// Event handler registration methods
use crate::events::{EventError, EventHandler, FnEventHandler, Notification, NotificationKind};
use crate::types::{DataChannel, OutputState, SceneState, TrackedObject};
use super::core::{EventSystem, SubscriptionId};
use std::sync::Arc;
use tracing::{debug, info};

impl EventSystem {
    /// Registers a handler for objects entering the tracked set.
    ///
    /// Fires on the first applied enter or update for an unseen id.
    ///
    /// # Arguments
    ///
    /// * `name` - Handler name used in logs and diagnostics
    /// * `handler` - Function receiving the new object and the channel that created it
    ///
    /// # Examples
    ///
    /// ```rust
    /// use augmenta_event_system::EventSystem;
    ///
    /// let events = EventSystem::new();
    /// events.on_object_enter("spawn_proxy", |object, _channel| {
    ///     println!("object {} entered at {:?}", object.id, object.centroid);
    ///     Ok(())
    /// });
    /// ```
    pub fn on_object_enter<F>(&self, name: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&TrackedObject, DataChannel) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.register_object_handler(NotificationKind::ObjectEnter, name, handler)
    }

    /// Registers a handler for updates to already tracked objects.
    pub fn on_object_update<F>(&self, name: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&TrackedObject, DataChannel) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.register_object_handler(NotificationKind::ObjectUpdate, name, handler)
    }

    /// Registers a handler for objects leaving, either explicitly or by expiry.
    ///
    /// The object passed in is the last known state before removal.
    pub fn on_object_leave<F>(&self, name: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&TrackedObject, DataChannel) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.register_object_handler(NotificationKind::ObjectLeave, name, handler)
    }

    /// Registers a handler for scene geometry changes.
    pub fn on_scene_updated<F>(&self, name: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&SceneState) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.subscribe(
            NotificationKind::SceneUpdated,
            Arc::new(FnEventHandler::new(name, move |notification: &Notification| {
                match notification {
                    Notification::SceneUpdated(scene) => handler(scene),
                    _ => Ok(()),
                }
            })),
        )
    }

    /// Registers a handler for output (fusion) geometry changes.
    pub fn on_output_updated<F>(&self, name: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&OutputState) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.subscribe(
            NotificationKind::OutputUpdated,
            Arc::new(FnEventHandler::new(name, move |notification: &Notification| {
                match notification {
                    Notification::OutputUpdated(output) => handler(output),
                    _ => Ok(()),
                }
            })),
        )
    }

    /// Registers an arbitrary handler for one notification kind.
    ///
    /// Handlers for the same kind run in registration order.
    ///
    /// # Returns
    ///
    /// The handle to pass to [`EventSystem::unsubscribe`].
    pub fn subscribe(&self, kind: NotificationKind, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        let id = SubscriptionId::new();
        let name = handler.handler_name().to_string();

        self.handlers
            .entry(kind)
            .or_insert_with(Vec::new)
            .push((id, handler));

        self.stats.write().total_handlers += 1;

        info!("📝 Registered handler '{}' for {}", name, kind);
        id
    }

    /// Removes a previously registered handler.
    ///
    /// # Returns
    ///
    /// `true` if the subscription existed and was removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut removed = false;

        for mut entry in self.handlers.iter_mut() {
            let before = entry.value().len();
            entry.value_mut().retain(|(sub_id, _)| *sub_id != id);
            if entry.value().len() != before {
                removed = true;
                debug!("🗑️ Removed subscription {} from {}", id, entry.key());
                break;
            }
        }

        if removed {
            let mut stats = self.stats.write();
            stats.total_handlers = stats.total_handlers.saturating_sub(1);
        }
        removed
    }

    /// Removes every handler of every kind.
    pub fn clear_handlers(&self) {
        self.handlers.clear();
        self.stats.write().total_handlers = 0;
    }

    fn register_object_handler<F>(&self, kind: NotificationKind, name: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&TrackedObject, DataChannel) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.subscribe(
            kind,
            Arc::new(FnEventHandler::new(name, move |notification: &Notification| {
                match notification.object() {
                    Some((object, channel)) => handler(object, channel),
                    None => Err(EventError::InvalidSubscription(format!(
                        "{} delivered to an object handler",
                        notification.kind()
                    ))),
                }
            })),
        )
    }
}
