//! # Notifications and Handlers
//!
//! Outbound notifications raised by the object registry and the scene/output
//! state, plus the handler abstraction subscribers implement.
//!
//! ## Notification Kinds
//!
//! - **Object lifecycle**: [`NotificationKind::ObjectEnter`], [`NotificationKind::ObjectUpdate`],
//!   [`NotificationKind::ObjectLeave`], each carrying the object snapshot and the data channel
//! - **Scene**: [`NotificationKind::SceneUpdated`] with the new scene geometry
//! - **Output**: [`NotificationKind::OutputUpdated`] with the new fusion geometry
//!
//! Handlers are synchronous. Every subscriber of a notification has run by the
//! time [`crate::EventSystem::emit`] returns.

use crate::types::{DataChannel, OutputState, SceneState, TrackedObject};
use serde::Serialize;
use std::fmt::Debug;

/// Discriminant of a [`Notification`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NotificationKind {
    ObjectEnter,
    ObjectUpdate,
    ObjectLeave,
    SceneUpdated,
    OutputUpdated,
}

impl NotificationKind {
    /// All kinds, in declaration order.
    pub const ALL: [NotificationKind; 5] = [
        NotificationKind::ObjectEnter,
        NotificationKind::ObjectUpdate,
        NotificationKind::ObjectLeave,
        NotificationKind::SceneUpdated,
        NotificationKind::OutputUpdated,
    ];

    /// Short name for log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ObjectEnter => "object_enter",
            NotificationKind::ObjectUpdate => "object_update",
            NotificationKind::ObjectLeave => "object_leave",
            NotificationKind::SceneUpdated => "scene_updated",
            NotificationKind::OutputUpdated => "output_updated",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle or geometry change, delivered to subscribers.
///
/// Object notifications carry a snapshot of the object as it was when the
/// notification was raised. For [`Notification::ObjectLeave`] this is the
/// last known state before removal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    ObjectEnter {
        object: TrackedObject,
        channel: DataChannel,
    },
    ObjectUpdate {
        object: TrackedObject,
        channel: DataChannel,
    },
    ObjectLeave {
        object: TrackedObject,
        channel: DataChannel,
    },
    SceneUpdated(SceneState),
    OutputUpdated(OutputState),
}

impl Notification {
    /// Returns the subscription key for this notification.
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::ObjectEnter { .. } => NotificationKind::ObjectEnter,
            Notification::ObjectUpdate { .. } => NotificationKind::ObjectUpdate,
            Notification::ObjectLeave { .. } => NotificationKind::ObjectLeave,
            Notification::SceneUpdated(_) => NotificationKind::SceneUpdated,
            Notification::OutputUpdated(_) => NotificationKind::OutputUpdated,
        }
    }

    /// Returns the object and channel for object notifications.
    pub fn object(&self) -> Option<(&TrackedObject, DataChannel)> {
        match self {
            Notification::ObjectEnter { object, channel }
            | Notification::ObjectUpdate { object, channel }
            | Notification::ObjectLeave { object, channel } => Some((object, *channel)),
            _ => None,
        }
    }
}

/// Trait implemented by every subscriber registered with the event system.
///
/// Implementations must not block: handlers run inline on the thread that
/// raised the notification.
pub trait EventHandler: Send + Sync + 'static + Debug {
    /// Handles one notification.
    ///
    /// # Arguments
    ///
    /// * `notification` - The notification being dispatched
    ///
    /// # Returns
    ///
    /// Returns `Ok(())` if the notification was handled successfully, or
    /// `Err(EventError)` if handling failed. A failure is logged and counted
    /// but never stops delivery to the remaining subscribers.
    fn handle(&self, notification: &Notification) -> Result<(), EventError>;

    /// Returns a human-readable name for this handler for debugging.
    fn handler_name(&self) -> &str;
}

/// Closure-backed handler with a debug name.
pub struct FnEventHandler<F>
where
    F: Fn(&Notification) -> Result<(), EventError> + Send + Sync + 'static,
{
    handler: F,
    name: String,
}

impl<F> FnEventHandler<F>
where
    F: Fn(&Notification) -> Result<(), EventError> + Send + Sync + 'static,
{
    /// Creates a new handler.
    ///
    /// # Arguments
    ///
    /// * `name` - Human-readable name for debugging
    /// * `handler` - Function invoked for each notification
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            handler,
            name: name.into(),
        }
    }
}

impl<F> Debug for FnEventHandler<F>
where
    F: Fn(&Notification) -> Result<(), EventError> + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEventHandler")
            .field("name", &self.name)
            .finish()
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&Notification) -> Result<(), EventError> + Send + Sync + 'static,
{
    fn handle(&self, notification: &Notification) -> Result<(), EventError> {
        (self.handler)(notification)
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

/// Errors raised by subscribers and the event system.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Handler execution failed during notification processing
    #[error("Handler execution error: {0}")]
    HandlerExecution(String),
    /// A subscriber was registered for a kind it cannot receive
    #[error("Invalid subscription: {0}")]
    InvalidSubscription(String),
}
