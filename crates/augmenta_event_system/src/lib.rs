//! # Augmenta Event System
//!
//! Data model and synchronous event dispatch for receivers of the Augmenta
//! tracking protocol. The receiver core mutates its registry, then hands the
//! resulting [`Notification`]s to an [`EventSystem`], which fans them out to
//! subscribers in registration order.
//!
//! ## Core Features
//!
//! - **Plain data**: [`TrackedObject`], [`SceneState`] and [`OutputState`] hold raw protocol
//!   values, with helpers to derive world-space placement
//! - **Typed subscriptions**: one registration method per notification kind, each returning
//!   a [`SubscriptionId`] for later removal
//! - **Re-entrant delivery**: subscribers may subscribe, unsubscribe or emit from inside a handler
//! - **Behaviours**: [`ObjectBehaviour`] spawn/destroy hooks wired to enter/leave
//!
//! ## Quick Start Example
//!
//! ```rust
//! use augmenta_event_system::*;
//!
//! let events = create_event_system();
//! events.on_object_enter("log_enter", |object, channel| {
//!     println!("object {} entered on {:?}", object.id, channel);
//!     Ok(())
//! });
//!
//! events.emit(&Notification::ObjectEnter {
//!     object: TrackedObject::new(1, 0),
//!     channel: DataChannel::Main,
//! });
//! ```

pub mod behaviour;
pub mod events;
pub mod shutdown;
pub mod system;
pub mod types;
pub mod utils;

pub use behaviour::{attach_behaviour, BehaviourSubscription, ObjectBehaviour};
pub use events::{EventError, EventHandler, FnEventHandler, Notification, NotificationKind};
pub use shutdown::ShutdownState;
pub use system::{EventSystem, EventSystemStats, SubscriptionId};
pub use types::*;
pub use utils::create_event_system;
