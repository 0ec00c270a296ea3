//! # Augmenta Server - Tracking Protocol Receiver
//!
//! Receives Augmenta tracking data over OSC/UDP, keeps a live registry of the
//! tracked objects and reports lifecycle changes through the event system.
//!
//! ## Architecture Overview
//!
//! ### Core Components
//!
//! * **Transport** - Binds the input port and turns datagrams into OSC messages
//! * **Protocol Decoder** - Maps V1/V2 addresses and arguments to typed events
//! * **Object Registry** - Applies events per data channel and expires stale objects
//! * **Scene / Output State** - Last reported scene and fusion geometry
//! * **Health** - Port binding state, data-flow detection and reconnect timing
//! * **Event System** - Synchronous fan-out to subscribers
//!
//! ### Message Flow
//!
//! 1. The transport receives a datagram and decodes it (bundles are flattened)
//! 2. Mute is checked, then the message is decoded for the configured protocol version
//! 3. Mirroring is applied, then the desired-object filter
//! 4. The registry or scene state is updated under a short lock
//! 5. The resulting notification is dispatched after the lock is released
//!
//! A lifecycle clock ticks independently, aging objects, expiring those past
//! the timeout, decaying the receiving-data flag and retrying the bind.
//!
//! ## Subscribing
//!
//! ```rust
//! use augmenta_server::create_server;
//!
//! let server = create_server();
//! server.get_event_system().on_object_enter("my_app", |object, _channel| {
//!     println!("object {} at {:?}", object.id, object.centroid);
//!     Ok(())
//! });
//! ```
//!
//! ## Error Handling
//!
//! Nothing arriving on the wire can stop the receive loop:
//!
//! * **Malformed datagrams / messages** - dropped and logged ([`OscError`], [`DecodeError`])
//! * **Unknown addresses** - ignored
//! * **Bind failures** - logged, state becomes unbound, bind retried periodically ([`TransportError`])

pub use config::ServerConfig;
pub use error::{DecodeError, OscError, ServerError, TransportError};
pub use health::{ConnectionState, HealthStatus};
pub use protocol::{OscArg, OscMessage, ProtocolEvent, ProtocolVersion};
pub use server::{MessageOutcome, Tracker, TrackerServer, TrackerStats};
pub use tracking::{DesiredMode, DesiredObjects, TrackerSettings};
pub use utils::{create_server, create_server_with_config};

// Public module declarations
pub mod config;
pub mod error;
pub mod health;
pub mod protocol;
pub mod server;
pub mod tracking;
pub mod transport;
pub mod utils;
