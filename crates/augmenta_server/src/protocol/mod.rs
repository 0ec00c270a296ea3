//! Wire-level handling of Augmenta messages.
//!
//! * [`osc`] - OSC datagram codec
//! * [`decoder`] - address/argument layout to [`ProtocolEvent`]
//! * [`transform`] - axis mirroring applied after decoding

pub mod decoder;
pub mod osc;
pub mod transform;

pub use decoder::{
    decode, ExtraData, MainData, ObjectData, ObjectPayload, ProtocolEvent, ProtocolVersion,
    SceneSize,
};
pub use osc::{decode_packet, OscArg, OscMessage, OscPacket};
pub use transform::Mirror;
