//! Error types and handling for the tracking receiver.
//!
//! This module defines the error types that can occur while receiving,
//! decoding and applying Augmenta messages, providing clear categorization
//! of the different failure modes. Only [`ServerError`] keeps the receiver
//! from running; the others are never fatal to the receive loop. Decode and
//! codec errors drop one datagram, transport errors put the receiver into the
//! unbound state until the next reconnect attempt.

use std::net::SocketAddr;

/// Errors that stop the receiver from starting.
///
/// Everything that happens once the loop runs is logged and recovered from;
/// only a configuration the loop cannot run with is reported here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServerError {
    /// A configuration value the receive loop cannot run with
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while parsing an OSC datagram.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OscError {
    /// Datagram ended before a complete field could be read
    #[error("Unexpected end of packet at offset {offset} (wanted {wanted} bytes)")]
    UnexpectedEof { offset: usize, wanted: usize },

    /// OSC string was not NUL-terminated or not valid UTF-8
    #[error("Invalid string at offset {0}")]
    InvalidString(usize),

    /// Address pattern did not start with '/'
    #[error("Invalid address pattern: {0}")]
    InvalidAddress(String),

    /// Type tag string missing its leading ','
    #[error("Missing type tag string for {0}")]
    MissingTypeTags(String),

    /// Type tag not part of the supported subset
    #[error("Unsupported type tag '{tag}' in {address}")]
    UnsupportedType { address: String, tag: char },

    /// Bundle element size did not fit in the datagram
    #[error("Invalid bundle element size {0}")]
    InvalidBundleSize(i32),

    /// Blob argument declared a negative length
    #[error("Invalid blob size {0}")]
    InvalidBlobSize(i32),

    /// Bundles nested deeper than the decoder accepts
    #[error("Bundle nesting exceeds {0} levels")]
    BundleTooDeep(usize),
}

/// Errors raised when a message does not match the layout of its address.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer arguments than the layout reads
    #[error("{address}: expected at least {expected} arguments, got {actual}")]
    Arity {
        address: String,
        expected: usize,
        actual: usize,
    },

    /// Argument at a layout position has the wrong OSC type
    #[error("{address}: argument {index} should be {expected}, got {actual}")]
    ArgumentType {
        address: String,
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Errors raised by a message transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The port could not be bound
    #[error("Failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Receiving from a bound socket failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A datagram could not be parsed
    #[error("Malformed datagram from {from}: {source}")]
    Osc {
        from: SocketAddr,
        #[source]
        source: OscError,
    },
}
