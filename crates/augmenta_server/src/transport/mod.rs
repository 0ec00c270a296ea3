//! Message transport abstraction.
//!
//! The tracker never touches sockets directly. A [`MessageTransport`] binds a
//! port and hands back a [`TransportReceiver`], which yields decoded OSC
//! messages datagram by datagram. The UDP implementation lives in [`udp`];
//! tests plug in their own transports.

use crate::error::TransportError;
use crate::protocol::osc::OscMessage;
use async_trait::async_trait;
use std::net::SocketAddr;

pub mod udp;

pub use udp::UdpOscTransport;

/// Factory for bound receivers.
#[async_trait]
pub trait MessageTransport: Send + Sync + 'static {
    /// Binds the given port.
    async fn bind(&self, port: u16) -> Result<Box<dyn TransportReceiver>, TransportError>;
}

/// A bound receive handle.
#[async_trait]
pub trait TransportReceiver: Send + 'static {
    /// Waits for the next datagram and returns the messages it carried.
    ///
    /// A bundle yields all its messages in wire order. A datagram that fails
    /// to parse yields [`TransportError::Osc`] and does not invalidate the
    /// receiver; [`TransportError::Io`] does.
    async fn recv(&mut self) -> Result<Vec<OscMessage>, TransportError>;

    /// Address the receiver is bound to.
    fn local_addr(&self) -> SocketAddr;
}
