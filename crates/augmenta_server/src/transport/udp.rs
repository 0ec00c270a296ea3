//! UDP transport for OSC datagrams.

use super::{MessageTransport, TransportReceiver};
use crate::error::TransportError;
use crate::protocol::osc::{decode_packet, OscMessage};
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::trace;

/// Maximum UDP datagram size.
const MAX_DATAGRAM_SIZE: usize = 65536;

/// Binds UDP sockets on a fixed interface.
#[derive(Debug, Clone)]
pub struct UdpOscTransport {
    bind_ip: IpAddr,
}

impl UdpOscTransport {
    pub fn new(bind_ip: IpAddr) -> Self {
        Self { bind_ip }
    }
}

#[async_trait]
impl MessageTransport for UdpOscTransport {
    async fn bind(&self, port: u16) -> Result<Box<dyn TransportReceiver>, TransportError> {
        let socket = UdpSocket::bind(SocketAddr::new(self.bind_ip, port))
            .await
            .map_err(|source| TransportError::Bind { port, source })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| TransportError::Bind { port, source })?;

        Ok(Box::new(UdpOscReceiver {
            socket,
            local_addr,
            buffer: vec![0u8; MAX_DATAGRAM_SIZE],
        }))
    }
}

/// A bound UDP socket decoding OSC packets.
pub struct UdpOscReceiver {
    socket: UdpSocket,
    local_addr: SocketAddr,
    buffer: Vec<u8>,
}

#[async_trait]
impl TransportReceiver for UdpOscReceiver {
    async fn recv(&mut self) -> Result<Vec<OscMessage>, TransportError> {
        let (len, from) = self.socket.recv_from(&mut self.buffer).await?;
        trace!("Received {} bytes from {}", len, from);

        let packet = decode_packet(&self.buffer[..len])
            .map_err(|source| TransportError::Osc { from, source })?;
        Ok(packet.into_messages())
    }

    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::osc::OscArg;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn test_receives_encoded_message() {
        let transport = UdpOscTransport::new(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let mut receiver = transport.bind(0).await.unwrap();
        let target = receiver.local_addr();
        assert_ne!(target.port(), 0);

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let message = OscMessage::new("/scene", vec![OscArg::Int(1), OscArg::Float(2.0), OscArg::Float(3.0)]);
        sender.send_to(&message.encode(), target).await.unwrap();

        let received = receiver.recv().await.unwrap();
        assert_eq!(received, vec![message]);
    }

    #[tokio::test]
    async fn test_garbage_datagram_is_codec_error() {
        let transport = UdpOscTransport::new(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let mut receiver = transport.bind(0).await.unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.send_to(b"nope", receiver.local_addr()).await.unwrap();

        assert!(matches!(
            receiver.recv().await,
            Err(TransportError::Osc { .. })
        ));
    }

    #[tokio::test]
    async fn test_port_in_use_is_bind_error() {
        let transport = UdpOscTransport::new(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let first = transport.bind(0).await.unwrap();
        let port = first.local_addr().port();

        let result = transport.bind(port).await;
        assert!(matches!(result, Err(TransportError::Bind { .. })));
    }
}
