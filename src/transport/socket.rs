//! Async UDP socket wrapper for NAT-PMP exchanges.
//!
//! One socket per exchange: bound to an ephemeral port and connected to the
//! gateway, so datagrams from any other source are filtered by the kernel.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

/// UDP socket talking to a single gateway.
#[derive(Debug)]
pub struct GatewaySocket {
    /// The underlying UDP socket.
    socket: UdpSocket,
    /// Gateway endpoint the socket is connected to.
    gateway: SocketAddr,
}

impl GatewaySocket {
    /// Bind an ephemeral local port and connect it to the gateway.
    pub async fn connect(gateway: SocketAddr) -> io::Result<Self> {
        let local: SocketAddr = match gateway {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(gateway).await?;

        Ok(Self { socket, gateway })
    }

    /// Get the local address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Get the gateway address.
    pub fn gateway(&self) -> SocketAddr {
        self.gateway
    }

    /// Send a datagram to the gateway.
    pub async fn send(&self, data: &[u8]) -> io::Result<usize> {
        self.socket.send(data).await
    }

    /// Receive a datagram from the gateway into `buf`.
    ///
    /// Takes `&self` so a receive can be in flight while retransmissions go out.
    pub async fn recv<'a>(&self, buf: &'a mut [u8]) -> io::Result<&'a [u8]> {
        let len = self.socket.recv(buf).await?;
        Ok(&buf[..len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_socket_connect() {
        let gateway = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let gateway_addr = gateway.local_addr().unwrap();

        let socket = GatewaySocket::connect(gateway_addr).await.unwrap();
        assert_eq!(socket.gateway(), gateway_addr);
        assert_ne!(socket.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_socket_send_recv() {
        let gateway = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let socket = GatewaySocket::connect(gateway.local_addr().unwrap())
            .await
            .unwrap();

        socket.send(b"ping").await.unwrap();

        let mut buf = [0u8; 16];
        let (len, from) = gateway.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"ping");

        gateway.send_to(b"pong", from).await.unwrap();

        let mut buf = [0u8; 16];
        let received = socket.recv(&mut buf).await.unwrap();
        assert_eq!(received, b"pong");
    }
}
