use std::{
    io,
    net::{Ipv4Addr, SocketAddr},
};

use tokio::net::UdpSocket;
use tracing::debug;

use crate::Datagram;

/// A UDP socket configured for broadcast traffic: bound to the well-known
/// port on all interfaces, with `SO_BROADCAST` enabled so sends to the
/// limited-broadcast address are permitted.
#[derive(Debug)]
pub struct BroadcastUdp {
    socket: UdpSocket,
}

impl BroadcastUdp {
    /// Binds `0.0.0.0:port` and enables broadcast on the socket. Any failure
    /// here is a setup error: the node must not start without a working
    /// channel.
    pub async fn bind(port: u16) -> io::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port)).await?;
        socket.set_broadcast(true)?;

        debug!(addr = %socket.local_addr()?, "bound broadcast socket");

        Ok(Self { socket })
    }

    /// Binds an ephemeral loopback port. Used by tests and single-host runs
    /// where real broadcast is unavailable or unwanted.
    pub async fn bind_loopback() -> io::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await?;

        debug!(addr = %socket.local_addr()?, "bound loopback socket");

        Ok(Self { socket })
    }
}

#[async_trait::async_trait]
impl Datagram for BroadcastUdp {
    async fn send_to(&self, buf: &[u8], dst: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(buf, dst).await
    }

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let (len, _addr) = self.socket.recv_from(buf).await?;
        Ok(len)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loopback_send_recv() {
        let socket = BroadcastUdp::bind_loopback().await.unwrap();
        let addr = socket.local_addr().unwrap();

        let packet = chorus_wire::Packet::new(1, 0, 99);
        socket.send_to(&packet.to_datagram(), addr).await.unwrap();

        let mut buf = [0u8; 64];
        let len = socket.recv(&mut buf).await.unwrap();

        let decoded = chorus_wire::Packet::from_datagram(&buf[..len]).unwrap();
        assert_eq!(decoded, packet);
    }
}
