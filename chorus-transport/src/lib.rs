use std::{
    io,
    net::{Ipv4Addr, SocketAddr},
};

mod udp;
pub use udp::BroadcastUdp;

/// The well-known port all simulation nodes bind and broadcast to.
pub const DRIVER_PORT: u16 = 8080;

/// An unreliable, unordered datagram channel. This is the only I/O surface
/// the node core sees; receive timeouts are imposed by the caller, not the
/// channel.
#[async_trait::async_trait]
pub trait Datagram: Send + Sync {
    /// Sends a single datagram to the given destination. One call maps to
    /// exactly one record on the wire.
    async fn send_to(&self, buf: &[u8], dst: SocketAddr) -> io::Result<usize>;

    /// Receives a single datagram into `buf`, returning its length. Waits
    /// until one arrives; callers bound the wait with their own timeout.
    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// The local address this channel is bound to.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

/// The limited-broadcast destination for the given port.
#[inline]
pub const fn broadcast_addr(port: u16) -> SocketAddr {
    SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::BROADCAST), port)
}
