use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use chorus_transport::Datagram;

use crate::{NodeStats, PacketFactory};

#[derive(Debug, Error)]
pub enum TransmitError {
    #[error("send failed after {sent} packets: {source}")]
    Io {
        /// Packets successfully handed to the channel before the failure.
        sent: usize,
        #[source]
        source: io::Error,
    },
}

impl TransmitError {
    /// The number of packets that made it out before the burst was aborted.
    pub const fn sent(&self) -> usize {
        match self {
            Self::Io { sent, .. } => *sent,
        }
    }
}

/// Emits bursts of freshly generated packets at a fixed inter-packet
/// spacing. The spacing is a deliberate self-imposed throttle, not
/// backpressure from the network.
#[derive(Debug)]
pub struct Transmitter<T> {
    channel: Arc<T>,
    destination: SocketAddr,
    spacing: Duration,
    stats: Arc<NodeStats>,
}

impl<T: Datagram> Transmitter<T> {
    pub fn new(
        channel: Arc<T>,
        destination: SocketAddr,
        spacing: Duration,
        stats: Arc<NodeStats>,
    ) -> Self {
        Self { channel, destination, spacing, stats }
    }

    /// Generates and sends `count` packets, sleeping the configured spacing
    /// between sends, and returns how many were actually handed to the
    /// channel.
    ///
    /// Transient send failures (`WouldBlock`, `Interrupted`) drop that one
    /// packet and continue; the medium is lossy anyway. Any other I/O error
    /// aborts the burst with the partial count attached. Cancellation
    /// observed between sends ends the burst early with `Ok(partial)`:
    /// shutdown is not a fault.
    ///
    /// The factory's sequence state advances for every packet generated,
    /// sent or not.
    pub async fn send_burst(
        &self,
        factory: &mut PacketFactory,
        count: usize,
        cancel: &CancellationToken,
    ) -> Result<usize, TransmitError> {
        let mut sent = 0;

        for i in 0..count {
            if cancel.is_cancelled() {
                debug!(sent, "burst cancelled");
                return Ok(sent);
            }

            let packet = factory.next_packet();
            let datagram = packet.to_datagram();

            match self.channel.send_to(&datagram, self.destination).await {
                Ok(_) => {
                    sent += 1;
                    self.stats.increment_sent();
                }
                Err(e) if is_transient(&e) => {
                    debug!(seq = packet.seq(), err = %e, "transient send failure, packet dropped");
                }
                Err(e) => return Err(TransmitError::Io { sent, source: e }),
            }

            if i + 1 < count {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!(sent, "burst cancelled");
                        return Ok(sent);
                    }
                    _ = tokio::time::sleep(self.spacing) => {}
                }
            }
        }

        Ok(sent)
    }
}

/// "Try again later" conditions that should not kill a best-effort burst.
fn is_transient(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// A channel that accepts sends until the nth attempt, which fails with
    /// the given error kind.
    struct FlakyChannel {
        fail_on: usize,
        kind: io::ErrorKind,
        attempts: AtomicUsize,
    }

    impl FlakyChannel {
        fn new(fail_on: usize, kind: io::ErrorKind) -> Self {
            Self { fail_on, kind, attempts: AtomicUsize::new(0) }
        }
    }

    #[async_trait::async_trait]
    impl Datagram for FlakyChannel {
        async fn send_to(&self, buf: &[u8], _dst: SocketAddr) -> io::Result<usize> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt == self.fail_on {
                return Err(io::Error::new(self.kind, "injected failure"));
            }
            Ok(buf.len())
        }

        async fn recv(&self, _buf: &mut [u8]) -> io::Result<usize> {
            std::future::pending().await
        }

        fn local_addr(&self) -> io::Result<SocketAddr> {
            Ok("127.0.0.1:0".parse().unwrap())
        }
    }

    fn destination() -> SocketAddr {
        "127.0.0.1:9999".parse().unwrap()
    }

    fn transmitter(channel: Arc<FlakyChannel>) -> Transmitter<FlakyChannel> {
        Transmitter::new(
            channel,
            destination(),
            Duration::from_millis(10),
            Arc::new(NodeStats::default()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_failure_aborts_with_partial_count() {
        let tx = transmitter(Arc::new(FlakyChannel::new(3, io::ErrorKind::PermissionDenied)));
        let mut factory = PacketFactory::with_seed(1, 0);

        let err = tx
            .send_burst(&mut factory, 5, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.sent(), 2);
        // Two sent plus the one that failed: three sequence numbers consumed.
        assert_eq!(factory.sequence(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_drops_one_packet_and_continues() {
        let tx = transmitter(Arc::new(FlakyChannel::new(3, io::ErrorKind::WouldBlock)));
        let mut factory = PacketFactory::with_seed(1, 0);

        let sent = tx
            .send_burst(&mut factory, 5, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(sent, 4);
        assert_eq!(factory.sequence(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_ends_the_burst_cleanly() {
        let tx = transmitter(Arc::new(FlakyChannel::new(usize::MAX, io::ErrorKind::Other)));
        let mut factory = PacketFactory::with_seed(1, 0);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let sent = tx.send_burst(&mut factory, 5, &cancel).await.unwrap();

        assert_eq!(sent, 0);
        assert_eq!(factory.sequence(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn full_burst_reports_every_packet() {
        let channel = Arc::new(FlakyChannel::new(usize::MAX, io::ErrorKind::Other));
        let stats = Arc::new(NodeStats::default());
        let tx =
            Transmitter::new(channel, destination(), Duration::from_millis(10), stats.clone());
        let mut factory = PacketFactory::with_seed(1, 0);

        let sent = tx
            .send_burst(&mut factory, 100, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(sent, 100);
        assert_eq!(stats.packets_sent(), 100);
    }
}
