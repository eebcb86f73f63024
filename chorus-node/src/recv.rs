use std::{io, sync::Arc, time::Duration};

use thiserror::Error;
use tracing::warn;

use chorus_transport::Datagram;
use chorus_wire::{Packet, PACKET_SIZE};

use crate::NodeStats;

/// Room for one record plus slack, so an oversized datagram is observed as
/// oversized instead of silently truncated to `PACKET_SIZE`.
const RECV_BUF_SIZE: usize = PACKET_SIZE * 4;

#[derive(Debug, Error)]
pub enum RecvError {
    #[error("IO error: {0:?}")]
    Io(#[from] io::Error),
}

/// Drains the inbound side of the channel in bounded batches. A timed-out
/// attempt is the expected steady state on a quiet medium, not a failure.
#[derive(Debug)]
pub struct Receiver<T> {
    channel: Arc<T>,
    timeout: Duration,
    stats: Arc<NodeStats>,
}

impl<T: Datagram> Receiver<T> {
    pub fn new(channel: Arc<T>, timeout: Duration, stats: Arc<NodeStats>) -> Self {
        Self { channel, timeout, stats }
    }

    /// Reads one datagram at a time until `max_packets` have been decoded,
    /// the per-attempt timeout elapses, or a genuine I/O error occurs.
    ///
    /// Timeouts (including `WouldBlock`/`TimedOut` surfaced by the channel)
    /// end the drain successfully with whatever was read so far, possibly
    /// nothing. Datagrams that fail to decode are logged and skipped; the
    /// rest of the batch is unaffected. Only a real I/O failure is an error.
    pub async fn drain(&self, max_packets: usize) -> Result<Vec<Packet>, RecvError> {
        let mut packets = Vec::new();
        let mut buf = [0u8; RECV_BUF_SIZE];

        while packets.len() < max_packets {
            let len = match tokio::time::timeout(self.timeout, self.channel.recv(&mut buf)).await {
                // No data arrived within the timeout: the drain is done.
                Err(_elapsed) => break,
                Ok(Err(e)) if is_timeout(&e) => break,
                Ok(Err(e)) => return Err(RecvError::Io(e)),
                Ok(Ok(len)) => len,
            };

            match Packet::from_datagram(&buf[..len]) {
                Ok(packet) => {
                    self.stats.increment_received();
                    packets.push(packet);
                }
                Err(e) => {
                    self.stats.increment_discarded();
                    warn!(len, err = %e, "discarding malformed datagram");
                }
            }
        }

        Ok(packets)
    }
}

/// "No data right now" conditions a blocking-style channel may surface
/// instead of suspending.
fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
