use std::{
    io::{self, Write},
    net::SocketAddr,
    sync::Arc,
    time::Instant,
};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use chorus_transport::Datagram;

use crate::{
    NodeConfig, NodeStats, PacketFactory, Receiver, RecvError, SourceCounters, TrafficWindow,
    TransmitError, Transmitter,
};

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("invalid node identity {id}, expected 1..={max}")]
    InvalidId { id: i32, max: usize },
    #[error("transmit failure: {0}")]
    Transmit(#[from] TransmitError),
    #[error("receive failure: {0}")]
    Recv(#[from] RecvError),
    #[error("failed to emit report: {0}")]
    Report(#[from] io::Error),
}

/// One peer in the broadcast traffic simulation. Drives repeated rounds of
/// generate+send, receive, and analyze+report over a shared datagram
/// channel, then terminates.
///
/// The node runs as a single cooperative loop: the timed receive is the only
/// unbounded-input suspension point and it is capped by the configured
/// timeout, so the cycle always makes progress even with no peers present.
/// The traffic window has exactly one owner, so no locking is involved.
#[derive(Debug)]
pub struct Node<T> {
    config: NodeConfig,
    factory: PacketFactory,
    transmitter: Transmitter<T>,
    receiver: Receiver<T>,
    window: TrafficWindow,
    stats: Arc<NodeStats>,
    cancel: CancellationToken,
}

impl<T: Datagram> Node<T> {
    /// Builds a node around a ready-to-use channel and a destination to
    /// broadcast to. Fails if the configured identity is outside the known
    /// source range.
    pub fn new(
        config: NodeConfig,
        channel: Arc<T>,
        destination: SocketAddr,
        cancel: CancellationToken,
    ) -> Result<Self, NodeError> {
        if config.node_id < 1 || config.node_id > config.max_sources as i32 {
            return Err(NodeError::InvalidId { id: config.node_id, max: config.max_sources });
        }

        let stats = Arc::new(NodeStats::default());

        Ok(Self {
            factory: PacketFactory::new(config.node_id),
            transmitter: Transmitter::new(
                channel.clone(),
                destination,
                config.spacing,
                stats.clone(),
            ),
            receiver: Receiver::new(channel, config.recv_timeout, stats.clone()),
            window: TrafficWindow::new(config.window_capacity, config.window_age),
            stats,
            cancel,
            config,
        })
    }

    /// Shared handle to this node's counters.
    pub fn stats(&self) -> Arc<NodeStats> {
        self.stats.clone()
    }

    /// Runs the configured number of rounds, emitting one report line per
    /// round, and returns the final stats. Transmit and receive I/O
    /// failures are fatal to the whole run; cancellation ends it early and
    /// cleanly.
    pub async fn run(mut self) -> Result<Arc<NodeStats>, NodeError> {
        info!(
            node_id = self.config.node_id,
            rounds = self.config.rounds,
            burst = self.config.burst_size,
            "node starting"
        );

        for round in 0..self.config.rounds {
            if self.cancel.is_cancelled() {
                info!(round, "node cancelled");
                break;
            }

            // GENERATE_SEND: the round's burst. A fatal transmit error ends
            // the whole run; there is no partial-round retry.
            let sent = self
                .transmitter
                .send_burst(&mut self.factory, self.config.burst_size, &self.cancel)
                .await?;

            // RECEIVE: one bounded drain into the window.
            let batch = self.receiver.drain(self.config.recv_batch).await?;
            let received = batch.len();
            for packet in batch {
                self.window.insert(packet);
            }

            // ANALYZE_REPORT: evict stale traffic, then count what's left.
            self.window.evict_expired(Instant::now());
            let counters = SourceCounters::tally(self.window.snapshot(), self.config.max_sources);
            emit_report(&counters)?;

            self.stats.increment_rounds();
            debug!(round, sent, received, window = self.window.len(), "round complete");
        }

        info!(
            sent = self.stats.packets_sent(),
            received = self.stats.packets_received(),
            "node terminated"
        );

        Ok(self.stats)
    }
}

/// Writes one report line to stdout and flushes it immediately, so log
/// collectors see each round as it completes.
fn emit_report(counters: &SourceCounters) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{counters}")?;
    stdout.flush()
}
