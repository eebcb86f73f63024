use std::time::Duration;

use chorus_transport::DRIVER_PORT;

/// Configuration for one simulation node.
///
/// The defaults reproduce the canonical scenario: 20 one-second rounds of
/// 100 packets at 10 ms spacing, a 12 ms receive timeout, and a 2 s / 200
/// packet traffic window across up to 10 peers.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// This node's identity, `1..=max_sources`.
    pub node_id: i32,
    /// The well-known port all peers bind and broadcast to.
    pub port: u16,
    /// Packets sent per round.
    pub burst_size: usize,
    /// Sleep between consecutive packet sends.
    pub spacing: Duration,
    /// Per-attempt receive timeout. Bounds the only suspension point in the
    /// cycle, so the scheduler can never hang on a silent medium.
    pub recv_timeout: Duration,
    /// Maximum packets drained from the channel per round.
    pub recv_batch: usize,
    /// Hard capacity of the traffic window.
    pub window_capacity: usize,
    /// Maximum age of a window entry.
    pub window_age: Duration,
    /// Rounds to run before terminating.
    pub rounds: usize,
    /// Number of known source identities covered by the report.
    pub max_sources: usize,
}

impl NodeConfig {
    /// Default configuration for the given node identity.
    pub fn new(node_id: i32) -> Self {
        Self {
            node_id,
            port: DRIVER_PORT,
            burst_size: 100,
            spacing: Duration::from_millis(10),
            recv_timeout: Duration::from_millis(12),
            recv_batch: 100,
            window_capacity: 200,
            window_age: Duration::from_secs(2),
            rounds: 20,
            max_sources: 10,
        }
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_burst_size(mut self, burst_size: usize) -> Self {
        self.burst_size = burst_size;
        self
    }

    pub fn with_spacing(mut self, spacing: Duration) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_recv_timeout(mut self, recv_timeout: Duration) -> Self {
        self.recv_timeout = recv_timeout;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_max_sources(mut self, max_sources: usize) -> Self {
        self.max_sources = max_sources;
        self
    }
}
