use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for a node. Shared between the scheduler and whoever set the
/// node up (e.g. the binary, for a final summary).
#[derive(Debug, Default)]
pub struct NodeStats {
    /// Total packets handed to the channel.
    packets_sent: AtomicU64,
    /// Total well-formed packets received.
    packets_received: AtomicU64,
    /// Total datagrams discarded because they failed to decode.
    malformed_discarded: AtomicU64,
    /// Rounds driven to completion.
    rounds_completed: AtomicU64,
}

impl NodeStats {
    #[inline]
    pub(crate) fn increment_sent(&self) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_received(&self) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_discarded(&self) {
        self.malformed_discarded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_rounds(&self) {
        self.rounds_completed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn packets_sent(&self) -> u64 {
        self.packets_sent.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn packets_received(&self) -> u64 {
        self.packets_received.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn malformed_discarded(&self) -> u64 {
        self.malformed_discarded.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rounds_completed(&self) -> u64 {
        self.rounds_completed.load(Ordering::Relaxed)
    }
}
