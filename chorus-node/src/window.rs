use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use chorus_wire::Packet;

/// A bounded rolling buffer of recently received packets, the source of
/// truth for per-round reports. Entries are kept in arrival order.
///
/// Two limits bound memory independently of the receive rate: a hard
/// capacity (oldest entries evicted first when full) and a maximum age
/// (expired entries dropped at each reporting boundary).
#[derive(Debug)]
pub struct TrafficWindow {
    entries: VecDeque<Entry>,
    capacity: usize,
    max_age: Duration,
}

#[derive(Debug)]
struct Entry {
    at: Instant,
    packet: Packet,
}

impl TrafficWindow {
    /// Creates an empty window holding at most `capacity` packets no older
    /// than `max_age`.
    pub fn new(capacity: usize, max_age: Duration) -> Self {
        Self { entries: VecDeque::with_capacity(capacity), capacity, max_age }
    }

    /// Appends a packet that arrived just now.
    pub fn insert(&mut self, packet: Packet) {
        self.insert_at(packet, Instant::now());
    }

    /// Appends a packet with an explicit arrival time. The oldest entries
    /// are evicted first if the window is at capacity; a zero-capacity
    /// window holds nothing.
    pub fn insert_at(&mut self, packet: Packet, at: Instant) {
        if self.capacity == 0 {
            return;
        }

        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }

        self.entries.push_back(Entry { at, packet });
    }

    /// Drops every entry older than the window's maximum age as of `now`.
    /// Entries are in arrival order, so expired ones form a prefix.
    pub fn evict_expired(&mut self, now: Instant) {
        while let Some(entry) = self.entries.front() {
            if now.saturating_duration_since(entry.at) <= self.max_age {
                break;
            }
            self.entries.pop_front();
        }
    }

    /// A consistent copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<Packet> {
        self.entries.iter().map(|e| e.packet).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(seq: i32) -> Packet {
        Packet::new(1, seq, 0)
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let mut window = TrafficWindow::new(5, Duration::from_secs(2));

        for seq in 0..100 {
            window.insert(packet(seq));
            assert!(window.len() <= 5);
        }

        // FIFO: the five most recent survive.
        let seqs: Vec<i32> = window.snapshot().iter().map(|p| p.seq()).collect();
        assert_eq!(seqs, vec![95, 96, 97, 98, 99]);
    }

    #[test]
    fn age_eviction_drops_the_expired_prefix() {
        let mut window = TrafficWindow::new(10, Duration::from_secs(2));
        let start = Instant::now();

        window.insert_at(packet(0), start);
        window.insert_at(packet(1), start + Duration::from_millis(1500));
        window.insert_at(packet(2), start + Duration::from_millis(2500));

        // Only packet 0 is older than 2 s at this point.
        window.evict_expired(start + Duration::from_millis(3000));

        let seqs: Vec<i32> = window.snapshot().iter().map(|p| p.seq()).collect();
        assert_eq!(seqs, vec![1, 2]);
    }

    #[test]
    fn zero_capacity_window_holds_nothing() {
        let mut window = TrafficWindow::new(0, Duration::from_secs(2));

        for seq in 0..10 {
            window.insert(packet(seq));
        }

        assert!(window.is_empty());
        assert!(window.snapshot().is_empty());
    }

    #[test]
    fn eviction_on_empty_window_is_a_noop() {
        let mut window = TrafficWindow::new(10, Duration::from_secs(2));
        window.evict_expired(Instant::now());
        assert!(window.is_empty());
    }

    #[test]
    fn fresh_entries_survive_eviction() {
        let mut window = TrafficWindow::new(10, Duration::from_secs(2));
        let now = Instant::now();

        for seq in 0..4 {
            window.insert_at(packet(seq), now);
        }
        window.evict_expired(now + Duration::from_millis(100));

        assert_eq!(window.len(), 4);
    }
}
