use std::fmt;

use chorus_wire::Packet;

/// Per-source received-packet counts for one reporting round. Rebuilt fresh
/// from a window snapshot every round and discarded after emission.
///
/// Valid sources are `1..=max_sources`; packets tagged with anything else
/// are foreign or malformed traffic and are ignored rather than rejected.
/// Counting is a pure fold over the input, so the result is independent of
/// arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCounters {
    /// `counts[i]` is the count for source `i + 1`.
    counts: Vec<u32>,
}

impl SourceCounters {
    /// Tallies packets per source over the valid range `1..=max_sources`.
    pub fn tally<I>(packets: I, max_sources: usize) -> Self
    where
        I: IntoIterator<Item = Packet>,
    {
        let mut counts = vec![0u32; max_sources];

        for packet in packets {
            let source = packet.source();
            if (1..=max_sources as i32).contains(&source) {
                counts[(source - 1) as usize] += 1;
            }
        }

        Self { counts }
    }

    /// The count for the given source, or 0 if it is outside the valid range.
    pub fn get(&self, source: i32) -> u32 {
        if source < 1 {
            return 0;
        }
        self.counts.get((source - 1) as usize).copied().unwrap_or(0)
    }

    /// Total packets counted across all valid sources.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Number of sources covered by this report.
    #[inline]
    pub fn sources(&self) -> usize {
        self.counts.len()
    }
}

/// Renders the report line: `"01: 010, 02: 003, ..."`, one column per known
/// source in ascending order.
impl fmt::Display for SourceCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, count) in self.counts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:02}: {:03}", i + 1, count)?;
        }
        Ok(())
    }
}
