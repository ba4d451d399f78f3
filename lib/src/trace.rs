//! Timestamp trace recorded by throughput pacing
//!
//! Every throughput computation reports how far along the schedule the sender
//! is. The trace is a side channel for diagnosing drift and never influences
//! pacing.

#[cfg(test)]
use mockall::{automock, predicate::*};

use serde::Serialize;

use crate::error::Result;

/// Default number of entries a [`TraceCollector`] keeps
pub const TRACE_MAX_ENTRIES: usize = 15000;

/// One throughput pacing computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    /// Bytes sent including the packet being paced
    pub bytes_sent: u64,
    /// Clock reading at computation time
    pub now_us: u64,
    /// Time since the session's throughput anchor
    pub elapsed_us: u64,
    /// Offset at which the packet was due
    pub next_tx_us: u64,
}

#[cfg_attr(test, automock)]
/// Sink for throughput trace entries
pub trait TimestampTrace: Send {
    /// Records one computation
    fn record(&mut self, entry: TraceEntry);
}

/// Bounded in-memory [`TimestampTrace`]. Entries past capacity are dropped
/// and counted.
#[derive(Debug, Clone, Serialize)]
pub struct TraceCollector {
    entries: Vec<TraceEntry>,
    #[serde(skip)]
    capacity: usize,
    dropped: u64,
}

impl TraceCollector {
    /// Returns a collector holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            dropped: 0,
        }
    }

    /// Returns the recorded entries in order
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Returns the number of entries dropped after the collector filled up
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Returns the trace as pretty printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for TraceCollector {
    fn default() -> Self {
        Self::new(TRACE_MAX_ENTRIES)
    }
}

impl TimestampTrace for TraceCollector {
    fn record(&mut self, entry: TraceEntry) {
        if self.entries.len() >= self.capacity {
            self.dropped += 1;
            return;
        }
        self.entries.push(entry);
    }
}

#[cfg(test)]
#[path = "./trace_tests.rs"]
mod tests;
