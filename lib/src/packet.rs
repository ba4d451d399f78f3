//! Collaborator traits for the replay loop: where packets come from and
//! where they go

use crate::{error::Result, timing::Timestamp};

/// A packet read from a capture together with its capture time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPacket {
    /// Time the packet was captured
    pub timestamp: Timestamp,
    /// Raw frame bytes starting at the link layer
    pub data: Vec<u8>,
}

impl CapturedPacket {
    /// Returns a new CapturedPacket
    pub fn new(timestamp: Timestamp, data: Vec<u8>) -> Self {
        Self { timestamp, data }
    }

    /// Returns the frame length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true for an empty frame
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Trait describing a source of captured packets, e.g. a pcap file
pub trait PacketSource {
    /// Should return the next packet in capture order or None once the
    /// capture is exhausted
    fn next_packet(&mut self) -> Result<Option<CapturedPacket>>;
}

/// Trait describing a packet sender
pub trait Sender: Send + Sync {
    /// Should send a packet over the wire
    fn send(&mut self, packet: &[u8]) -> Result<()>;
}

#[cfg(test)]
#[path = "./packet_tests.rs"]
#[doc(hidden)]
pub mod mocks;
