//! Burst counter letting a run of packets skip delay computation

/// Number of upcoming packets that may be sent without pacing. Re-armed by
/// packet rate bursts and by the one-at-a-time operator prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accelerator {
    remaining: u32,
}

impl Accelerator {
    /// Returns an idle accelerator
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows the next `count` packets through without pacing
    pub fn arm(&mut self, count: u32) {
        self.remaining = count;
    }

    /// Consumes one pending packet. Returns false when nothing is pending.
    pub fn try_consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    /// Returns the number of packets still allowed through
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

#[cfg(test)]
#[path = "./accelerator_tests.rs"]
mod tests;
