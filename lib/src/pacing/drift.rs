//! Catch-up math for throughput pacing

/// Bits per byte times microseconds per second
const BIT_MICROS_PER_BYTE_SEC: u128 = 8_000_000;

/// Returns how many upcoming bytes should go out unpaced so a sender that is
/// `elapsed_us - next_tx_us` behind a `bps` schedule catches up. Returns 0
/// when the sender is on or ahead of schedule.
pub fn skip_bytes(elapsed_us: u64, next_tx_us: u64, bps: u64) -> u64 {
    let behind_us = elapsed_us.saturating_sub(next_tx_us) as u128;
    let bytes = behind_us * bps as u128 / BIT_MICROS_PER_BYTE_SEC;
    u64::try_from(bytes).unwrap_or(u64::MAX)
}

/// Returns the microsecond offset from the start of the session at which a
/// sender that has put `bytes_sent` bytes on the wire is due at `bps`
pub fn next_tx_us(bytes_sent: u64, bps: u64) -> u64 {
    if bps == 0 {
        return 0;
    }
    let bits = bytes_sent as u128 * 8;
    let micros = bits * 1_000_000 / bps as u128;
    u64::try_from(micros).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "./drift_tests.rs"]
mod tests;
