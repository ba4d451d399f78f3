//! Time values used while pacing: capture timestamps, nap durations and the
//! clock the throughput pacer measures elapsed time with

#[cfg(test)]
use mockall::{automock, predicate::*};

use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    time::{Duration, Instant},
};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Capture time of a packet, measured from the capture's epoch
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Timestamp(Duration);

impl Timestamp {
    /// Returns a timestamp from the `(seconds, microseconds)` pair found in
    /// capture file headers. Negative components are clamped to zero.
    pub fn from_timeval(secs: i64, usecs: i64) -> Self {
        let secs = Duration::from_secs(secs.max(0) as u64);
        let usecs = Duration::from_micros(usecs.max(0) as u64);
        Self(secs + usecs)
    }

    /// Returns a timestamp the given number of microseconds past the epoch
    pub fn from_micros(micros: u64) -> Self {
        Self(Duration::from_micros(micros))
    }

    /// Returns the underlying offset from the epoch
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Returns the time elapsed since `earlier` or None if `earlier` is
    /// actually later than self
    pub fn checked_since(&self, earlier: Timestamp) -> Option<Duration> {
        self.0.checked_sub(earlier.0)
    }
}

impl From<Duration> for Timestamp {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:06}", self.0.as_secs(), self.0.subsec_micros())
    }
}

/// Capture times of the packet about to be sent and the one sent before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketTiming {
    /// Capture time of the packet about to be sent
    pub current: Timestamp,
    /// Capture time of the previously sent packet, None for the first packet
    pub previous: Option<Timestamp>,
}

impl PacketTiming {
    /// Returns a new PacketTiming
    pub fn new(current: Timestamp, previous: Option<Timestamp>) -> Self {
        Self { current, previous }
    }
}

/// Non-negative duration the pacer intends to wait before the next send.
/// A zero nap means "do not sleep".
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub struct NapDuration(Duration);

impl NapDuration {
    /// The "do not sleep" nap
    pub const ZERO: NapDuration = NapDuration(Duration::ZERO);

    /// Returns a nap of the given number of nanoseconds
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(Duration::from_nanos(nanos))
    }

    /// Returns a nap of the given number of microseconds
    pub const fn from_micros(micros: u64) -> Self {
        Self(Duration::from_micros(micros))
    }

    /// Returns a nap of the given number of milliseconds
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Returns true if this nap means "do not sleep"
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns the nap as a std Duration
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Divides the nap by a float factor. Factors that are not positive and
    /// finite yield a zero nap.
    pub fn div_f64(self, factor: f64) -> Self {
        if !(factor.is_finite() && factor > 0.0) {
            return Self::ZERO;
        }

        let nanos = self.0.as_nanos() as f64 / factor;

        if nanos >= u64::MAX as f64 {
            Self(Duration::from_nanos(u64::MAX))
        } else {
            Self(Duration::from_nanos(nanos as u64))
        }
    }

    /// Bounds the nap by an optional ceiling. The nap is returned unchanged
    /// when no ceiling is set or the nap does not exceed it.
    pub fn clamp_to(self, ceiling: Option<NapDuration>) -> Self {
        match ceiling {
            Some(max) if self > max => max,
            _ => self,
        }
    }

    /// Returns the nap as whole nanoseconds
    pub fn as_nanos(&self) -> u128 {
        self.0.as_nanos()
    }
}

impl From<Duration> for NapDuration {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}

impl Display for NapDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{:09}",
            self.0.as_nanos() / NANOS_PER_SEC,
            self.0.as_nanos() % NANOS_PER_SEC
        )
    }
}

#[cfg_attr(test, automock)]
/// Source of wall clock progress for throughput pacing
pub trait Clock {
    /// Returns the current time in microseconds. Only differences between
    /// readings are meaningful.
    fn now_us(&self) -> u64;
}

/// Monotonic [`Clock`] counting microseconds from its creation
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    base: Instant,
}

impl MonotonicClock {
    /// Returns a new MonotonicClock starting at zero
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_us(&self) -> u64 {
        self.base.elapsed().as_micros() as u64
    }
}

#[cfg(test)]
#[path = "./timing_tests.rs"]
mod tests;
