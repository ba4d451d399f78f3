use std::time::Duration;

use crate::error::{ReplayLibError, Result};

use super::{SleepMethod, Sleeper};

pub(super) const SUPPORTED: bool = cfg!(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd"
));

/// Sleep until an absolute deadline on the monotonic clock using
/// clock_nanosleep(2)
#[derive(Debug)]
pub struct AbsTimeSleeper {
    _private: (),
}

impl AbsTimeSleeper {
    /// Returns a new AbsTimeSleeper or an error on platforms without an
    /// absolute monotonic sleep
    pub fn new() -> Result<Self> {
        if !SUPPORTED {
            return Err(ReplayLibError::SleepUnsupported(SleepMethod::AbsTime));
        }
        Ok(Self { _private: () })
    }
}

/// Returns `now + nap`, saturating at the latest instant a TimeSpec can hold
#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
pub(super) fn deadline_after(
    now: nix::sys::time::TimeSpec,
    nap: Duration,
) -> nix::sys::time::TimeSpec {
    const NANOS_PER_SEC: i128 = 1_000_000_000;

    let max_secs =
        (i64::MAX / 1_000_000_000 - 1).min(libc::time_t::MAX as i64) as i128;

    let now_ns = now.tv_sec() as i128 * NANOS_PER_SEC + now.tv_nsec() as i128;
    let deadline_ns =
        (now_ns + nap.as_nanos() as i128).min(max_secs * NANOS_PER_SEC);

    nix::sys::time::TimeSpec::new(
        (deadline_ns / NANOS_PER_SEC) as libc::time_t,
        (deadline_ns % NANOS_PER_SEC) as _,
    )
}

impl Sleeper for AbsTimeSleeper {
    fn method(&self) -> SleepMethod {
        SleepMethod::AbsTime
    }

    #[cfg(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd"
    ))]
    fn sleep_for(&mut self, nap: Duration) -> Result<()> {
        use nix::{
            errno::Errno,
            time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep},
        };

        let now = clock_gettime(ClockId::CLOCK_MONOTONIC).map_err(|e| {
            ReplayLibError::from_sleep_error(SleepMethod::AbsTime, e)
        })?;

        let deadline = deadline_after(now, nap);

        match clock_nanosleep(
            ClockId::CLOCK_MONOTONIC,
            ClockNanosleepFlags::TIMER_ABSTIME,
            &deadline,
        ) {
            Ok(_) | Err(Errno::EINTR) => Ok(()),
            Err(e) => {
                Err(ReplayLibError::from_sleep_error(SleepMethod::AbsTime, e))
            }
        }
    }

    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd"
    )))]
    fn sleep_for(&mut self, _nap: Duration) -> Result<()> {
        Err(ReplayLibError::SleepUnsupported(SleepMethod::AbsTime))
    }
}

#[cfg(test)]
#[path = "./abstime_tests.rs"]
mod tests;
