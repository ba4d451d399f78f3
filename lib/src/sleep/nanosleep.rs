use std::time::Duration;

use crate::error::Result;

use super::{SleepMethod, Sleeper};

/// Blocking relative sleep on the monotonic clock
#[derive(Debug, Default)]
pub struct NanoSleeper;

impl NanoSleeper {
    /// Returns a new NanoSleeper
    pub fn new() -> Self {
        Self
    }
}

impl Sleeper for NanoSleeper {
    fn method(&self) -> SleepMethod {
        SleepMethod::Nanosleep
    }

    #[cfg(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd"
    ))]
    fn sleep_for(&mut self, nap: Duration) -> Result<()> {
        use crate::error::ReplayLibError;
        use nix::{
            errno::Errno,
            sys::time::TimeSpec,
            time::{ClockId, ClockNanosleepFlags, clock_nanosleep},
        };

        match clock_nanosleep(
            ClockId::CLOCK_MONOTONIC,
            ClockNanosleepFlags::empty(),
            &TimeSpec::from(nap),
        ) {
            Ok(_) | Err(Errno::EINTR) => Ok(()),
            Err(e) => Err(ReplayLibError::from_sleep_error(
                SleepMethod::Nanosleep,
                e,
            )),
        }
    }

    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd"
    )))]
    fn sleep_for(&mut self, nap: Duration) -> Result<()> {
        std::thread::sleep(nap);
        Ok(())
    }
}
