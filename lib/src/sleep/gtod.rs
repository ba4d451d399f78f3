use std::{
    hint,
    time::{Duration, Instant},
};

use crate::error::Result;

use super::{SleepMethod, Sleeper};

/// Busy spin until the requested time has passed. Burns a core but never
/// hands control to the scheduler.
#[derive(Debug, Default)]
pub struct SpinSleeper;

impl SpinSleeper {
    /// Returns a new SpinSleeper
    pub fn new() -> Self {
        Self
    }
}

impl Sleeper for SpinSleeper {
    fn method(&self) -> SleepMethod {
        SleepMethod::Gettimeofday
    }

    fn sleep_for(&mut self, nap: Duration) -> Result<()> {
        let deadline = Instant::now() + nap;
        while Instant::now() < deadline {
            hint::spin_loop();
        }
        Ok(())
    }
}
