use std::time::Duration;

use crate::error::{ReplayLibError, Result};

use super::{SleepMethod, Sleeper};

pub(super) const SUPPORTED: bool = cfg!(unix);

/// Sleep backed by select(2) with no descriptor sets
#[derive(Debug)]
pub struct SelectSleeper {
    _private: (),
}

impl SelectSleeper {
    /// Returns a new SelectSleeper or an error on platforms without select
    pub fn new() -> Result<Self> {
        if !SUPPORTED {
            return Err(ReplayLibError::SleepUnsupported(SleepMethod::Select));
        }
        Ok(Self { _private: () })
    }
}

impl Sleeper for SelectSleeper {
    fn method(&self) -> SleepMethod {
        SleepMethod::Select
    }

    #[cfg(unix)]
    fn sleep_for(&mut self, nap: Duration) -> Result<()> {
        use nix::{errno::Errno, sys::select::select, sys::time::TimeVal};

        let mut timeout = TimeVal::new(
            nap.as_secs() as libc::time_t,
            nap.subsec_micros() as libc::suseconds_t,
        );

        match select(None, None, None, None, &mut timeout) {
            Ok(_) | Err(Errno::EINTR) => Ok(()),
            Err(e) => {
                Err(ReplayLibError::from_sleep_error(SleepMethod::Select, e))
            }
        }
    }

    #[cfg(not(unix))]
    fn sleep_for(&mut self, _nap: Duration) -> Result<()> {
        Err(ReplayLibError::SleepUnsupported(SleepMethod::Select))
    }
}
