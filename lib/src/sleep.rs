//! Provides the timing backends used to wait between packets
//!
//! Each backend trades accuracy for cost differently:
//! - nano: blocking relative `clock_nanosleep`, the default
//! - select: `select` with no descriptors and a timeout
//! - ioport: calibrated writes to I/O port 0x80 (Linux x86, root only)
//! - abstime: `clock_nanosleep` against an absolute monotonic deadline
//! - gtod: busy spin on the monotonic clock
//!
//! The backend is chosen once at startup with [`new`]. Methods the current
//! platform cannot provide fail there rather than on the first packet.

#[cfg(test)]
use mockall::{automock, predicate::*};

use std::time::Duration;
use strum::{Display, EnumIter, EnumString};

use crate::error::{ReplayLibError, Result};

mod abstime;
mod gtod;
mod ioport;
mod nanosleep;
mod select;

pub use abstime::AbsTimeSleeper;
pub use gtod::SpinSleeper;
pub use ioport::{IoPortSleeper, stalls_for};
pub use nanosleep::NanoSleeper;
pub use select::SelectSleeper;

/// Timing primitive used to wait between packets
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum SleepMethod {
    /// Blocking nanosleep
    #[default]
    #[strum(serialize = "nano")]
    Nanosleep,
    /// select(2) with a timeout
    #[strum(serialize = "select")]
    Select,
    /// Calibrated I/O port stalls
    #[strum(serialize = "ioport")]
    IoPort,
    /// clock_nanosleep against an absolute monotonic deadline
    #[strum(serialize = "abstime")]
    AbsTime,
    /// Busy spin on the clock
    #[strum(serialize = "gtod")]
    Gettimeofday,
}

impl SleepMethod {
    /// Parses a method name, mapping unknown names to
    /// [`ReplayLibError::UnknownSleepMethod`]
    pub fn parse(name: &str) -> Result<Self> {
        name.parse::<SleepMethod>()
            .map_err(|_| ReplayLibError::UnknownSleepMethod(name.to_string()))
    }

    /// Returns true if this platform can provide the method. Support does
    /// not imply permission; ioport may still fail to initialize.
    pub fn is_supported(&self) -> bool {
        match self {
            SleepMethod::Nanosleep | SleepMethod::Gettimeofday => true,
            SleepMethod::Select => select::SUPPORTED,
            SleepMethod::IoPort => ioport::SUPPORTED,
            SleepMethod::AbsTime => abstime::SUPPORTED,
        }
    }
}

#[cfg_attr(test, automock)]
/// Trait implemented by every timing backend
pub trait Sleeper {
    /// Returns the method this backend implements
    fn method(&self) -> SleepMethod;

    /// Waits for approximately `nap`. An interrupted wait counts as
    /// completed.
    fn sleep_for(&mut self, nap: Duration) -> Result<()>;
}

/// Returns an initialized backend for the requested method
///
/// # Errors
///
/// Returns [`ReplayLibError::SleepUnsupported`] when the platform lacks the
/// method and [`ReplayLibError::SleepInit`] when it exists but cannot be
/// set up, e.g. ioport without root privileges
///
/// ```
/// # use r_replaylib::sleep::{self, SleepMethod};
/// # use std::time::Duration;
/// let mut sleeper = sleep::new(SleepMethod::Nanosleep).unwrap();
/// sleeper.sleep_for(Duration::from_micros(50)).unwrap();
/// ```
pub fn new(method: SleepMethod) -> Result<Box<dyn Sleeper>> {
    if !method.is_supported() {
        return Err(ReplayLibError::SleepUnsupported(method));
    }

    log::debug!("initializing {} timing", method);

    let sleeper: Box<dyn Sleeper> = match method {
        SleepMethod::Nanosleep => Box::new(NanoSleeper::new()),
        SleepMethod::Select => Box::new(SelectSleeper::new()?),
        SleepMethod::IoPort => Box::new(IoPortSleeper::new()?),
        SleepMethod::AbsTime => Box::new(AbsTimeSleeper::new()?),
        SleepMethod::Gettimeofday => Box::new(SpinSleeper::new()),
    };

    Ok(sleeper)
}

#[cfg(test)]
#[path = "./sleep_tests.rs"]
mod tests;
