use std::time::Duration;

use crate::error::{ReplayLibError, Result};

use super::{SleepMethod, Sleeper};

pub(super) const SUPPORTED: bool = cfg!(all(
    target_os = "linux",
    target_env = "gnu",
    any(target_arch = "x86", target_arch = "x86_64")
));

/// POST diagnostic port; writes to it stall the CPU for roughly a bus cycle
/// without side effects
pub const IOPORT_SLEEP_PORT: u16 = 0x80;

/// Number of port writes timed during calibration
const CALIBRATION_STALLS: u32 = 1000;

/// Returns how many port writes approximate `nap` when each write costs
/// `ns_per_stall` nanoseconds
pub fn stalls_for(nap: Duration, ns_per_stall: u64) -> u64 {
    let stalls = nap.as_nanos() / ns_per_stall.max(1) as u128;
    u64::try_from(stalls).unwrap_or(u64::MAX)
}

/// Busy wait made of writes to I/O port 0x80. The cost of one write is
/// sampled once at initialization, so accuracy depends on the machine staying
/// at the speed it was calibrated at. Requires root.
#[derive(Debug)]
pub struct IoPortSleeper {
    value: u8,
    ns_per_stall: u64,
}

impl IoPortSleeper {
    /// Requests access to the port and calibrates the cost of one write
    ///
    /// # Errors
    ///
    /// Returns [`ReplayLibError::SleepUnsupported`] off Linux x86 and
    /// [`ReplayLibError::SleepInit`] when port access is denied
    pub fn new() -> Result<Self> {
        if !SUPPORTED {
            return Err(ReplayLibError::SleepUnsupported(SleepMethod::IoPort));
        }

        port::enable(IOPORT_SLEEP_PORT).map_err(|e| {
            ReplayLibError::from_sleep_init_error(SleepMethod::IoPort, e)
        })?;

        let value = port::read(IOPORT_SLEEP_PORT);

        let start = std::time::Instant::now();
        for _ in 0..CALIBRATION_STALLS {
            port::write(value, IOPORT_SLEEP_PORT);
        }
        let per_stall = start.elapsed().as_nanos() / CALIBRATION_STALLS as u128;
        let ns_per_stall = u64::try_from(per_stall).unwrap_or(u64::MAX).max(1);

        log::debug!("calibrated ioport stall at {} ns", ns_per_stall);

        Ok(Self {
            value,
            ns_per_stall,
        })
    }

    /// Returns the calibrated cost of one port write in nanoseconds
    pub fn ns_per_stall(&self) -> u64 {
        self.ns_per_stall
    }
}

impl Sleeper for IoPortSleeper {
    fn method(&self) -> SleepMethod {
        SleepMethod::IoPort
    }

    fn sleep_for(&mut self, nap: Duration) -> Result<()> {
        for _ in 0..stalls_for(nap, self.ns_per_stall) {
            port::write(self.value, IOPORT_SLEEP_PORT);
        }
        Ok(())
    }
}

#[cfg(all(
    target_os = "linux",
    target_env = "gnu",
    any(target_arch = "x86", target_arch = "x86_64")
))]
mod port {
    use nix::errno::Errno;
    use std::arch::asm;

    pub fn enable(port: u16) -> std::result::Result<(), Errno> {
        // SAFETY: ioperm only changes this process's I/O permission bitmap
        let res = unsafe { libc::ioperm(port as libc::c_ulong, 1, 1) };
        if res == -1 {
            return Err(Errno::last());
        }
        Ok(())
    }

    pub fn read(port: u16) -> u8 {
        let value: u8;
        // SAFETY: only called after enable() granted access to the port
        unsafe {
            asm!(
                "in al, dx",
                out("al") value,
                in("dx") port,
                options(nomem, nostack, preserves_flags)
            );
        }
        value
    }

    pub fn write(value: u8, port: u16) {
        // SAFETY: only called after enable() granted access to the port
        unsafe {
            asm!(
                "out dx, al",
                in("dx") port,
                in("al") value,
                options(nomem, nostack, preserves_flags)
            );
        }
    }
}

#[cfg(not(all(
    target_os = "linux",
    target_env = "gnu",
    any(target_arch = "x86", target_arch = "x86_64")
)))]
mod port {
    pub fn enable(_port: u16) -> std::result::Result<(), &'static str> {
        Err("platform does not support IO port timing")
    }

    pub fn read(_port: u16) -> u8 {
        0
    }

    pub fn write(_value: u8, _port: u16) {
        std::hint::spin_loop();
    }
}
