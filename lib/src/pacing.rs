//! Decides how long to wait before each packet and waits it out
//!
//! A [`RateController`] is created once per replay session together with a
//! [`PacingState`] and is then called once per packet, right before the
//! packet is sent. The controller computes a nap from the configured
//! [`SpeedMode`], bounds it by the configured maximum, and hands it to the
//! session's [`Sleeper`].
//!
//! Throughput pacing may fall behind schedule. Rather than sleeping negative
//! time it returns skip advice: a number of upcoming bytes the caller should
//! send without asking the controller again.

use log::*;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::{
    config::{RateConfig, SpeedMode},
    error::{ReplayLibError, Result},
    prompt::CountPrompt,
    sleep::Sleeper,
    timing::{Clock, MonotonicClock, NapDuration, PacketTiming},
    trace::{TimestampTrace, TraceEntry},
};

pub mod accelerator;
pub mod drift;

use accelerator::Accelerator;

/// Number of upcoming bytes the caller should send unpaced to catch up with
/// a throughput schedule
pub type SkipAdvice = u64;

/// Send counters maintained by the caller across a session
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct ThroughputProgress {
    /// Bytes successfully put on the wire
    pub bytes_sent: u64,
    /// Packets successfully put on the wire
    pub packets_sent: u64,
    /// Packets the sender failed to transmit
    pub failed: u64,
}

impl ThroughputProgress {
    /// Returns the 1-based number of the packet about to be sent
    pub fn next_packet_number(&self) -> u64 {
        self.packets_sent + self.failed + 1
    }
}

/// Pacing bookkeeping that lives for one replay session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingState {
    accelerator: Accelerator,
    first_invocation: bool,
    cached_packet_rate_nap: Option<NapDuration>,
    mbps_start_time_us: Option<u64>,
    time_anomalies: u64,
}

impl PacingState {
    /// Returns fresh state. The throughput anchor is taken from the first
    /// throughput computation.
    pub fn new() -> Self {
        Self {
            accelerator: Accelerator::new(),
            first_invocation: true,
            cached_packet_rate_nap: None,
            mbps_start_time_us: None,
            time_anomalies: 0,
        }
    }

    /// Returns fresh state anchored at `start_us` for throughput pacing
    pub fn with_start_time(start_us: u64) -> Self {
        Self {
            mbps_start_time_us: Some(start_us),
            ..Self::new()
        }
    }

    /// Returns how many upcoming packets skip pacing
    pub fn accelerator_count(&self) -> u32 {
        self.accelerator.remaining()
    }

    /// Returns true until the first packet of the session has been paced
    /// in burst mode
    pub fn is_first_invocation(&self) -> bool {
        self.first_invocation
    }

    /// Returns the packet rate nap once it has been computed
    pub fn cached_packet_rate_nap(&self) -> Option<NapDuration> {
        self.cached_packet_rate_nap
    }

    /// Returns the clock reading throughput pacing measures from
    pub fn mbps_start_time_us(&self) -> Option<u64> {
        self.mbps_start_time_us
    }

    /// Returns how many packets were found to precede their predecessor
    pub fn time_anomalies(&self) -> u64 {
        self.time_anomalies
    }
}

impl Default for PacingState {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of pacing one packet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacing {
    /// Delay handed to the sleeper, zero when no sleep happened
    pub nap: NapDuration,
    /// Bytes to send unpaced before pacing again
    pub skip: SkipAdvice,
}

/// Per-packet pacing entry point
pub struct RateController {
    config: RateConfig,
    sleeper: Box<dyn Sleeper>,
    clock: Box<dyn Clock>,
    prompt: Option<Box<dyn CountPrompt>>,
    trace: Option<Arc<Mutex<dyn TimestampTrace>>>,
}

impl RateController {
    /// Returns a controller pacing with `config` and waiting with `sleeper`
    pub fn new(config: RateConfig, sleeper: Box<dyn Sleeper>) -> Self {
        Self {
            config,
            sleeper,
            clock: Box::new(MonotonicClock::new()),
            prompt: None,
            trace: None,
        }
    }

    /// Replaces the clock throughput pacing reads
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Attaches the operator prompt required by one-at-a-time replay
    pub fn with_prompt(mut self, prompt: Box<dyn CountPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Attaches a sink for throughput trace entries
    pub fn with_trace(mut self, trace: Arc<Mutex<dyn TimestampTrace>>) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Returns the configuration this controller paces with
    pub fn config(&self) -> &RateConfig {
        &self.config
    }

    /// Returns fresh session state anchored at the current clock reading
    pub fn begin_session(&self) -> PacingState {
        PacingState::with_start_time(self.clock.now_us())
    }

    /// Computes the delay due before the packet described by `timing` and
    /// `len` and sleeps for it. `progress` must not yet count this packet.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayLibError::TopSpeedPacing`] when configured for top
    /// speed, [`ReplayLibError::OperatorInput`] when the one-at-a-time prompt
    /// fails, and any error raised by the sleeper. All of them end the
    /// session.
    pub fn compute_and_apply_delay(
        &mut self,
        timing: &PacketTiming,
        len: usize,
        progress: &ThroughputProgress,
        state: &mut PacingState,
    ) -> Result<Pacing> {
        if state.accelerator.try_consume() {
            return Ok(Pacing::default());
        }

        let mode = self.config.mode().clone();

        if let SpeedMode::PacketRate { pps_multi, .. } = mode {
            if pps_multi > 0 {
                state.accelerator.arm(pps_multi - 1);
                if state.first_invocation {
                    state.first_invocation = false;
                    return Ok(Pacing::default());
                }
            }
        }

        debug!("this packet time: {}", timing.current);
        if let Some(previous) = timing.previous {
            debug!("last packet time: {}", previous);
        }

        let mut skip: SkipAdvice = 0;

        let nap = match mode {
            SpeedMode::Multiplier { speed } => {
                multiplier_nap(timing, speed, progress, state)
            }
            SpeedMode::Throughput { bps } => {
                let (nap, advice) =
                    self.throughput_nap(len, bps, progress, state)?;
                skip = advice;
                nap
            }
            SpeedMode::PacketRate { pps, pps_multi } => {
                packet_rate_nap(pps, pps_multi, state)
            }
            SpeedMode::OneAtATime => {
                self.one_at_a_time(progress, state)?;
                return Ok(Pacing::default());
            }
            SpeedMode::TopSpeed => return Err(ReplayLibError::TopSpeedPacing),
        };

        let clamped = nap.clamp_to(self.config.max_sleep());

        if clamped != nap {
            debug!(
                "was going to sleep for {} but maxsleeping for {}",
                nap, clamped
            );
        }

        if clamped.is_zero() {
            return Ok(Pacing {
                nap: NapDuration::ZERO,
                skip,
            });
        }

        debug!("sleeping: {}", clamped);

        self.sleeper.sleep_for(clamped.as_duration())?;

        Ok(Pacing { nap: clamped, skip })
    }

    fn throughput_nap(
        &self,
        len: usize,
        bps: u64,
        progress: &ThroughputProgress,
        state: &mut PacingState,
    ) -> Result<(NapDuration, SkipAdvice)> {
        let now_us = self.clock.now_us();
        let start_us = *state.mbps_start_time_us.get_or_insert(now_us);
        let bytes_sent = progress.bytes_sent + len as u64;
        let next_tx_us = drift::next_tx_us(bytes_sent, bps);
        let elapsed_us = now_us.saturating_sub(start_us);

        let mut nap = NapDuration::ZERO;
        let mut skip = 0;

        if next_tx_us > elapsed_us {
            nap = NapDuration::from_micros(next_tx_us - elapsed_us);
        } else if elapsed_us > next_tx_us {
            skip = drift::skip_bytes(elapsed_us, next_tx_us, bps);
            debug!(
                "{} us behind schedule, skipping pacing for {} bytes",
                elapsed_us - next_tx_us,
                skip
            );
        }

        if let Some(trace) = &self.trace {
            trace.lock()?.record(TraceEntry {
                bytes_sent,
                now_us,
                elapsed_us,
                next_tx_us,
            });
        }

        debug!("packet size {}\t\tequals\tnap {}", len, nap);

        Ok((nap, skip))
    }

    fn one_at_a_time(
        &mut self,
        progress: &ThroughputProgress,
        state: &mut PacingState,
    ) -> Result<()> {
        let packet_number = progress.next_packet_number();

        let prompt = self.prompt.as_mut().ok_or_else(|| {
            ReplayLibError::OperatorInput(
                "no operator prompt attached for one at a time replay".into(),
            )
        })?;

        let count = prompt.prompt(packet_number)?.max(1);

        state.accelerator.arm(count - 1);

        info!("sending packet #{}", packet_number);

        Ok(())
    }
}

fn multiplier_nap(
    timing: &PacketTiming,
    speed: f64,
    progress: &ThroughputProgress,
    state: &mut PacingState,
) -> NapDuration {
    // first packet of a capture is sent straight away
    let Some(previous) = timing.previous else {
        return NapDuration::ZERO;
    };

    match timing.current.checked_since(previous) {
        Some(delta) => {
            debug!("original packet delta time: {:?}", delta);
            NapDuration::from(delta).div_f64(speed)
        }
        None => {
            warn!(
                "packet #{} has gone back in time!",
                progress.next_packet_number()
            );
            state.time_anomalies += 1;
            NapDuration::ZERO
        }
    }
}

fn packet_rate_nap(
    pps: f64,
    pps_multi: u32,
    state: &mut PacingState,
) -> NapDuration {
    *state.cached_packet_rate_nap.get_or_insert_with(|| {
        let burst = pps_multi.max(1);
        let nanos = 1_000_000_000f64 / pps * burst as f64;
        debug!("sending {} packet(s) per {} nsec", burst, nanos as u64);
        NapDuration::from_nanos(nanos as u64)
    })
}

#[cfg(test)]
#[path = "./pacing_tests.rs"]
mod tests;
