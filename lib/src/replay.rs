//! Provides the send loop that replays captured packets through the pacer
//!
//! ```no_run
//! # use r_replaylib::config::{RateConfig, SpeedMode};
//! # use r_replaylib::error::Result;
//! # use r_replaylib::pacing::{RateController, ThroughputProgress};
//! # use r_replaylib::packet::{CapturedPacket, PacketSource};
//! # use r_replaylib::replay::Replayer;
//! # use r_replaylib::{network, sleep, wire};
//! # struct Empty;
//! # impl PacketSource for Empty {
//! #     fn next_packet(&mut self) -> Result<Option<CapturedPacket>> {
//! #         Ok(None)
//! #     }
//! # }
//! let config = RateConfig::new(SpeedMode::Multiplier { speed: 2.0 }).unwrap();
//! let sleeper = sleep::new(sleep::SleepMethod::Nanosleep).unwrap();
//! let interface = network::get_default_interface().unwrap();
//! let mut replayer = Replayer::new(
//!     RateController::new(config, sleeper),
//!     wire::default(&interface).unwrap(),
//! );
//! let mut state = replayer.begin_session();
//! let mut progress = ThroughputProgress::default();
//! replayer.replay(&mut Empty, &mut state, &mut progress).unwrap();
//! ```

use log::*;
use serde::Serialize;
use std::time::Duration;

use crate::{
    error::Result,
    pacing::{PacingState, RateController, ThroughputProgress},
    packet::{CapturedPacket, PacketSource},
    timing::{PacketTiming, Timestamp},
    wire::Wire,
};

/// Sends packets from a [`PacketSource`] over a [`Wire`], pacing each one
/// with a [`RateController`]
pub struct Replayer {
    controller: RateController,
    wire: Wire,
    limit: Option<u64>,
}

impl Replayer {
    /// Returns a new Replayer without a packet limit
    pub fn new(controller: RateController, wire: Wire) -> Self {
        Self {
            controller,
            wire,
            limit: None,
        }
    }

    /// Stops replay once `limit` packets have been attempted across all
    /// captures of the session
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns the controller pacing this replay
    pub fn controller(&self) -> &RateController {
        &self.controller
    }

    /// Returns fresh pacing state for a new session
    pub fn begin_session(&self) -> PacingState {
        self.controller.begin_session()
    }

    /// Returns true once the packet limit, if any, has been reached
    pub fn limit_reached(&self, progress: &ThroughputProgress) -> bool {
        self.limit
            .is_some_and(|limit| progress.packets_sent + progress.failed >= limit)
    }

    /// Replays one capture and returns the number of packets taken from it.
    /// Inter-packet timing restarts with each capture while `state` and
    /// `progress` carry across the whole session.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the source or the controller. Failures to
    /// send an individual packet are counted in `progress.failed` instead.
    pub fn replay(
        &mut self,
        source: &mut dyn PacketSource,
        state: &mut PacingState,
        progress: &mut ThroughputProgress,
    ) -> Result<u64> {
        let top_speed = self.controller.config().mode().is_top_speed();
        let mut previous: Option<Timestamp> = None;
        let mut skip_length: u64 = 0;
        let mut processed = 0;

        loop {
            if self.limit_reached(progress) {
                debug!("packet limit reached");
                break;
            }

            let Some(packet) = source.next_packet()? else {
                break;
            };

            let len = packet.len() as u64;

            if skip_length > len {
                skip_length -= len;
            } else if !top_speed {
                let timing = PacketTiming::new(packet.timestamp, previous);
                let pacing = self.controller.compute_and_apply_delay(
                    &timing,
                    packet.len(),
                    progress,
                    state,
                )?;
                skip_length = pacing.skip;
            }

            self.send(&packet, progress)?;

            previous = Some(packet.timestamp);
            processed += 1;
        }

        Ok(processed)
    }

    fn send(
        &self,
        packet: &CapturedPacket,
        progress: &mut ThroughputProgress,
    ) -> Result<()> {
        let mut sender = self.wire.lock()?;

        match sender.send(&packet.data) {
            Ok(()) => {
                progress.packets_sent += 1;
                progress.bytes_sent += packet.len() as u64;
            }
            Err(e) => {
                warn!(
                    "unable to send packet #{}: {}",
                    progress.next_packet_number(),
                    e
                );
                progress.failed += 1;
            }
        }

        Ok(())
    }
}

/// Summary of a finished replay session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayStats {
    /// Packets successfully sent
    pub packets_sent: u64,
    /// Bytes successfully sent
    pub bytes_sent: u64,
    /// Packets that failed to send
    pub failed: u64,
    /// Wall clock duration of the session in microseconds
    pub elapsed_us: u64,
    /// Average packets per second
    pub pps: f64,
    /// Average throughput in megabits per second
    pub mbps: f64,
}

impl ReplayStats {
    /// Summarizes `progress` accumulated over `elapsed`
    pub fn new(progress: &ThroughputProgress, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();

        let (pps, mbps) = if secs > 0.0 {
            (
                progress.packets_sent as f64 / secs,
                progress.bytes_sent as f64 * 8.0 / secs / 1_000_000.0,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            packets_sent: progress.packets_sent,
            bytes_sent: progress.bytes_sent,
            failed: progress.failed,
            elapsed_us: elapsed.as_micros() as u64,
            pps,
            mbps,
        }
    }
}

#[cfg(test)]
#[path = "./replay_tests.rs"]
mod tests;
