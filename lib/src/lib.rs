//! Library package for replaying captured packets at a controlled rate
//!
//! Before each packet is sent a [`pacing::RateController`] works out how long
//! to wait and sleeps for it using one of several [`sleep`] backends. Pacing
//! can follow the captured timestamps scaled by a multiplier, hold a target
//! throughput or packet rate, wait for an operator, or be switched off.
//!
//! # Examples
//!
//! ## Packet Rate Bursts
//!
//! <https://github.com/robgonnella/r-replay/blob/main/lib/examples/packet-rate.rs>
//!
//! ```bash
//! cargo run --example packet-rate -p r-replaylib
//! ```
//!
//! ## Throughput Replay
//!
//! <https://github.com/robgonnella/r-replay/blob/main/lib/examples/replay-throughput.rs>
//!
//! ```bash
//! sudo -E cargo run --example replay-throughput -p r-replaylib
//! ```
//!
//! ## Replay at twice the captured speed
//!
//! ```no_run
//! # use r_replaylib::config::{RateConfig, SpeedMode};
//! # use r_replaylib::pacing::{RateController, ThroughputProgress};
//! # use r_replaylib::sleep::{self, SleepMethod};
//! # use r_replaylib::timing::{PacketTiming, Timestamp};
//! let config = RateConfig::new(SpeedMode::Multiplier { speed: 2.0 }).unwrap();
//! let mut controller =
//!     RateController::new(config, sleep::new(SleepMethod::Nanosleep).unwrap());
//! let mut state = controller.begin_session();
//! let timing = PacketTiming::new(
//!     Timestamp::from_micros(1_500_000),
//!     Some(Timestamp::from_micros(1_000_000)),
//! );
//! // sleeps 250ms
//! controller
//!     .compute_and_apply_delay(
//!         &timing,
//!         64,
//!         &ThroughputProgress::default(),
//!         &mut state,
//!     )
//!     .unwrap();
//! ```
//!
//! ## Load a rate configuration
//!
//! ```
//! # use r_replaylib::config::{RateConfig, SpeedMode};
//! let config = RateConfig::from_json(
//!     r#"{"mode": "throughput", "bps": 10000000, "max_sleep_us": 500000}"#,
//! )
//! .unwrap();
//! assert_eq!(config.mode(), &SpeedMode::Throughput { bps: 10_000_000 });
//! ```

#![deny(missing_docs)]
pub mod config;
pub mod error;
pub mod network;
pub mod pacing;
pub mod packet;
pub mod prompt;
pub mod replay;
pub mod sleep;
pub mod timing;
pub mod trace;
pub mod wire;
