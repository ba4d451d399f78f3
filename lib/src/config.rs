//! Provides the rate configuration consumed by the pacer
//!
//! A [`RateConfig`] is resolved once before replay starts and never changes
//! during a session. It can be assembled with [`RateConfigBuilder`] or read
//! from a JSON document with [`RateConfig::from_json`].
//!
//! ```
//! # use r_replaylib::config::{RateConfig, SpeedMode};
//! # use r_replaylib::timing::NapDuration;
//! let config = RateConfig::builder()
//!     .mode(SpeedMode::PacketRate { pps: 1000.0, pps_multi: 0 })
//!     .max_sleep(NapDuration::from_millis(10))
//!     .build()
//!     .unwrap();
//!
//! assert!(!config.mode().is_top_speed());
//! ```

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::{
    error::{ReplayLibError, Result},
    timing::NapDuration,
};

/// Names accepted for the "mode" field of a JSON rate configuration
pub const SPEED_MODE_NAMES: [&str; 5] = [
    "multiplier",
    "throughput",
    "packet_rate",
    "one_at_a_time",
    "top_speed",
];

/// Strategy used to space packets out during replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SpeedMode {
    /// Replay at the captured inter-packet gaps divided by `speed`
    Multiplier {
        /// Factor applied to captured timing, 2.0 replays twice as fast
        speed: f64,
    },
    /// Replay at a constant throughput ignoring captured timing
    Throughput {
        /// Target rate in bits per second
        bps: u64,
    },
    /// Replay at a constant packet rate ignoring captured timing
    PacketRate {
        /// Target rate in packets per second
        pps: f64,
        /// Number of packets sent back to back per interval, 0 disables
        /// bursting
        #[serde(default)]
        pps_multi: u32,
    },
    /// Prompt the operator for how many packets to send next
    OneAtATime,
    /// Send as fast as possible without pacing
    TopSpeed,
}

impl SpeedMode {
    /// Returns true for the unpaced mode
    pub fn is_top_speed(&self) -> bool {
        matches!(self, SpeedMode::TopSpeed)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            SpeedMode::Multiplier { speed }
                if !(speed.is_finite() && *speed > 0.0) =>
            {
                Err(format!("multiplier must be greater than 0: {speed}"))
            }
            SpeedMode::Throughput { bps } if *bps == 0 => {
                Err("throughput must be greater than 0 bits/sec".into())
            }
            SpeedMode::PacketRate { pps, .. }
                if !(pps.is_finite() && *pps > 0.0) =>
            {
                Err(format!("packet rate must be greater than 0: {pps}"))
            }
            _ => Ok(()),
        }
    }
}

impl Default for SpeedMode {
    fn default() -> Self {
        SpeedMode::Multiplier { speed: 1.0 }
    }
}

impl Display for SpeedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeedMode::Multiplier { speed } => write!(f, "multiplier x{speed}"),
            SpeedMode::Throughput { bps } => {
                write!(f, "{:.3} Mbps", *bps as f64 / 1_000_000.0)
            }
            SpeedMode::PacketRate { pps, pps_multi } if *pps_multi > 0 => {
                write!(f, "{pps} pps in bursts of {pps_multi}")
            }
            SpeedMode::PacketRate { pps, .. } => write!(f, "{pps} pps"),
            SpeedMode::OneAtATime => write!(f, "one at a time"),
            SpeedMode::TopSpeed => write!(f, "top speed"),
        }
    }
}

fn serialize_max_sleep<S>(
    val: &Option<NapDuration>,
    s: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match val {
        Some(nap) => s.serialize_some(&(nap.as_duration().as_micros() as u64)),
        None => s.serialize_none(),
    }
}

fn deserialize_max_sleep<'de, D>(
    d: D,
) -> std::result::Result<Option<NapDuration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let micros = Option::<u64>::deserialize(d)?;
    Ok(micros.filter(|m| *m > 0).map(NapDuration::from_micros))
}

/// Resolved pacing configuration for a replay session
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(try_from = "RateConfigDocument")]
pub struct RateConfig {
    /// Pacing strategy
    #[builder(default)]
    #[serde(flatten)]
    mode: SpeedMode,
    /// Upper bound on any single nap, serialized as `max_sleep_us`
    #[builder(default, setter(custom))]
    #[serde(rename = "max_sleep_us", serialize_with = "serialize_max_sleep")]
    max_sleep: Option<NapDuration>,
}

impl RateConfigBuilder {
    /// Sets the ceiling applied to every nap. A zero ceiling means no
    /// ceiling.
    pub fn max_sleep<VALUE: Into<Option<NapDuration>>>(
        &mut self,
        value: VALUE,
    ) -> &mut Self {
        self.max_sleep = Some(value.into().filter(|m| !m.is_zero()));
        self
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match &self.mode {
            Some(mode) => mode.validate(),
            None => Ok(()),
        }
    }
}

/// Unvalidated wire form of a [`RateConfig`]
#[derive(Deserialize)]
struct RateConfigDocument {
    #[serde(flatten)]
    mode: SpeedMode,
    #[serde(
        default,
        rename = "max_sleep_us",
        deserialize_with = "deserialize_max_sleep"
    )]
    max_sleep: Option<NapDuration>,
}

impl TryFrom<RateConfigDocument> for RateConfig {
    type Error = ReplayLibError;

    fn try_from(document: RateConfigDocument) -> Result<Self> {
        document
            .mode
            .validate()
            .map_err(ReplayLibError::InvalidRateConfig)?;

        Ok(Self {
            mode: document.mode,
            max_sleep: document.max_sleep.filter(|m| !m.is_zero()),
        })
    }
}

impl RateConfig {
    /// Returns builder for RateConfig
    pub fn builder() -> RateConfigBuilder {
        RateConfigBuilder::default()
    }

    /// Returns a validated configuration for the given mode without a sleep
    /// ceiling
    pub fn new(mode: SpeedMode) -> Result<Self> {
        Ok(Self::builder().mode(mode).build()?)
    }

    /// Reads a configuration from JSON such as
    /// `{"mode": "packet_rate", "pps": 500.0, "max_sleep_us": 2000}`
    ///
    /// # Errors
    ///
    /// Returns [`ReplayLibError::UnknownSpeedMode`] when the "mode" field
    /// names a mode outside of [`SPEED_MODE_NAMES`] and
    /// [`ReplayLibError::InvalidRateConfig`] for out of range speed values
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        match value.get("mode") {
            Some(serde_json::Value::String(name))
                if !SPEED_MODE_NAMES.contains(&name.as_str()) =>
            {
                return Err(ReplayLibError::UnknownSpeedMode(name.clone()));
            }
            Some(serde_json::Value::String(_)) => {}
            Some(other) => {
                return Err(ReplayLibError::UnknownSpeedMode(other.to_string()));
            }
            None => {
                return Err(ReplayLibError::InvalidRateConfig(
                    "missing \"mode\" field".into(),
                ));
            }
        }

        let document: RateConfigDocument = serde_json::from_value(value)?;

        RateConfig::try_from(document)
    }

    /// Returns the pacing strategy
    pub fn mode(&self) -> &SpeedMode {
        &self.mode
    }

    /// Returns the ceiling applied to every nap, if any
    pub fn max_sleep(&self) -> Option<NapDuration> {
        self.max_sleep
    }
}

#[cfg(test)]
#[path = "./config_tests.rs"]
mod tests;
