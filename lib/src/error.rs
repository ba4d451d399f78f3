//! Custom Error and Result types for this library

use std::sync::{MutexGuard, PoisonError};
use thiserror::Error;

use crate::{
    config::RateConfigBuilderError, packet::Sender, sleep::SleepMethod,
    trace::TimestampTrace,
};

/// Custom Error type for this library
#[derive(Error, Debug)]
pub enum ReplayLibError {
    /// The controller was asked to pace a packet while configured for top
    /// speed replay. Callers must bypass pacing entirely in that mode.
    #[error("top speed replay must not be paced")]
    TopSpeedPacing,

    /// A rate configuration value is out of range
    #[error("invalid rate configuration: {_0}")]
    InvalidRateConfig(String),

    /// A rate configuration named a speed mode this library does not know
    #[error("unknown or unsupported speed mode: {_0}")]
    UnknownSpeedMode(String),

    /// A sleep method name could not be parsed
    #[error("unknown timer mode: {_0}")]
    UnknownSleepMethod(String),

    /// Error resulting from failure to build a rate configuration
    #[error("failed to build rate configuration: {_0}")]
    RateConfigBuild(#[from] RateConfigBuilderError),

    /// Error decoding a rate configuration document
    #[error("failed to parse rate configuration: {_0}")]
    ConfigParse(#[from] serde_json::Error),

    /// The selected sleep method is not available on this platform
    #[error("platform does not support {_0} timing")]
    SleepUnsupported(SleepMethod),

    /// The selected sleep method failed to initialize
    #[error("failed to initialize {method} timing: {error}")]
    SleepInit {
        /// The sleep method being initialized
        method: SleepMethod,
        /// The underlying failure
        error: String,
    },

    /// A sleep method failed while pacing
    #[error("{method} sleep failed: {error}")]
    Sleep {
        /// The sleep method in use
        method: SleepMethod,
        /// The underlying failure
        error: String,
    },

    /// The operator prompt used by one-at-a-time replay could not be read
    #[error("unable to process user input: {_0}")]
    OperatorInput(String),

    /// Error reading the next packet from a capture
    #[error("packet source error: {_0}")]
    PacketSource(String),

    /// Error coming directly off the wire
    #[error("wire error: {_0}")]
    Wire(String),

    /// Error obtaining lock on packet sender
    #[error("failed to get lock on packet sender: {_0}")]
    PacketSenderLock(String),

    /// Error obtaining lock on the timestamp trace
    #[error("failed to get lock on timestamp trace: {_0}")]
    TraceLock(String),
}

impl<'a> From<PoisonError<MutexGuard<'a, dyn Sender + 'static>>>
    for ReplayLibError
{
    fn from(value: PoisonError<MutexGuard<'a, dyn Sender + 'static>>) -> Self {
        Self::PacketSenderLock(value.to_string())
    }
}

impl<'a> From<PoisonError<MutexGuard<'a, dyn TimestampTrace + 'static>>>
    for ReplayLibError
{
    fn from(
        value: PoisonError<MutexGuard<'a, dyn TimestampTrace + 'static>>,
    ) -> Self {
        Self::TraceLock(value.to_string())
    }
}

impl ReplayLibError {
    /// Converter for errors raised by a sleep backend mid-session
    pub fn from_sleep_error(
        method: SleepMethod,
        error: impl std::fmt::Display,
    ) -> Self {
        Self::Sleep {
            method,
            error: error.to_string(),
        }
    }

    /// Converter for errors raised while initializing a sleep backend
    pub fn from_sleep_init_error(
        method: SleepMethod,
        error: impl std::fmt::Display,
    ) -> Self {
        Self::SleepInit {
            method,
            error: error.to_string(),
        }
    }
}

/// Custom Result type for this library. All Errors exposed by this library
/// will be returned as [`ReplayLibError`]
pub type Result<T> = std::result::Result<T, ReplayLibError>;
