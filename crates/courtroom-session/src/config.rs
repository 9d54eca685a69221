//! Session timing configuration.

use std::num::ParseIntError;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A duration variable could not be parsed.
    #[error("{var} must be a duration such as \"2s\" or \"100ms\": {source}")]
    InvalidDuration {
        /// The offending variable.
        var: &'static str,
        /// The parse failure.
        #[source]
        source: humantime::DurationError,
    },

    /// A numeric variable could not be parsed.
    #[error("{var} must be a positive integer: {source}")]
    InvalidNumber {
        /// The offending variable.
        var: &'static str,
        /// The parse failure.
        #[source]
        source: ParseIntError,
    },

    /// A value parsed but is not usable.
    #[error("{var} is out of range: {reason}")]
    OutOfRange {
        /// The offending variable.
        var: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Timings and sizes of a courtroom session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Ticks an unattended step waits before auto-advancing.
    pub auto_mode_ticks: u32,
    /// Length of one auto-mode tick.
    pub auto_mode_tick: Duration,
    /// Pause between review drain passes.
    pub review_drain_interval: Duration,
    /// Pause after dequeuing each review operation.
    pub review_pacing: Duration,
    /// Pause before the refresh that closes a drain pass.
    pub review_refresh_settle: Duration,
    /// Pause between the end of narration and the follow-up advance.
    pub narration_settle: Duration,
    /// Capacity of each observer's notification channel.
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_mode_ticks: 5,
            auto_mode_tick: Duration::from_secs(1),
            review_drain_interval: Duration::from_secs(2),
            review_pacing: Duration::from_millis(100),
            review_refresh_settle: Duration::from_millis(100),
            narration_settle: Duration::from_millis(500),
            channel_capacity: 64,
        }
    }
}

const AUTO_MODE_TICKS: &str = "COURTROOM_AUTO_MODE_TICKS";
const AUTO_MODE_TICK: &str = "COURTROOM_AUTO_MODE_TICK";
const REVIEW_DRAIN_INTERVAL: &str = "COURTROOM_REVIEW_DRAIN_INTERVAL";
const REVIEW_PACING: &str = "COURTROOM_REVIEW_PACING";
const REVIEW_REFRESH_SETTLE: &str = "COURTROOM_REVIEW_REFRESH_SETTLE";
const NARRATION_SETTLE: &str = "COURTROOM_NARRATION_SETTLE";
const CHANNEL_CAPACITY: &str = "COURTROOM_CHANNEL_CAPACITY";

impl SessionConfig {
    /// Reads the configuration from `COURTROOM_*` environment variables,
    /// falling back to the defaults for unset ones.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable does not parse or is zero
    /// where zero is not allowed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`SessionConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`SessionConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let duration = |var: &'static str, default: Duration| match lookup(var) {
            Some(raw) => humantime::parse_duration(raw.trim())
                .map_err(|source| ConfigError::InvalidDuration { var, source }),
            None => Ok(default),
        };

        let auto_mode_ticks = match lookup(AUTO_MODE_TICKS) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|source| ConfigError::InvalidNumber {
                    var: AUTO_MODE_TICKS,
                    source,
                })?,
            None => defaults.auto_mode_ticks,
        };
        if auto_mode_ticks == 0 {
            return Err(ConfigError::OutOfRange {
                var: AUTO_MODE_TICKS,
                reason: "auto-mode needs at least one tick",
            });
        }

        let channel_capacity = match lookup(CHANNEL_CAPACITY) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|source| ConfigError::InvalidNumber {
                    var: CHANNEL_CAPACITY,
                    source,
                })?,
            None => defaults.channel_capacity,
        };
        if channel_capacity == 0 {
            return Err(ConfigError::OutOfRange {
                var: CHANNEL_CAPACITY,
                reason: "channels need room for at least one notification",
            });
        }

        Ok(Self {
            auto_mode_ticks,
            auto_mode_tick: duration(AUTO_MODE_TICK, defaults.auto_mode_tick)?,
            review_drain_interval: duration(REVIEW_DRAIN_INTERVAL, defaults.review_drain_interval)?,
            review_pacing: duration(REVIEW_PACING, defaults.review_pacing)?,
            review_refresh_settle: duration(REVIEW_REFRESH_SETTLE, defaults.review_refresh_settle)?,
            narration_settle: duration(NARRATION_SETTLE, defaults.narration_settle)?,
            channel_capacity,
        })
    }
}
