use std::time::Duration;

use thiserror::Error;

/// Largest per-question countdown accepted, in seconds.
pub const MAX_TIME_LIMIT_SECS: u32 = 3600;

/// Countdown used by the timed variant when no explicit budget is given.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSettingsError {
    #[error("time limit must be between 1 and {max} seconds, got {got}")]
    InvalidTimeLimit { got: u32, max: u32 },

    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,
}

/// Per-session clock configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSettings {
    time_limit_secs: Option<u32>,
    tick_interval: Duration,
}

#[derive(Clone, Debug)]
pub struct QuizSettingsDraft {
    /// `None` counts up without bound; `Some(n)` force-expires a question after `n` ticks.
    pub time_limit_secs: Option<u32>,
    pub tick_interval: Duration,
}

impl Default for QuizSettingsDraft {
    fn default() -> Self {
        Self {
            time_limit_secs: None,
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `QuizSettingsError` if the time limit is out of range or the tick
    /// interval is zero.
    pub fn validate(self) -> Result<QuizSettings, QuizSettingsError> {
        if let Some(limit) = self.time_limit_secs {
            if limit == 0 || limit > MAX_TIME_LIMIT_SECS {
                return Err(QuizSettingsError::InvalidTimeLimit {
                    got: limit,
                    max: MAX_TIME_LIMIT_SECS,
                });
            }
        }

        if self.tick_interval.is_zero() {
            return Err(QuizSettingsError::ZeroTickInterval);
        }

        Ok(QuizSettings {
            time_limit_secs: self.time_limit_secs,
            tick_interval: self.tick_interval,
        })
    }
}

impl QuizSettings {
    /// Count-up clock ticking once per second.
    #[must_use]
    pub fn untimed() -> Self {
        Self {
            time_limit_secs: None,
            tick_interval: Duration::from_secs(1),
        }
    }

    /// Countdown variant with the given per-question budget.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError::InvalidTimeLimit` for a zero or oversized budget.
    pub fn countdown(limit_secs: u32) -> Result<Self, QuizSettingsError> {
        QuizSettingsDraft {
            time_limit_secs: Some(limit_secs),
            ..QuizSettingsDraft::default()
        }
        .validate()
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> Option<u32> {
        self.time_limit_secs
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    #[must_use]
    pub fn is_countdown(&self) -> bool {
        self.time_limit_secs.is_some()
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self::untimed()
    }
}
