use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Phase::Focus)
    }
}

/// The four numeric knobs of a Pomodoro cycle.
///
/// All durations are minutes and must be greater than zero;
/// `cycles_before_long_break` must be at least 1. Values are only ever
/// changed through explicit configuration updates, never by the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
    #[serde(default = "default_cycles_before_long_break")]
    pub cycles_before_long_break: u32,
}

// Default functions
fn default_focus_minutes() -> u32 {
    25
}
fn default_short_break_minutes() -> u32 {
    5
}
fn default_long_break_minutes() -> u32 {
    15
}
fn default_cycles_before_long_break() -> u32 {
    4
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            cycles_before_long_break: default_cycles_before_long_break(),
        }
    }
}

impl CycleConfig {
    /// Configured duration of `phase` in minutes.
    pub fn minutes(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Focus => self.focus_minutes,
            Phase::ShortBreak => self.short_break_minutes,
            Phase::LongBreak => self.long_break_minutes,
        }
    }

    /// Configured duration of `phase` in seconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn duration_secs(&self, phase: Phase) -> u64 {
        u64::from(self.minutes(phase)).saturating_mul(60)
    }

    /// Reject zero durations and a zero long-break divisor.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        if self.focus_minutes == 0 {
            return Err(invalid("cycle.focus_minutes", "duration must be greater than zero"));
        }
        if self.short_break_minutes == 0 {
            return Err(invalid(
                "cycle.short_break_minutes",
                "duration must be greater than zero",
            ));
        }
        if self.long_break_minutes == 0 {
            return Err(invalid(
                "cycle.long_break_minutes",
                "duration must be greater than zero",
            ));
        }
        if self.cycles_before_long_break == 0 {
            return Err(invalid("cycle.cycles_before_long_break", "must be at least 1"));
        }
        Ok(())
    }

    /// A copy of `self` with the patch's set fields applied.
    pub fn merged(&self, patch: &CycleConfigPatch) -> CycleConfig {
        CycleConfig {
            focus_minutes: patch.focus_minutes.unwrap_or(self.focus_minutes),
            short_break_minutes: patch.short_break_minutes.unwrap_or(self.short_break_minutes),
            long_break_minutes: patch.long_break_minutes.unwrap_or(self.long_break_minutes),
            cycles_before_long_break: patch
                .cycles_before_long_break
                .unwrap_or(self.cycles_before_long_break),
        }
    }
}

/// All-optional mirror of [`CycleConfig`] for partial updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfigPatch {
    #[serde(default)]
    pub focus_minutes: Option<u32>,
    #[serde(default)]
    pub short_break_minutes: Option<u32>,
    #[serde(default)]
    pub long_break_minutes: Option<u32>,
    #[serde(default)]
    pub cycles_before_long_break: Option<u32>,
}

impl CycleConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.focus_minutes.is_none()
            && self.short_break_minutes.is_none()
            && self.long_break_minutes.is_none()
            && self.cycles_before_long_break.is_none()
    }
}
