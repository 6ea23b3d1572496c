use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{CycleConfig, Phase};

/// Every state change in the cycle engine produces an Event.
/// The CLI prints them as JSON; embedders subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// A phase ran out on its own; the countdown snapped to `to`'s
    /// full duration on the same tick.
    PhaseEnded {
        from: Phase,
        to: Phase,
        completed_focus_cycles: u32,
        at: DateTime<Utc>,
    },
    /// The user forced the transition without waiting out the countdown.
    PhaseSkipped {
        from: Phase,
        to: Phase,
        completed_focus_cycles: u32,
        at: DateTime<Utc>,
    },
    ConfigUpdated {
        config: CycleConfig,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        remaining_secs: u64,
        total_secs: u64,
        completed_focus_cycles: u32,
        running: bool,
        paused: bool,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}
