//! Cycle engine implementation.
//!
//! The cycle engine is a pure state machine. It does not use internal
//! threads or wall-clock reads - the caller is responsible for calling
//! `tick()` once per logical second while the timer is running (see
//! [`CycleTimer`](crate::timer::CycleTimer) for the owned tick task).
//!
//! ## State Transitions
//!
//! ```text
//! Focus -> ShortBreak -> Focus -> ... -> Focus -> LongBreak -> Focus
//! ```
//!
//! A completed Focus phase increments the cycle count; every
//! `cycles_before_long_break`-th cycle transitions to `LongBreak`,
//! the others to `ShortBreak`. Breaks always return to `Focus`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CycleEngine::new(CycleConfig::default());
//! engine.start();
//! // Once per second:
//! engine.tick(); // Returns Some(Event::PhaseEnded) at a phase boundary
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::config::{CycleConfig, CycleConfigPatch, Phase};
use crate::error::ConfigError;
use crate::events::Event;

/// Core cycle state machine.
///
/// Commands return `Some(Event)` when they changed state, `None` when they
/// were a no-op. The engine is serializable so embedders can park it
/// between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleEngine {
    config: CycleConfig,
    phase: Phase,
    /// Remaining time in seconds for the current phase.
    remaining_secs: u64,
    /// Focus phases completed since the last reset.
    completed_focus_cycles: u32,
    /// True only while actively ticking.
    running: bool,
    /// True when stopped without resetting cycle progress.
    paused: bool,
}

impl CycleEngine {
    /// Create a new engine in `Focus`, not running, with the full focus
    /// duration on the clock.
    pub fn new(config: CycleConfig) -> Self {
        let remaining_secs = config.duration_secs(Phase::Focus);
        Self {
            config,
            phase: Phase::Focus,
            remaining_secs,
            completed_focus_cycles: 0,
            running: false,
            paused: true,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn completed_focus_cycles(&self) -> u32 {
        self.completed_focus_cycles
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// Full duration of the current phase in seconds.
    pub fn total_secs(&self) -> u64 {
        self.config.duration_secs(self.phase)
    }

    /// 0.0 .. 100.0 progress within the current phase.
    pub fn progress_percent(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        (total - self.remaining_secs) as f64 / total as f64 * 100.0
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            completed_focus_cycles: self.completed_focus_cycles,
            running: self.running,
            paused: self.paused,
            progress_pct: self.progress_percent(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin (or resume) ticking. Does not reset the countdown.
    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None; // Already running.
        }
        self.running = true;
        self.paused = false;
        Some(Event::TimerStarted {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Suspend ticking without losing cycle progress. Idempotent.
    pub fn pause(&mut self) -> Option<Event> {
        if self.paused {
            return None;
        }
        self.running = false;
        self.paused = true;
        Some(Event::TimerPaused {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Return to a fresh `Focus` phase with zero completed cycles.
    pub fn reset(&mut self) -> Option<Event> {
        self.phase = Phase::Focus;
        self.completed_focus_cycles = 0;
        self.remaining_secs = self.config.duration_secs(Phase::Focus);
        self.running = false;
        self.paused = true;
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Force the tick-expiry transition without waiting out the countdown.
    ///
    /// Counts the cycle only when skipping out of `Focus`. Allowed while
    /// paused; does not implicitly resume.
    pub fn skip(&mut self) -> Option<Event> {
        let from = self.phase;
        let to = self.advance();
        Some(Event::PhaseSkipped {
            from,
            to,
            completed_focus_cycles: self.completed_focus_cycles,
            at: Utc::now(),
        })
    }

    /// One logical one-second advance. No-op unless running.
    ///
    /// The tick that would reach zero fires the phase transition instead,
    /// loading the next phase's full duration on that same tick - the
    /// countdown is never observable at 0.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        if self.remaining_secs > 1 {
            self.remaining_secs -= 1;
            return None;
        }
        let from = self.phase;
        let to = self.advance();
        Some(Event::PhaseEnded {
            from,
            to,
            completed_focus_cycles: self.completed_focus_cycles,
            at: Utc::now(),
        })
    }

    /// Merge the patch's fields into the configuration.
    ///
    /// If the active phase's duration changed, the countdown restarts at
    /// the new full duration.
    ///
    /// # Errors
    /// `ConfigError::InvalidValue` if any resulting duration is 0 or the
    /// long-break divisor is 0; the prior configuration is kept.
    pub fn update_config(&mut self, patch: &CycleConfigPatch) -> Result<Event, ConfigError> {
        let merged = self.config.merged(patch);
        self.apply_config(merged)
    }

    /// Full-replacement variant of [`update_config`](Self::update_config),
    /// used when an external configuration edit is observed.
    pub fn apply_config(&mut self, config: CycleConfig) -> Result<Event, ConfigError> {
        config.validate()?;
        let active_changed = config.duration_secs(self.phase) != self.total_secs();
        self.config = config;
        if active_changed {
            self.remaining_secs = self.total_secs();
        }
        Ok(Event::ConfigUpdated {
            config: self.config,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Move to the next phase and load its full duration.
    fn advance(&mut self) -> Phase {
        let next = match self.phase {
            Phase::Focus => {
                self.completed_focus_cycles += 1;
                if self.completed_focus_cycles % self.config.cycles_before_long_break == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Focus,
        };
        tracing::debug!(from = ?self.phase, to = ?next, cycles = self.completed_focus_cycles, "phase transition");
        self.phase = next;
        self.remaining_secs = self.config.duration_secs(next);
        next
    }
}
