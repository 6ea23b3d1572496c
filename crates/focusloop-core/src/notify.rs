//! Phase-end notification seam.
//!
//! The "play a sound" side effect is an injected capability so the core
//! has no dependency on any platform audio or notification API. Delivery
//! is best-effort: a failed chime is logged and swallowed, never raised
//! to whoever drove the tick.

use crate::events::Event;
use crate::timer::Phase;

/// Best-effort "cycle ended" signal. Implementations must not block.
pub trait NotificationSink: Send + Sync {
    /// Called with the phase the timer just transitioned into.
    fn notify_phase_ended(&self, next_phase: Phase) -> Result<(), Box<dyn std::error::Error>>;
}

/// Sink that drops every notification (tests, headless embedders).
#[derive(Debug, Default)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn notify_phase_ended(&self, _next_phase: Phase) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

/// Terminal bell plus a one-line banner on stdout.
#[derive(Debug, Default)]
pub struct BellSink;

impl NotificationSink for BellSink {
    fn notify_phase_ended(&self, next_phase: Phase) -> Result<(), Box<dyn std::error::Error>> {
        use std::io::Write;
        let mut out = std::io::stdout().lock();
        writeln!(out, "\x07-- {} --", next_phase.label())?;
        out.flush()?;
        Ok(())
    }
}

/// Forward a phase-transition event to the sink, swallowing failures.
pub fn notify_phase_end(sink: &dyn NotificationSink, event: &Event) {
    if let Event::PhaseEnded { to, .. } | Event::PhaseSkipped { to, .. } = event {
        if let Err(e) = sink.notify_phase_ended(*to) {
            tracing::warn!(error = %e, "notification sink failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct FailingSink;

    impl NotificationSink for FailingSink {
        fn notify_phase_ended(&self, _next_phase: Phase) -> Result<(), Box<dyn std::error::Error>> {
            Err("speaker unplugged".into())
        }
    }

    #[test]
    fn sink_failure_is_swallowed() {
        let event = Event::PhaseEnded {
            from: Phase::Focus,
            to: Phase::ShortBreak,
            completed_focus_cycles: 1,
            at: Utc::now(),
        };
        // Must not panic or propagate.
        notify_phase_end(&FailingSink, &event);
    }

    #[test]
    fn non_transition_events_do_not_notify() {
        struct PanickingSink;
        impl NotificationSink for PanickingSink {
            fn notify_phase_ended(&self, _p: Phase) -> Result<(), Box<dyn std::error::Error>> {
                panic!("should not be called");
            }
        }
        notify_phase_end(&PanickingSink, &Event::TimerReset { at: Utc::now() });
    }
}
