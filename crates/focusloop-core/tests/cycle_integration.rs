//! End-to-end cycle behavior over the public API.
//!
//! Drives the engine through whole phases the way the runner would,
//! one logical tick per second.

use focusloop_core::{CycleConfig, CycleConfigPatch, CycleEngine, Event, Phase};

fn config() -> CycleConfig {
    CycleConfig {
        focus_minutes: 25,
        short_break_minutes: 5,
        long_break_minutes: 15,
        cycles_before_long_break: 4,
    }
}

#[test]
fn full_focus_phase_lands_in_short_break() {
    let mut engine = CycleEngine::new(config());
    engine.start();

    let mut boundary = None;
    for _ in 0..25 * 60 {
        if let Some(event) = engine.tick() {
            boundary = Some(event);
        }
    }

    assert!(matches!(
        boundary,
        Some(Event::PhaseEnded {
            from: Phase::Focus,
            to: Phase::ShortBreak,
            ..
        })
    ));
    assert_eq!(engine.phase(), Phase::ShortBreak);
    assert_eq!(engine.completed_focus_cycles(), 1);
    assert_eq!(engine.remaining_secs(), 300);
}

#[test]
fn four_cycles_reach_the_long_break() {
    let mut engine = CycleEngine::new(config());
    engine.start();

    let mut transitions = Vec::new();
    // 4 focus phases and the 3 short breaks between them.
    while transitions.len() < 7 {
        if let Some(Event::PhaseEnded { to, .. }) = engine.tick() {
            transitions.push(to);
        }
    }

    assert_eq!(
        transitions,
        vec![
            Phase::ShortBreak,
            Phase::Focus,
            Phase::ShortBreak,
            Phase::Focus,
            Phase::ShortBreak,
            Phase::Focus,
            Phase::LongBreak,
        ]
    );
    assert_eq!(engine.completed_focus_cycles(), 4);
    assert_eq!(engine.remaining_secs(), 15 * 60);
}

#[test]
fn config_update_mid_phase_restarts_countdown() {
    let mut engine = CycleEngine::new(config());
    engine.start();
    while engine.remaining_secs() != 600 {
        engine.tick();
    }
    engine
        .update_config(&CycleConfigPatch {
            focus_minutes: Some(30),
            ..CycleConfigPatch::default()
        })
        .unwrap();
    assert_eq!(engine.remaining_secs(), 1800);
}

#[test]
fn parked_engine_round_trips_through_json() {
    let mut engine = CycleEngine::new(config());
    engine.start();
    engine.tick();
    engine.skip();

    let json = serde_json::to_string(&engine).unwrap();
    let restored: CycleEngine = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.phase(), engine.phase());
    assert_eq!(restored.remaining_secs(), engine.remaining_secs());
    assert_eq!(restored.completed_focus_cycles(), engine.completed_focus_cycles());
    assert_eq!(restored.is_running(), engine.is_running());
    assert_eq!(restored.is_paused(), engine.is_paused());
}

#[test]
fn database_file_survives_reopen() {
    use chrono::Utc;
    use focusloop_core::Database;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focusloop.db");

    {
        let db = Database::open_at(&path).unwrap();
        db.record_phase(Phase::Focus, 25, Utc::now()).unwrap();
        db.kv_set("cycle_engine", "{}").unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let stats = db.stats_all().unwrap();
    assert_eq!(stats.completed_focus_cycles, 1);
    assert_eq!(db.kv_get("cycle_engine").unwrap().unwrap(), "{}");
}
