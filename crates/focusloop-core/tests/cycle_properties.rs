//! Property tests for the cycle engine invariants.

use focusloop_core::{CycleConfig, CycleConfigPatch, CycleEngine};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Start,
    Pause,
    Reset,
    Skip,
    Tick,
    Update(CycleConfigPatch),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Start),
        1 => Just(Op::Pause),
        1 => Just(Op::Reset),
        1 => Just(Op::Skip),
        5 => Just(Op::Tick),
        1 => (proptest::option::of(1u32..120), proptest::option::of(1u32..8)).prop_map(
            |(focus_minutes, cycles_before_long_break)| {
                Op::Update(CycleConfigPatch {
                    focus_minutes,
                    cycles_before_long_break,
                    ..CycleConfigPatch::default()
                })
            }
        ),
    ]
}

proptest! {
    #[test]
    fn invariants_hold_across_any_operation_sequence(
        ops in prop::collection::vec(op_strategy(), 1..300)
    ) {
        let mut engine = CycleEngine::new(CycleConfig::default());
        for op in ops {
            match op {
                Op::Start => { engine.start(); }
                Op::Pause => { engine.pause(); }
                Op::Reset => { engine.reset(); }
                Op::Skip => { engine.skip(); }
                Op::Tick => { engine.tick(); }
                Op::Update(patch) => {
                    // Patches drawn from 1.. are always valid.
                    engine.update_config(&patch).unwrap();
                }
            }

            prop_assert!(!(engine.is_running() && engine.is_paused()));
            prop_assert!(engine.remaining_secs() <= engine.total_secs());
            prop_assert!(engine.remaining_secs() >= 1);
            let pct = engine.progress_percent();
            prop_assert!((0.0..=100.0).contains(&pct));
        }
    }

    #[test]
    fn cycle_count_is_monotonic_until_reset(
        ops in prop::collection::vec(0u8..3, 1..200)
    ) {
        let mut engine = CycleEngine::new(CycleConfig {
            focus_minutes: 1,
            short_break_minutes: 1,
            long_break_minutes: 1,
            cycles_before_long_break: 2,
        });
        engine.start();
        let mut last = 0;
        for op in ops {
            match op {
                0 => { engine.tick(); }
                1 => { engine.skip(); }
                _ => {
                    engine.reset();
                    engine.start();
                    last = 0;
                }
            }
            let cycles = engine.completed_focus_cycles();
            prop_assert!(cycles >= last);
            last = cycles;
        }
    }
}
