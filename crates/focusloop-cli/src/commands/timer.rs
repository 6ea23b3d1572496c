use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::{Deserialize, Serialize};

use focusloop_core::notify::notify_phase_end;
use focusloop_core::{
    BellSink, Config, CycleEngine, CycleTimer, Database, Event, FileConfigStore, NoopSink,
    NotificationSink, Phase,
};

const ENGINE_KEY: &str = "cycle_engine";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start (or resume) the countdown
    Start,
    /// Pause the countdown without losing cycle progress
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Skip to the next phase
    Skip,
    /// Reset to a fresh Focus phase
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Run the live timer in the foreground until Ctrl-C
    Watch,
}

/// Engine snapshot parked in the kv store between invocations.
#[derive(Serialize, Deserialize)]
struct ParkedEngine {
    engine: CycleEngine,
    saved_at: DateTime<Utc>,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;

    if let TimerAction::Watch = action {
        return watch(&config, &db);
    }

    let mut engine = load_engine(&db, &config);
    match action {
        TimerAction::Start | TimerAction::Resume => {
            print_event_or_snapshot(engine.start(), &engine)?;
        }
        TimerAction::Pause => {
            print_event_or_snapshot(engine.pause(), &engine)?;
        }
        TimerAction::Skip => {
            if let Some(event) = engine.skip() {
                handle_phase_event(&event, &engine, &db, sink(&config).as_ref());
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        TimerAction::Reset => {
            let event = engine.reset();
            // Clear the parked session rather than re-saving it.
            db.kv_delete(ENGINE_KEY)?;
            if let Some(event) = event {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
            return Ok(());
        }
        TimerAction::Status => {
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        TimerAction::Watch => unreachable!("handled above"),
    }

    save_engine(&db, &engine)?;
    Ok(())
}

fn sink(config: &Config) -> Arc<dyn NotificationSink> {
    if config.notifications.enabled && config.notifications.bell {
        Arc::new(BellSink)
    } else {
        Arc::new(NoopSink)
    }
}

fn load_engine(db: &Database, config: &Config) -> CycleEngine {
    let parked = db
        .kv_get(ENGINE_KEY)
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str::<ParkedEngine>(&json).ok());

    match parked {
        Some(ParkedEngine { mut engine, saved_at }) => {
            // Pick up configuration edits made since the engine was parked.
            if engine.config() != &config.cycle {
                if let Err(e) = engine.apply_config(config.cycle) {
                    eprintln!("warning: ignoring invalid configuration: {e}");
                }
            }
            catch_up(&mut engine, saved_at, db, config);
            engine
        }
        None => CycleEngine::new(config.cycle),
    }
}

/// Replay the ticks that would have fired since the engine was parked.
fn catch_up(engine: &mut CycleEngine, saved_at: DateTime<Utc>, db: &Database, config: &Config) {
    if !engine.is_running() {
        return;
    }
    let missed = (Utc::now() - saved_at).num_seconds().max(0);
    let sink = sink(config);
    for _ in 0..missed {
        if let Some(event) = engine.tick() {
            handle_phase_event(&event, engine, db, sink.as_ref());
        }
    }
}

fn handle_phase_event(
    event: &Event,
    engine: &CycleEngine,
    db: &Database,
    sink: &dyn NotificationSink,
) {
    notify_phase_end(sink, event);
    let recorded = match event {
        Event::PhaseEnded { from, at, .. } => Some((*from, *at)),
        // A skipped focus still counts toward the long-break threshold.
        Event::PhaseSkipped {
            from: Phase::Focus,
            at,
            ..
        } => Some((Phase::Focus, *at)),
        _ => None,
    };
    if let Some((phase, at)) = recorded {
        let minutes = u64::from(engine.config().minutes(phase));
        if let Err(e) = db.record_phase(phase, minutes, at) {
            eprintln!("warning: failed to record session: {e}");
        }
    }
}

fn print_event_or_snapshot(
    event: Option<Event>,
    engine: &CycleEngine,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = event.unwrap_or_else(|| engine.snapshot());
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn save_engine(db: &Database, engine: &CycleEngine) -> Result<(), Box<dyn std::error::Error>> {
    let parked = ParkedEngine {
        engine: engine.clone(),
        saved_at: Utc::now(),
    };
    db.kv_set(ENGINE_KEY, &serde_json::to_string(&parked)?)?;
    Ok(())
}

/// Foreground mode: drive the live runner and redraw once per second.
fn watch(config: &Config, db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    use std::io::Write;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let engine = load_engine(db, config);
        let mut timer =
            CycleTimer::from_engine(engine, sink(config)).with_store(Arc::new(FileConfigStore));
        let mut events = timer.subscribe();
        timer.start().await;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut redraw = tokio::time::interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                _ = &mut ctrl_c => break,
                Some(event) = events.recv() => {
                    if let Event::PhaseEnded { from, at, .. } = &event {
                        let minutes = u64::from(timer.cycle_config().await.minutes(*from));
                        if let Err(e) = db.record_phase(*from, minutes, *at) {
                            eprintln!("warning: failed to record session: {e}");
                        }
                    }
                }
                _ = redraw.tick() => {
                    if let Event::StateSnapshot { phase, remaining_secs, completed_focus_cycles, .. } =
                        timer.snapshot().await
                    {
                        print!(
                            "\r{:<12} {:02}:{:02}  cycles: {}   ",
                            phase.label(),
                            remaining_secs / 60,
                            remaining_secs % 60,
                            completed_focus_cycles
                        );
                        std::io::stdout().flush()?;
                    }
                }
            }
        }

        println!();
        timer.pause().await;
        save_engine(db, &timer.engine_state().await)?;
        Ok(())
    })
}
