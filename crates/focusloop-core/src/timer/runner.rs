//! Owned async runner around [`CycleEngine`].
//!
//! The host-runtime "interval callback + cleanup" pattern becomes an owned
//! cancellable task here: `start()` spawns a one-second tick loop,
//! `pause()`/`reset()`/drop abort it before returning, so no stale tick
//! ever fires. All mutating operations are serialized through the
//! per-instance mutex; independent instances share nothing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::config::{CycleConfig, CycleConfigPatch};
use super::engine::CycleEngine;
use crate::error::ConfigError;
use crate::events::Event;
use crate::notify::{notify_phase_end, NotificationSink};
use crate::storage::ConfigStore;

pub struct CycleTimer {
    engine: Arc<Mutex<CycleEngine>>,
    sink: Arc<dyn NotificationSink>,
    store: Option<Arc<dyn ConfigStore>>,
    events_tx: Option<mpsc::UnboundedSender<Event>>,
    tick_task: Option<JoinHandle<()>>,
    watch_task: Option<JoinHandle<()>>,
}

impl CycleTimer {
    pub fn new(config: CycleConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self::from_engine(CycleEngine::new(config), sink)
    }

    /// Wrap an existing engine (e.g. one unparked from storage).
    pub fn from_engine(engine: CycleEngine, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            sink,
            store: None,
            events_tx: None,
            tick_task: None,
            watch_task: None,
        }
    }

    /// Load the initial configuration from `store` and keep it attached for
    /// write-through on configuration updates.
    ///
    /// # Errors
    /// Propagates the store's load failure.
    pub fn from_store(
        store: Arc<dyn ConfigStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, ConfigError> {
        let config = store.load_cycle()?;
        let mut timer = Self::new(config, sink);
        timer.store = Some(store);
        Ok(timer)
    }

    /// Attach a configuration store for write-through persistence.
    pub fn with_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Receive a copy of every event the tick task produces.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events_tx = Some(tx);
        rx
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start (or resume) ticking. Spawns the tick task.
    pub async fn start(&mut self) -> Option<Event> {
        let event = self.engine.lock().await.start();
        if event.is_some() {
            self.cancel_tick();
            self.tick_task = Some(self.spawn_tick_task());
        }
        self.forward(event)
    }

    /// Suspend ticking. The pending tick task is aborted before returning.
    pub async fn pause(&mut self) -> Option<Event> {
        let event = self.engine.lock().await.pause();
        self.cancel_tick();
        self.forward(event)
    }

    /// Return to a fresh Focus phase. Aborts the pending tick task.
    pub async fn reset(&mut self) -> Option<Event> {
        let event = self.engine.lock().await.reset();
        self.cancel_tick();
        self.forward(event)
    }

    /// Force the phase transition, notifying the sink like an expiry would.
    pub async fn skip(&mut self) -> Option<Event> {
        let event = self.engine.lock().await.skip();
        if let Some(ref event) = event {
            notify_phase_end(self.sink.as_ref(), event);
        }
        self.forward(event)
    }

    /// Merge a partial configuration update, writing through to the
    /// attached store when present.
    ///
    /// # Errors
    /// `ConfigError::InvalidValue` from validation; the store write is
    /// best-effort and never fails the update.
    pub async fn update_config(&mut self, patch: &CycleConfigPatch) -> Result<Event, ConfigError> {
        let event = self.engine.lock().await.update_config(patch)?;
        if let (Some(store), Event::ConfigUpdated { config, .. }) = (&self.store, &event) {
            if let Err(e) = store.save_cycle(config) {
                tracing::warn!(error = %e, "failed to persist configuration");
            }
        }
        if let Some(tx) = &self.events_tx {
            let _ = tx.send(event.clone());
        }
        Ok(event)
    }

    /// Apply external configuration edits as they arrive on the channel.
    ///
    /// Invalid configurations are logged and ignored; the engine keeps its
    /// previous values.
    pub fn watch_config(&mut self, mut rx: watch::Receiver<CycleConfig>) {
        let engine = Arc::clone(&self.engine);
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let config = *rx.borrow_and_update();
                let mut engine = engine.lock().await;
                if let Err(e) = engine.apply_config(config) {
                    tracing::warn!(error = %e, "ignoring invalid external configuration");
                }
            }
        });
        if let Some(old) = self.watch_task.replace(task) {
            old.abort();
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub async fn snapshot(&self) -> Event {
        self.engine.lock().await.snapshot()
    }

    pub async fn cycle_config(&self) -> CycleConfig {
        *self.engine.lock().await.config()
    }

    /// Clone of the current engine state, e.g. for parking in storage.
    pub async fn engine_state(&self) -> CycleEngine {
        self.engine.lock().await.clone()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn spawn_tick_task(&self) -> JoinHandle<()> {
        let engine = Arc::clone(&self.engine);
        let sink = Arc::clone(&self.sink);
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.tick().await; // first tick completes immediately
            loop {
                interval.tick().await;
                let mut engine = engine.lock().await;
                if !engine.is_running() {
                    break;
                }
                if let Some(event) = engine.tick() {
                    notify_phase_end(sink.as_ref(), &event);
                    if let Some(tx) = &events_tx {
                        let _ = tx.send(event);
                    }
                }
            }
        })
    }

    fn cancel_tick(&mut self) {
        if let Some(task) = self.tick_task.take() {
            task.abort();
        }
    }

    fn forward(&self, event: Option<Event>) -> Option<Event> {
        if let (Some(tx), Some(event)) = (&self.events_tx, &event) {
            let _ = tx.send(event.clone());
        }
        event
    }
}

impl Drop for CycleTimer {
    fn drop(&mut self) {
        self.cancel_tick();
        if let Some(task) = self.watch_task.take() {
            task.abort();
        }
    }
}
