//! # Focusloop Core Library
//!
//! This library provides the core business logic for the Focusloop cycle
//! timer. It implements a CLI-first philosophy where all operations are
//! available via a standalone CLI binary, with any GUI shell being a thin
//! layer over the same core library.
//!
//! ## Architecture
//!
//! - **Cycle Engine**: A pure state machine that requires the caller to
//!   invoke `tick()` once per logical second
//! - **Cycle Timer**: An async runner owning the engine and a cancellable
//!   one-second tick task
//! - **Storage**: SQLite-based session storage and TOML-based configuration
//! - **Notifications**: Injected best-effort phase-end signal
//!
//! ## Key Components
//!
//! - [`CycleEngine`]: Core cycle state machine
//! - [`CycleTimer`]: Owned tick task and operation serialization
//! - [`Database`]: Session and statistics persistence
//! - [`Config`]: Application configuration management
//! - [`NotificationSink`]: Trait for phase-end signals

pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError};
pub use events::Event;
pub use notify::{BellSink, NoopSink, NotificationSink};
pub use storage::{Config, ConfigStore, Database, FileConfigStore, SessionRecord, Stats};
pub use timer::{CycleConfig, CycleConfigPatch, CycleEngine, CycleTimer, Phase};
