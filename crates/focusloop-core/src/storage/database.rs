//! SQLite-based session storage and statistics.
//!
//! Provides persistent storage for:
//! - Completed cycle phases
//! - Daily and all-time statistics
//! - Key-value store for parked engine state

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::data_dir;
use crate::error::{CoreError, DatabaseError};
use crate::timer::Phase;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub phase: String,
    pub duration_min: u64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_sessions: u64,
    pub total_focus_min: u64,
    pub total_break_min: u64,
    pub completed_focus_cycles: u64,
    pub today_sessions: u64,
    pub today_focus_min: u64,
}

/// SQLite database for session storage.
///
/// Stores completed phases and provides statistics.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/focusloop/focusloop.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("focusloop.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open a database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                phase        TEXT NOT NULL,
                duration_min INTEGER NOT NULL,
                completed_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_completed_at ON sessions(completed_at);
            CREATE INDEX IF NOT EXISTS idx_sessions_phase ON sessions(phase);",
        )?;
        Ok(())
    }

    /// Record a completed phase.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_phase(
        &self,
        phase: Phase,
        duration_min: u64,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO sessions (phase, duration_min, completed_at) VALUES (?1, ?2, ?3)",
            params![phase_str(phase), duration_min, completed_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn stats_today(&self) -> Result<Stats, rusqlite::Error> {
        let midnight = Utc::now().format("%Y-%m-%d").to_string();
        self.aggregate(Some(format!("{midnight}T00:00:00+00:00")))
    }

    pub fn stats_all(&self) -> Result<Stats, rusqlite::Error> {
        let mut stats = self.aggregate(None)?;
        let today = self.stats_today()?;
        stats.today_sessions = today.today_sessions;
        stats.today_focus_min = today.today_focus_min;
        Ok(stats)
    }

    fn aggregate(&self, since: Option<String>) -> Result<Stats, rusqlite::Error> {
        let mut stats = Stats::default();
        let mut fold = |phase: String, count: u64, minutes: u64| {
            stats.total_sessions += count;
            if phase == "focus" {
                stats.completed_focus_cycles += count;
                stats.total_focus_min += minutes;
                stats.today_sessions += count;
                stats.today_focus_min += minutes;
            } else {
                stats.total_break_min += minutes;
            }
        };

        match since {
            Some(cutoff) => {
                let mut stmt = self.conn.prepare(
                    "SELECT phase, COUNT(*), COALESCE(SUM(duration_min), 0)
                     FROM sessions
                     WHERE completed_at >= ?1
                     GROUP BY phase",
                )?;
                let rows = stmt.query_map(params![cutoff], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u64>(1)?,
                        row.get::<_, u64>(2)?,
                    ))
                })?;
                for row in rows {
                    let (phase, count, minutes) = row?;
                    fold(phase, count, minutes);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT phase, COUNT(*), COALESCE(SUM(duration_min), 0)
                     FROM sessions
                     GROUP BY phase",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u64>(1)?,
                        row.get::<_, u64>(2)?,
                    ))
                })?;
                for row in rows {
                    let (phase, count, minutes) = row?;
                    fold(phase, count, minutes);
                }
            }
        }
        Ok(stats)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Delete a value from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

fn phase_str(phase: Phase) -> &'static str {
    match phase {
        Phase::Focus => "focus",
        Phase::ShortBreak => "short_break",
        Phase::LongBreak => "long_break",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_query() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_phase(Phase::Focus, 25, now).unwrap();
        db.record_phase(Phase::ShortBreak, 5, now).unwrap();
        let stats = db.stats_all().unwrap();
        assert_eq!(stats.completed_focus_cycles, 1);
        assert_eq!(stats.total_focus_min, 25);
        assert_eq!(stats.total_break_min, 5);
        assert_eq!(stats.total_sessions, 2);
    }

    #[test]
    fn today_stats_count_todays_focus() {
        let db = Database::open_memory().unwrap();
        db.record_phase(Phase::Focus, 25, Utc::now()).unwrap();
        let stats = db.stats_today().unwrap();
        assert_eq!(stats.today_sessions, 1);
        assert_eq!(stats.today_focus_min, 25);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }
}
