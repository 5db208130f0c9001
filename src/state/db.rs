// SQLite database setup and migrations
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

use super::storage::{get_db_path, StorageError};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Practice database handle; clones share one connection
#[derive(Clone)]
pub struct DbConnection {
    conn: Arc<Mutex<Connection>>,
}

impl DbConnection {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Lock the connection, recovering it if a previous holder panicked
    pub fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Initialize the database at the app data directory
pub fn init_db() -> DbResult<DbConnection> {
    open_db(&get_db_path()?)
}

/// Open (or create) a database file and bring its schema up to date
pub fn open_db(db_path: &Path) -> DbResult<DbConnection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(db_path)?;
    prepare(conn)
}

/// Open a throwaway in-memory database
pub fn open_in_memory() -> DbResult<DbConnection> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(conn: Connection) -> DbResult<DbConnection> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    run_migrations(&conn)?;
    Ok(DbConnection::new(conn))
}

fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    let current_version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current_version < 1 {
        migration_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (?1)", [1])?;
        log::info!("Applied practice database schema v1");
    }

    Ok(())
}

fn migration_v1(conn: &Connection) -> DbResult<()> {
    // One row per chord change, grouped by day
    conn.execute(
        "CREATE TABLE IF NOT EXISTS chord_transitions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date_id TEXT NOT NULL,
            chord TEXT NOT NULL,
            time_secs REAL NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_chord_transitions_date_id ON chord_transitions(date_id)",
        [],
    )?;

    // Scored strums
    conn.execute(
        "CREATE TABLE IF NOT EXISTS strum_attempts (
            id TEXT PRIMARY KEY,
            pattern_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            success INTEGER NOT NULL,
            timing_ms REAL NOT NULL,
            confidence REAL NOT NULL,
            attempt_json TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_strum_attempts_pattern_id ON strum_attempts(pattern_id)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_db_init() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        // Verify tables exist
        let table_count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('chord_transitions', 'strum_attempts')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 2);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let versions: i32 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn test_open_db_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("practice.db");

        let db = open_db(&db_path).unwrap();
        assert!(db_path.exists());

        // Shared handles see the same connection
        let other = db.clone();
        let count: i32 = other
            .lock()
            .query_row("SELECT COUNT(*) FROM chord_transitions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
