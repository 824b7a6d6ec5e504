//! Local SQLite layer.
//!
//! The durable counterpart of the browser's localStorage: a single
//! `local_state` table of JSON documents keyed by name (`bojoCart`,
//! `bojoOrders`, admin settings). Uses rusqlite with WAL mode, schema
//! migrations, and managed connection state shared across components.

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Shared state holding the database connection.
pub struct DbState {
    pub conn: Mutex<Connection>,
    pub db_path: PathBuf,
}

/// Current schema version. Bump when adding new migrations.
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Initialize the database at `{data_dir}/bojo.db`.
///
/// Creates the directory if needed, opens the connection, sets pragmas,
/// and runs any pending migrations. On corruption or open failure,
/// deletes the file and retries once.
pub fn init(data_dir: &Path) -> Result<DbState> {
    fs::create_dir_all(data_dir)
        .map_err(|e| Error::StorageWrite(format!("create data dir: {e}")))?;

    let db_path = data_dir.join("bojo.db");
    info!("Opening database at {}", db_path.display());

    let conn = match open_and_configure(&db_path) {
        Ok(c) => c,
        Err(first_err) => {
            warn!(
                "Database open failed ({}), deleting and retrying once",
                first_err
            );
            if db_path.exists() {
                let _ = fs::remove_file(&db_path);
                let wal = db_path.with_extension("db-wal");
                let shm = db_path.with_extension("db-shm");
                let _ = fs::remove_file(&wal);
                let _ = fs::remove_file(&shm);
            }
            open_and_configure(&db_path)
                .map_err(|e| Error::StorageWrite(format!("database open after retry: {e}")))?
        }
    };

    run_migrations(&conn)?;

    info!("Database initialized (schema v{CURRENT_SCHEMA_VERSION})");

    Ok(DbState {
        conn: Mutex::new(conn),
        db_path,
    })
}

/// Open the database file and apply pragmas.
fn open_and_configure(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).map_err(|e| Error::StorageWrite(format!("sqlite open: {e}")))?;

    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;",
    )
    .map_err(|e| Error::StorageWrite(format!("pragma setup: {e}")))?;

    Ok(conn)
}

/// Run all pending migrations up to `CURRENT_SCHEMA_VERSION`.
fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT DEFAULT (datetime('now'))
        );",
    )
    .map_err(|e| Error::StorageWrite(format!("create schema_version: {e}")))?;

    let current: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current >= CURRENT_SCHEMA_VERSION {
        info!("Database schema up to date (v{current})");
        return Ok(());
    }

    info!("Migrating database from v{current} to v{CURRENT_SCHEMA_VERSION}");

    if current < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// Migration v1: the `local_state` key/value table.
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS local_state (
            state_key TEXT PRIMARY KEY,
            state_value TEXT NOT NULL,
            updated_at TEXT DEFAULT (datetime('now'))
        );

        INSERT INTO schema_version (version) VALUES (1);
        ",
    )
    .map_err(|e| Error::StorageWrite(format!("migration v1: {e}")))?;
    Ok(())
}

/// Read a JSON document from `local_state` and deserialize it.
///
/// Missing keys and malformed JSON both degrade to `None`; a malformed
/// document is logged and treated as absent rather than propagated (read
/// failures never surface to callers).
pub fn read_state<T: DeserializeOwned>(db: &DbState, key: &str) -> Option<T> {
    let conn = db.conn.lock().ok()?;
    let raw: String = conn
        .query_row(
            "SELECT state_value FROM local_state WHERE state_key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .unwrap_or_else(|e| {
            warn!(key, "local_state read failed: {e}");
            None
        })?;

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, "discarding malformed local_state document: {e}");
            None
        }
    }
}

/// Serialize a value and upsert it into `local_state`.
pub fn write_state<T: Serialize>(db: &DbState, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)
        .map_err(|e| Error::StorageWrite(format!("serialize {key}: {e}")))?;
    let conn = db
        .conn
        .lock()
        .map_err(|e| Error::StorageWrite(e.to_string()))?;
    conn.execute(
        "INSERT INTO local_state (state_key, state_value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(state_key) DO UPDATE
         SET state_value = excluded.state_value, updated_at = excluded.updated_at",
        params![key, raw],
    )
    .map_err(|e| Error::StorageWrite(format!("write {key}: {e}")))?;
    Ok(())
}

/// Remove a key from `local_state`. Missing keys are not an error.
pub fn delete_state(db: &DbState, key: &str) -> Result<()> {
    let conn = db
        .conn
        .lock()
        .map_err(|e| Error::StorageWrite(e.to_string()))?;
    conn.execute("DELETE FROM local_state WHERE state_key = ?1", params![key])
        .map_err(|e| Error::StorageWrite(format!("delete {key}: {e}")))?;
    Ok(())
}

/// Build an in-memory `DbState` with migrations applied, for tests.
#[cfg(test)]
pub(crate) fn test_db() -> DbState {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch(
        "PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;",
    )
    .expect("pragma setup");
    run_migrations(&conn).expect("migrations");
    DbState {
        conn: Mutex::new(conn),
        db_path: PathBuf::from(":memory:"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let db = test_db();
        write_state(&db, "greeting", &serde_json::json!({ "hello": "world" }))
            .expect("write state");
        let back: serde_json::Value = read_state(&db, "greeting").expect("read state");
        assert_eq!(back["hello"], "world");
    }

    #[test]
    fn read_missing_key_is_none() {
        let db = test_db();
        assert!(read_state::<serde_json::Value>(&db, "absent").is_none());
    }

    #[test]
    fn malformed_document_degrades_to_none() {
        let db = test_db();
        {
            let conn = db.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO local_state (state_key, state_value) VALUES ('bad', '{not json')",
                [],
            )
            .unwrap();
        }
        assert!(read_state::<serde_json::Value>(&db, "bad").is_none());
    }

    #[test]
    fn write_overwrites_existing_value() {
        let db = test_db();
        write_state(&db, "k", &1i64).unwrap();
        write_state(&db, "k", &2i64).unwrap();
        assert_eq!(read_state::<i64>(&db, "k"), Some(2));
    }

    #[test]
    fn delete_removes_key() {
        let db = test_db();
        write_state(&db, "k", &1i64).unwrap();
        delete_state(&db, "k").unwrap();
        assert!(read_state::<i64>(&db, "k").is_none());
        // Deleting again is fine.
        delete_state(&db, "k").unwrap();
    }
}
