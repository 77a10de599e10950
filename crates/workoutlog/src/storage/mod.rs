//! Storage layer for workoutlog.
//!
//! Workouts persist the way a browser's local storage holds them: as one
//! JSON string under a single key of a string-valued key-value store. This
//! module provides the store abstraction, a `SQLite`-backed store, an
//! in-memory store, and the collection load/save helpers.

pub mod memory;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::workout::Workout;

pub use memory::MemoryStore;

/// A synchronous, string-valued key-value store.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn remove(&mut self, key: &str) -> Result<bool>;
}

/// Key-value store persisted in a `SQLite` database.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening store at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Store opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let (entries, value_bytes): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(LENGTH(CAST(value AS BLOB))), 0) FROM local_storage",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            entries: u64::try_from(entries).unwrap_or(0),
            value_bytes: u64::try_from(value_bytes).unwrap_or(0),
            db_size_bytes,
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            params![key, value],
        )?;
        debug!("Stored {} bytes under '{}'", value.len(), key);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM local_storage WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }
}

/// Statistics about a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of keys.
    pub entries: u64,
    /// Total size of all values in bytes.
    pub value_bytes: u64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

/// A collection read back from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredWorkouts {
    /// Records that parsed, in stored order.
    pub workouts: Vec<Workout>,
    /// Records that did not parse, kept verbatim so a later save does not
    /// drop them.
    pub unreadable: Vec<Value>,
}

/// Load the workout collection stored under `key`.
///
/// An absent entry is an empty collection. So is an entry that is not a
/// JSON array; that case is logged and the entry is left untouched. Array
/// elements that do not parse as workouts are logged and returned in
/// [`StoredWorkouts::unreadable`]. Derived fields missing from stored
/// workouts are recomputed.
///
/// # Errors
///
/// Returns an error only if the store itself cannot be read.
pub fn load_workouts<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<StoredWorkouts> {
    let Some(json) = store.get(key)? else {
        debug!("No stored workouts under '{key}'");
        return Ok(StoredWorkouts::default());
    };

    let records = match serde_json::from_str::<Vec<Value>>(&json) {
        Ok(records) => records,
        Err(err) => {
            warn!("Ignoring malformed workouts under '{key}': {err}");
            return Ok(StoredWorkouts::default());
        }
    };

    let mut stored = StoredWorkouts::default();
    for (index, record) in records.into_iter().enumerate() {
        match Workout::deserialize(&record) {
            Ok(mut workout) => {
                if workout.restore_derived() {
                    debug!("Recomputed derived fields for stored workout {}", workout.id());
                }
                stored.workouts.push(workout);
            }
            Err(err) => {
                warn!("Skipping unreadable workout #{index} under '{key}': {err}");
                stored.unreadable.push(record);
            }
        }
    }
    Ok(stored)
}

/// Replace the collection stored under `key` with `workouts`, followed by
/// any `unreadable` records carried over from the last load.
///
/// # Errors
///
/// Returns an error if serialization or the store write fails.
pub fn save_workouts<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    workouts: &[Workout],
    unreadable: &[Value],
) -> Result<()> {
    let mut records = Vec::with_capacity(workouts.len() + unreadable.len());
    for workout in workouts {
        records.push(serde_json::to_value(workout)?);
    }
    records.extend_from_slice(unreadable);
    let json = serde_json::to_string(&records)?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::Coordinates;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    fn sample_workouts() -> Vec<Workout> {
        vec![
            Workout::running(Coordinates::new(51.5, -0.12), 5.2, 26.0, 178),
            Workout::cycling(Coordinates::new(48.85, 2.35), 20.0, 60.0, -50.0),
        ]
    }

    #[test]
    fn test_open_in_memory() {
        let store = SqliteStore::open_in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_set_and_get() {
        let mut store = create_test_store();
        store.set("workouts", "[]").unwrap();
        assert_eq!(store.get("workouts").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_get_missing() {
        let store = create_test_store();
        assert!(store.get("workouts").unwrap().is_none());
    }

    #[test]
    fn test_set_replaces() {
        let mut store = create_test_store();
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(store.stats().unwrap().entries, 1);
    }

    #[test]
    fn test_remove() {
        let mut store = create_test_store();
        store.set("k", "v").unwrap();
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_stats() {
        let mut store = create_test_store();
        let stats = store.stats().unwrap();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.value_bytes, 0);
        assert_eq!(stats.db_size_bytes, 0);

        store.set("a", "12345").unwrap();
        store.set("b", "678").unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.value_bytes, 8);
    }

    #[test]
    fn test_path() {
        let store = create_test_store();
        assert_eq!(store.path(), Path::new(":memory:"));
    }

    #[test]
    fn test_open_file_based() {
        let temp_dir = std::env::temp_dir();
        let db_path = temp_dir.join(format!("workoutlog_test_{}.db", std::process::id()));

        {
            let mut store = SqliteStore::open(&db_path).unwrap();
            store.set("workouts", "[]").unwrap();
            assert_eq!(store.path(), db_path);
        }

        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(store.get("workouts").unwrap().as_deref(), Some("[]"));
        assert!(store.stats().unwrap().db_size_bytes > 0);

        drop(store);
        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let root = std::env::temp_dir().join(format!("workoutlog_test_{}", std::process::id()));
        let nested_path = root.join("nested/workouts.db");
        let _ = std::fs::remove_dir_all(&root);

        let store = SqliteStore::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(store);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_save_and_load_workouts() {
        let mut store = create_test_store();
        let workouts = sample_workouts();

        save_workouts(&mut store, "workouts", &workouts, &[]).unwrap();
        let loaded = load_workouts(&store, "workouts").unwrap();

        assert_eq!(loaded.workouts, workouts);
        assert!(loaded.unreadable.is_empty());
    }

    #[test]
    fn test_load_absent_is_empty() {
        let store = create_test_store();
        assert_eq!(
            load_workouts(&store, "workouts").unwrap(),
            StoredWorkouts::default()
        );
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let mut store = create_test_store();
        store.set("workouts", "{not json").unwrap();

        assert_eq!(
            load_workouts(&store, "workouts").unwrap(),
            StoredWorkouts::default()
        );
        assert_eq!(store.get("workouts").unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn test_load_restores_missing_derived_fields() {
        let mut store = create_test_store();
        store
            .set(
                "workouts",
                r#"[{"id":"1","date":"2026-04-14T10:00:00Z","coords":[51.5,-0.12],
                    "distance":20,"duration":60,"type":"cycling","elevationGain":120}]"#,
            )
            .unwrap();

        let loaded = load_workouts(&store, "workouts").unwrap().workouts;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].speed(), Some(20.0));
        assert!(loaded[0].description().starts_with("Cycling on April"));
    }

    #[test]
    fn test_load_skips_only_unreadable_records() {
        let mut store = create_test_store();
        store
            .set(
                "workouts",
                r#"[{"id":"1","date":"2026-04-14T10:00:00Z","coords":[51.5,-0.12],
                     "distance":5.2,"duration":26,"type":"running","cadence":178},
                    {"id":"2","date":"2026-04-15T10:00:00Z","coords":[51.5,-0.12],
                     "distance":1,"duration":30,"type":"swimming"},
                    {"id":"3","date":"2026-04-16T10:00:00Z","coords":[51.5,-0.12],
                     "distance":5.2,"duration":26,"type":"running","cadence":170.5}]"#,
            )
            .unwrap();

        let loaded = load_workouts(&store, "workouts").unwrap();
        let ids: Vec<&str> = loaded.workouts.iter().map(|w| w.id().as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(loaded.workouts[1].cadence(), Some(171));
        assert_eq!(loaded.unreadable.len(), 1);
        assert_eq!(loaded.unreadable[0]["type"], "swimming");
    }

    #[test]
    fn test_save_keeps_unreadable_records() {
        let mut store = create_test_store();
        let workouts = sample_workouts();
        let unreadable = vec![serde_json::json!({"id": "2", "type": "swimming"})];

        save_workouts(&mut store, "workouts", &workouts, &unreadable).unwrap();
        let loaded = load_workouts(&store, "workouts").unwrap();

        assert_eq!(loaded.workouts, workouts);
        assert_eq!(loaded.unreadable, unreadable);
    }
}
