//! SQLite-backed recording index

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection};
use tracing::debug;

use crate::application::ports::{PersistenceError, RecordStore, StoredRecording};
use crate::domain::slots::Locator;

const SCHEMA: &str = include_str!("schema.sql");

/// Recording index in a SQLite file, connection-per-call
pub struct SqliteRecordStore {
    inner: Arc<Database>,
}

struct Database {
    path: PathBuf,
    /// Each in-memory connection is a fresh database, so memory mode keeps one
    memory_conn: Option<Mutex<Connection>>,
}

impl Database {
    fn with_conn<F, T>(&self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        if let Some(ref mutex) = self.memory_conn {
            let conn = mutex.lock().unwrap_or_else(|e| e.into_inner());
            f(&conn).map_err(to_persistence)
        } else {
            let conn = Connection::open(&self.path).map_err(to_persistence)?;
            conn.execute_batch("PRAGMA busy_timeout = 5000;")
                .map_err(to_persistence)?;
            f(&conn).map_err(to_persistence)
        }
    }
}

impl SqliteRecordStore {
    /// Use the database at `path`, creating parent directories as needed.
    /// The schema is created by `ensure_schema`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                PersistenceError(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        Ok(Self {
            inner: Arc::new(Database {
                path,
                memory_conn: None,
            }),
        })
    }

    /// Private in-memory database (tests)
    pub fn open_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory().map_err(to_persistence)?;
        Ok(Self {
            inner: Arc::new(Database {
                path: PathBuf::from(":memory:"),
                memory_conn: Some(Mutex::new(conn)),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Run `f` against the database on the blocking pool
    async fn run<F, T>(&self, f: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || db.with_conn(f))
            .await
            .map_err(|e| PersistenceError(format!("database task failed: {}", e)))?
    }
}

fn to_persistence(e: rusqlite::Error) -> PersistenceError {
    PersistenceError(e.to_string())
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        self.run(|conn| conn.execute_batch(SCHEMA)).await
    }

    async fn insert_locator(&self, locator: &Locator) -> Result<(), PersistenceError> {
        let uri = locator.as_str().to_owned();
        let id = self
            .run(move |conn| {
                conn.execute("INSERT INTO recordings (uri) VALUES (?1)", params![uri])?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        debug!(id, %locator, "recording indexed");
        Ok(())
    }

    async fn recent_recordings(
        &self,
        limit: usize,
    ) -> Result<Vec<StoredRecording>, PersistenceError> {
        let mut rows = self
            .run(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, uri, recorded_at FROM recordings
                     WHERE uri IS NOT NULL
                     ORDER BY id DESC LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![limit as i64], |row| {
                    Ok(StoredRecording {
                        id: row.get(0)?,
                        locator: Locator::new(row.get::<_, String>(1)?),
                        recorded_at: row.get(2)?,
                    })
                })?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
            .await?;

        rows.reverse();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteRecordStore {
        let store = SqliteRecordStore::open_memory().unwrap();
        store.ensure_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let store = store().await;
        assert!(store.ensure_schema().await.is_ok());
    }

    #[tokio::test]
    async fn duplicates_are_allowed() {
        let store = store().await;
        let locator = Locator::new("/r/a.flac");
        store.insert_locator(&locator).await.unwrap();
        store.insert_locator(&locator).await.unwrap();

        let rows = store.recent_recordings(10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.locator == locator));
    }

    #[tokio::test]
    async fn recent_is_newest_window_oldest_first() {
        let store = store().await;
        for name in ["a", "b", "c", "d"] {
            store
                .insert_locator(&Locator::new(format!("/r/{}.flac", name)))
                .await
                .unwrap();
        }

        let rows = store.recent_recordings(3).await.unwrap();
        let uris: Vec<_> = rows.iter().map(|r| r.locator.as_str()).collect();
        assert_eq!(uris, vec!["/r/b.flac", "/r/c.flac", "/r/d.flac"]);
        assert!(rows[0].id < rows[2].id);
        assert!(rows[0].recorded_at.is_some());
    }

    #[tokio::test]
    async fn queries_leave_the_runtime_thread() {
        let store = store().await;
        let caller = std::thread::current().id();
        let worker = store
            .run(|_| Ok(std::thread::current().id()))
            .await
            .unwrap();
        assert_ne!(caller, worker);
    }

    #[tokio::test]
    async fn file_store_round_trips_through_blocking_pool() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteRecordStore::open(dir.path().join("db/sounds.db")).unwrap();
        store.ensure_schema().await.unwrap();
        store.insert_locator(&Locator::new("/r/a.flac")).await.unwrap();

        let rows = store.recent_recordings(5).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].locator.as_str(), "/r/a.flac");
    }

    #[tokio::test]
    async fn insert_without_schema_fails() {
        let store = SqliteRecordStore::open_memory().unwrap();
        assert!(store.insert_locator(&Locator::new("/r/a.flac")).await.is_err());
    }
}
