//! Recording index port interface

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::slots::Locator;

/// Storage-layer failures. Logged, never surfaced to the recording flow.
#[derive(Debug, Clone, Error)]
#[error("Recording store error: {0}")]
pub struct PersistenceError(pub String);

/// A persisted recording row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredRecording {
    pub id: i64,
    pub locator: Locator,
    pub recorded_at: Option<String>,
}

/// Port for the durable table of recording locators
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the table if missing. Idempotent.
    async fn ensure_schema(&self) -> Result<(), PersistenceError>;

    /// Append a locator. No uniqueness is enforced.
    async fn insert_locator(&self, locator: &Locator) -> Result<(), PersistenceError>;

    /// The newest `limit` rows, oldest first.
    async fn recent_recordings(&self, limit: usize)
        -> Result<Vec<StoredRecording>, PersistenceError>;
}
