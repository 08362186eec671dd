//! Recording index storage

mod sqlite;

pub use sqlite::SqliteRecordStore;
