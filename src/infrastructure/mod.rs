//! Infrastructure layer - Adapter implementations
//!
//! Concrete implementations of the port interfaces: audio hardware,
//! SQLite, the XDG config file and desktop notifications.

pub mod audio;
pub mod config;
pub mod notification;
pub mod store;

pub use audio::RodioGateway;
pub use config::{DataPaths, XdgConfigStore, XdgDirs};
pub use notification::{create_notifier, NoOpNotifier, NotifyRustNotifier};
pub use store::SqliteRecordStore;
