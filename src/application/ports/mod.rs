//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod audio_device;
pub mod config;
pub mod notifier;
pub mod record_store;

// Re-export common types
pub use audio_device::{
    AudioDeviceGateway, CompletionReceiver, CompletionSender, DeviceError, LoadError,
    PermissionStatus, PlaybackHandle, RecordingSession,
};
pub use config::ConfigStore;
pub use notifier::{NotificationError, NotificationIcon, Notifier};
pub use record_store::{PersistenceError, RecordStore, StoredRecording};
