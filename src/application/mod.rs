//! Application layer - Use cases and port interfaces
//!
//! Contains the sound board operations and trait definitions
//! for the audio device and storage the board depends on.

pub mod error;
pub mod playback;
pub mod ports;
pub mod slot_manager;
pub mod soundboard;

// Re-export use cases
pub use error::SoundboardError;
pub use playback::PlaybackCoordinator;
pub use slot_manager::SlotManager;
pub use soundboard::{BoardSnapshot, RecordToggle, Soundboard, SoundboardConfig};
