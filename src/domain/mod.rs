//! Domain layer - Core sound board model
//!
//! Contains value objects, the slot ring and the recorder state machine.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod effects;
pub mod error;
pub mod playback;
pub mod recorder;
pub mod recording;
pub mod slots;

// Re-export common types
pub use config::AppConfig;
pub use effects::{EffectCatalog, EffectKey};
pub use error::*;
pub use playback::{HandleId, PlaybackState, PlaybackToken, ResourceRef, SoundKey, UnloadPolicy};
pub use recorder::{InvalidStateTransition, RecorderSession, RecorderState};
pub use recording::QualityPreset;
pub use slots::{Locator, SlotIndex, SlotRing, SLOT_COUNT};
