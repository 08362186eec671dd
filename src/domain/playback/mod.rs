//! Playback addressing and identity

mod sound;

pub use sound::{HandleId, PlaybackState, PlaybackToken, ResourceRef, SoundKey, UnloadPolicy};
