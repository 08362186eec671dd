//! Sound addressing, playback state and completion identity

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::effects::EffectKey;
use crate::domain::slots::{Locator, SlotIndex};

/// Address of one independently playable sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SoundKey {
    Effect(EffectKey),
    Slot(SlotIndex),
}

impl SoundKey {
    /// What happens to the loaded resource once the sound stops
    pub const fn unload_policy(&self) -> UnloadPolicy {
        match self {
            Self::Effect(_) => UnloadPolicy::KeepLoaded,
            Self::Slot(_) => UnloadPolicy::UnloadWhenStopped,
        }
    }
}

impl fmt::Display for SoundKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Effect(key) => write!(f, "{}", key),
            Self::Slot(index) => write!(f, "{}", index),
        }
    }
}

impl FromStr for SoundKey {
    type Err = String;

    /// Accepts `music1..3` or `p1..p3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(slot) = s.strip_prefix('p').or_else(|| s.strip_prefix('P')) {
            return slot.parse().map(Self::Slot).map_err(|e| e.to_string());
        }
        s.parse().map(Self::Effect).map_err(|e| e.to_string())
    }
}

/// Resource release rule applied when a sound returns to `Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnloadPolicy {
    /// Stay loaded for fast replay (bundled effects)
    KeepLoaded,
    /// Release as soon as playback ends (one-shot recordings)
    UnloadWhenStopped,
}

/// Per-sound playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

impl PlaybackState {
    pub const fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Something the audio device can load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    /// File shipped with the board
    Bundled(PathBuf),
    /// Clip produced by a recording session
    Recorded(Locator),
}

impl ResourceRef {
    pub fn to_path(&self) -> PathBuf {
        match self {
            Self::Bundled(path) => path.clone(),
            Self::Recorded(locator) => locator.to_path(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path().display())
    }
}

/// Identity of one loaded resource, assigned by the audio device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a single `play()` of a handle.
///
/// Completion signals carry the token so a late signal from an earlier play,
/// or from a resource that was already released, can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackToken {
    pub handle: HandleId,
    pub generation: u64,
}

impl PlaybackToken {
    pub const fn new(handle: HandleId, generation: u64) -> Self {
        Self { handle, generation }
    }
}
