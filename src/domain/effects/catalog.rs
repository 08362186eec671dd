//! Effect catalog value object

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::domain::error::InvalidEffectError;
use crate::domain::playback::ResourceRef;

/// All bundled effects, in button order
pub const ALL_EFFECTS: &[EffectKey] = &[EffectKey::Music1, EffectKey::Music2, EffectKey::Music3];

/// Keys of the bundled sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EffectKey {
    Music1,
    Music2,
    Music3,
}

impl EffectKey {
    /// Get the string identifier for this effect
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Music1 => "music1",
            Self::Music2 => "music2",
            Self::Music3 => "music3",
        }
    }

    /// Bundled file name inside the effects directory
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::Music1 => "music.mp3",
            Self::Music2 => "music1.mp3",
            Self::Music3 => "music2.mp3",
        }
    }
}

impl FromStr for EffectKey {
    type Err = InvalidEffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "music1" => Ok(Self::Music1),
            "music2" => Ok(Self::Music2),
            "music3" => Ok(Self::Music3),
            _ => Err(InvalidEffectError {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EffectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable mapping from effect key to its bundled resource
#[derive(Debug, Clone)]
pub struct EffectCatalog {
    entries: BTreeMap<EffectKey, PathBuf>,
}

impl EffectCatalog {
    /// Resolve every bundled effect inside `dir`
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let entries = ALL_EFFECTS
            .iter()
            .map(|key| (*key, dir.join(key.file_name())))
            .collect();
        Self { entries }
    }

    pub fn resource(&self, key: EffectKey) -> Option<ResourceRef> {
        self.entries
            .get(&key)
            .map(|path| ResourceRef::Bundled(path.clone()))
    }

    pub fn keys(&self) -> impl Iterator<Item = EffectKey> + '_ {
        self.entries.keys().copied()
    }

    /// Keys whose bundled file does not exist on disk
    pub fn missing(&self) -> Vec<EffectKey> {
        self.entries
            .iter()
            .filter(|(_, path)| !path.exists())
            .map(|(key, _)| *key)
            .collect()
    }
}
