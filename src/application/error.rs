//! Errors surfaced by the sound board use cases

use thiserror::Error;

use crate::domain::playback::SoundKey;
use crate::domain::recorder::InvalidStateTransition;
use crate::domain::slots::SlotIndex;

use super::ports::{DeviceError, LoadError, NotificationIcon};

/// Errors from the sound board operations.
///
/// Storage failures never appear here; they are logged where they happen.
#[derive(Debug, Error)]
pub enum SoundboardError {
    #[error("Microphone permission denied")]
    PermissionDenied,

    #[error("Audio device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Could not play {key}: {source}")]
    Load {
        key: SoundKey,
        #[source]
        source: LoadError,
    },

    #[error("{0} is empty")]
    EmptySlot(SlotIndex),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),
}

impl SoundboardError {
    /// Whether the user must be interrupted with a blocking alert
    pub fn requires_alert(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::Device(_))
    }

    /// Title used for the alert
    pub fn alert_title(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Microphone Access",
            Self::Device(_) => "Recording Error",
            Self::Load { .. } => "Playback Error",
            Self::EmptySlot(_) | Self::InvalidState(_) => "Sound Board",
        }
    }

    /// Icon used for the alert; a denial is something the user can fix
    pub fn alert_icon(&self) -> NotificationIcon {
        match self {
            Self::PermissionDenied => NotificationIcon::Warning,
            _ => NotificationIcon::Error,
        }
    }
}
