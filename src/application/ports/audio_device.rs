//! Audio device port interfaces
//!
//! The platform audio service: microphone permission, recording sessions
//! and loadable playback handles.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::playback::{PlaybackToken, ResourceRef};
use crate::domain::recording::QualityPreset;
use crate::domain::slots::Locator;

/// Sender half of the natural-completion channel
pub type CompletionSender = mpsc::UnboundedSender<PlaybackToken>;

/// Receiver half of the natural-completion channel
pub type CompletionReceiver = mpsc::UnboundedReceiver<PlaybackToken>;

/// Hardware or session failures
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    #[error("No audio input device available")]
    NoInputDevice,

    #[error("No audio output device available: {0}")]
    NoOutputDevice(String),

    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Failed to finish recording: {0}")]
    FinishFailed(String),

    #[error("No recording session is active")]
    NoActiveSession,
}

/// Failures loading or starting a playable resource
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("Sound file not found: {0}")]
    NotFound(String),

    #[error("Could not decode sound: {0}")]
    Decode(String),

    #[error("Audio output unavailable: {0}")]
    Output(String),
}

/// Outcome of a microphone permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Entry point to the platform audio service
#[async_trait]
pub trait AudioDeviceGateway: Send + Sync {
    type Session: RecordingSession;
    type Handle: PlaybackHandle;

    /// Ask for microphone access. May wait on user interaction.
    async fn request_permission(&self) -> PermissionStatus;

    /// Open the microphone and start capturing.
    async fn begin_recording(&self, preset: QualityPreset) -> Result<Self::Session, DeviceError>;

    /// Load a playable sound. The handle owns the device resources until
    /// `unload` is called.
    async fn load_sound(&self, resource: &ResourceRef) -> Result<Self::Handle, LoadError>;
}

/// A live microphone capture; exclusive owner of the input device
#[async_trait]
pub trait RecordingSession: Send + Sync + 'static {
    /// Stop capturing and return where the finished clip lives.
    async fn finish(self) -> Result<Locator, DeviceError>;

    /// Stop capturing and discard the audio.
    async fn cancel(self);
}

/// One loaded, possibly playing, sound
#[async_trait]
pub trait PlaybackHandle: Send + Sync + 'static {
    /// Register where natural-completion tokens are sent.
    fn on_finished(&self, completions: CompletionSender);

    /// Start playing from the beginning. The returned token is the one a
    /// natural completion of this play will carry.
    async fn play(&self) -> Result<PlaybackToken, LoadError>;

    async fn stop(&self) -> Result<(), DeviceError>;

    /// Release the underlying resources.
    async fn unload(self);
}
