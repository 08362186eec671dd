//! Audio device adapter
//!
//! rodio for playback, cpal for capture, FLAC files for recorded clips.

mod capture;
mod flac;
mod output;
mod player;

pub use capture::CpalSession;
pub use flac::{encode_to_flac, EncodingError};
pub use player::RodioHandle;

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use self::output::OutputDevice;
use crate::application::ports::{
    AudioDeviceGateway, DeviceError, LoadError, PermissionStatus,
};
use crate::domain::playback::{HandleId, ResourceRef};
use crate::domain::recording::QualityPreset;

/// Audio gateway for the local machine
pub struct RodioGateway {
    output: Arc<OutputDevice>,
    recordings_dir: PathBuf,
    next_handle: AtomicU64,
}

impl RodioGateway {
    /// Open the default output device. Clips are written to `recordings_dir`.
    pub fn open(recordings_dir: impl Into<PathBuf>) -> Result<Self, DeviceError> {
        Ok(Self {
            output: Arc::new(OutputDevice::open()?),
            recordings_dir: recordings_dir.into(),
            next_handle: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl AudioDeviceGateway for RodioGateway {
    type Session = CpalSession;
    type Handle = RodioHandle;

    /// Desktop hosts have no consent prompt; access exists when an input
    /// device does.
    async fn request_permission(&self) -> PermissionStatus {
        match tokio::task::spawn_blocking(capture::input_available).await {
            Ok(true) => PermissionStatus::Granted,
            Ok(false) => PermissionStatus::Denied,
            Err(e) => {
                warn!(error = %e, "input device probe failed");
                PermissionStatus::Denied
            }
        }
    }

    async fn begin_recording(&self, preset: QualityPreset) -> Result<CpalSession, DeviceError> {
        CpalSession::start(preset, self.recordings_dir.clone()).await
    }

    async fn load_sound(&self, resource: &ResourceRef) -> Result<RodioHandle, LoadError> {
        let id = HandleId(self.next_handle.fetch_add(1, Ordering::SeqCst));
        let path = resource.to_path();
        let output = Arc::clone(&self.output);

        tokio::task::spawn_blocking(move || RodioHandle::load(id, &path, output.handle()))
            .await
            .map_err(|e| LoadError::Output(format!("Task join error: {}", e)))?
    }
}
