//! Playback coordinator use case
//!
//! Sequences microphone and playback requests against the audio device.
//! Each sound key runs its own Stopped/Playing machine; the recorder is a
//! separate machine. Nothing is mutually exclusive across keys, and a
//! recording may run while sounds play.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::domain::playback::{PlaybackState, PlaybackToken, ResourceRef, SoundKey, UnloadPolicy};
use crate::domain::recorder::{RecorderSession, RecorderState};
use crate::domain::recording::QualityPreset;
use crate::domain::slots::Locator;

use super::error::SoundboardError;
use super::ports::{
    AudioDeviceGateway, CompletionReceiver, CompletionSender, DeviceError, PlaybackHandle,
    RecordingSession,
};

/// Loaded resource and state for one sound key
struct SoundEntry<H> {
    handle: Option<H>,
    state: PlaybackState,
    /// Token of the play a natural completion must match
    current: Option<PlaybackToken>,
}

impl<H> Default for SoundEntry<H> {
    fn default() -> Self {
        Self {
            handle: None,
            state: PlaybackState::Stopped,
            current: None,
        }
    }
}

struct Microphone<S> {
    session: RecorderSession,
    live: Option<S>,
}

pub struct PlaybackCoordinator<G: AudioDeviceGateway> {
    gateway: G,
    quality: QualityPreset,
    permission_granted: AtomicBool,
    microphone: Mutex<Microphone<G::Session>>,
    sounds: Mutex<HashMap<SoundKey, SoundEntry<G::Handle>>>,
    completions: CompletionSender,
}

impl<G: AudioDeviceGateway> PlaybackCoordinator<G> {
    /// Create a coordinator and the channel its handles report completions on.
    /// The receiver must be pumped into `on_playback_finished`.
    pub fn new(gateway: G, quality: QualityPreset) -> (Self, CompletionReceiver) {
        let (completions, receiver) = mpsc::unbounded_channel();
        let coordinator = Self {
            gateway,
            quality,
            permission_granted: AtomicBool::new(false),
            microphone: Mutex::new(Microphone {
                session: RecorderSession::new(),
                live: None,
            }),
            sounds: Mutex::new(HashMap::new()),
            completions,
        };
        (coordinator, receiver)
    }

    pub async fn recorder_state(&self) -> RecorderState {
        self.microphone.lock().await.session.state()
    }

    /// Keys currently playing
    pub async fn playing(&self) -> BTreeSet<SoundKey> {
        self.sounds
            .lock()
            .await
            .iter()
            .filter(|(_, entry)| entry.state.is_playing())
            .map(|(key, _)| *key)
            .collect()
    }

    pub async fn state_of(&self, key: SoundKey) -> PlaybackState {
        self.sounds
            .lock()
            .await
            .get(&key)
            .map(|entry| entry.state)
            .unwrap_or_default()
    }

    /// Whether a resource is currently loaded for `key`
    pub async fn is_loaded(&self, key: SoundKey) -> bool {
        self.sounds
            .lock()
            .await
            .get(&key)
            .is_some_and(|entry| entry.handle.is_some())
    }

    /// Start capturing. Only allowed from idle; a second request while one
    /// is still arming is rejected.
    pub async fn start_recording(&self) -> Result<(), SoundboardError> {
        self.microphone.lock().await.session.begin_arming()?;

        if let Err(e) = self.arm().await {
            let _ = self.microphone.lock().await.session.abort_arming();
            return Err(e);
        }
        info!(quality = %self.quality, "recording started");
        Ok(())
    }

    async fn arm(&self) -> Result<(), SoundboardError> {
        self.ensure_permission().await?;

        let live = self.gateway.begin_recording(self.quality).await.map_err(|e| {
            error!(error = %e, "failed to start recording");
            SoundboardError::from(e)
        })?;

        let mut microphone = self.microphone.lock().await;
        if let Err(e) = microphone.session.confirm_recording() {
            // The board was shut down while the device was starting.
            drop(microphone);
            live.cancel().await;
            return Err(e.into());
        }
        microphone.live = Some(live);
        Ok(())
    }

    async fn ensure_permission(&self) -> Result<(), SoundboardError> {
        if self.permission_granted.load(Ordering::SeqCst) {
            return Ok(());
        }
        if self.gateway.request_permission().await.is_granted() {
            self.permission_granted.store(true, Ordering::SeqCst);
            Ok(())
        } else {
            warn!("microphone permission denied");
            Err(SoundboardError::PermissionDenied)
        }
    }

    /// Stop capturing and return the finished clip.
    ///
    /// The recorder is back in idle afterwards even if the device failed.
    pub async fn stop_recording(&self) -> Result<Locator, SoundboardError> {
        let live = {
            let mut microphone = self.microphone.lock().await;
            microphone.session.begin_finishing()?;
            microphone.live.take()
        };

        let result = match live {
            Some(session) => session.finish().await,
            None => Err(DeviceError::NoActiveSession),
        };

        if let Err(e) = self.microphone.lock().await.session.complete_finishing() {
            debug!(error = %e, "recorder already reset");
        }

        result.map_err(|e| {
            error!(error = %e, "failed to finish recording");
            e.into()
        })
    }

    /// Start `key` if it is stopped, stop it if it is playing.
    pub async fn toggle_sound(
        &self,
        key: SoundKey,
        resource: ResourceRef,
    ) -> Result<PlaybackState, SoundboardError> {
        let mut sounds = self.sounds.lock().await;
        let entry = sounds.entry(key).or_default();

        if entry.state.is_playing() {
            entry.state = PlaybackState::Stopped;
            entry.current = None;
            if let Some(handle) = entry.handle.as_ref() {
                if let Err(e) = handle.stop().await {
                    warn!(sound = %key, error = %e, "stop failed");
                }
            }
            if key.unload_policy() == UnloadPolicy::UnloadWhenStopped {
                if let Some(handle) = entry.handle.take() {
                    handle.unload().await;
                }
            }
            debug!(sound = %key, "stopped");
            return Ok(PlaybackState::Stopped);
        }

        if entry.handle.is_none() {
            let handle = self
                .gateway
                .load_sound(&resource)
                .await
                .map_err(|source| {
                    warn!(sound = %key, resource = %resource, error = %source, "load failed");
                    SoundboardError::Load { key, source }
                })?;
            handle.on_finished(self.completions.clone());
            entry.handle = Some(handle);
        }

        let Some(handle) = entry.handle.as_ref() else {
            return Ok(PlaybackState::Stopped);
        };
        match handle.play().await {
            Ok(token) => {
                entry.state = PlaybackState::Playing;
                entry.current = Some(token);
                debug!(sound = %key, handle = %token.handle, "playing");
                Ok(PlaybackState::Playing)
            }
            Err(source) => {
                entry.state = PlaybackState::Stopped;
                entry.current = None;
                if key.unload_policy() == UnloadPolicy::UnloadWhenStopped {
                    if let Some(handle) = entry.handle.take() {
                        handle.unload().await;
                    }
                }
                warn!(sound = %key, error = %source, "play failed");
                Err(SoundboardError::Load { key, source })
            }
        }
    }

    /// Load `key` without playing it. Failures are logged only.
    pub async fn preload(&self, key: SoundKey, resource: ResourceRef) {
        let mut sounds = self.sounds.lock().await;
        let entry = sounds.entry(key).or_default();
        if entry.handle.is_some() {
            return;
        }
        match self.gateway.load_sound(&resource).await {
            Ok(handle) => {
                handle.on_finished(self.completions.clone());
                entry.handle = Some(handle);
                debug!(sound = %key, "preloaded");
            }
            Err(e) => warn!(sound = %key, resource = %resource, error = %e, "preload failed"),
        }
    }

    /// Apply a natural completion. Returns the key that stopped, or `None`
    /// when the token no longer matches the key's current play.
    pub async fn on_playback_finished(&self, token: PlaybackToken) -> Option<SoundKey> {
        let mut sounds = self.sounds.lock().await;
        let Some((key, entry)) = sounds
            .iter_mut()
            .find(|(_, entry)| entry.current == Some(token))
        else {
            debug!(handle = %token.handle, generation = token.generation, "ignoring stale completion");
            return None;
        };

        let key = *key;
        entry.state = PlaybackState::Stopped;
        entry.current = None;
        if key.unload_policy() == UnloadPolicy::UnloadWhenStopped {
            if let Some(handle) = entry.handle.take() {
                handle.unload().await;
            }
        }
        debug!(sound = %key, "finished");
        Some(key)
    }

    /// Stop and release everything, discarding a live recording.
    pub async fn shutdown(&self) {
        let live = {
            let mut microphone = self.microphone.lock().await;
            microphone.session.reset();
            microphone.live.take()
        };
        if let Some(session) = live {
            info!("discarding unfinished recording");
            session.cancel().await;
        }

        let entries: Vec<_> = self.sounds.lock().await.drain().collect();
        for (key, entry) in entries {
            if let Some(handle) = entry.handle {
                if entry.state.is_playing() {
                    if let Err(e) = handle.stop().await {
                        warn!(sound = %key, error = %e, "stop failed during shutdown");
                    }
                }
                handle.unload().await;
            }
        }
    }
}
