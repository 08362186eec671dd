//! Sound board use case
//!
//! Wires the slot manager and playback coordinator to the injected devices
//! and publishes a snapshot after every state change.

use std::collections::BTreeSet;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::effects::{EffectCatalog, EffectKey};
use crate::domain::playback::{PlaybackState, PlaybackToken, ResourceRef, SoundKey};
use crate::domain::recorder::{InvalidStateTransition, RecorderState};
use crate::domain::recording::QualityPreset;
use crate::domain::slots::{Locator, SlotIndex};

use super::error::SoundboardError;
use super::playback::PlaybackCoordinator;
use super::ports::{AudioDeviceGateway, CompletionReceiver, LoadError, Notifier, RecordStore};
use super::slot_manager::SlotManager;

/// Options for a board session
#[derive(Debug, Clone)]
pub struct SoundboardConfig {
    pub quality: QualityPreset,
    /// Raise desktop notifications for permission and device errors
    pub enable_notify: bool,
    /// Seed the slots from the record store on open
    pub restore_slots: bool,
    /// Load every bundled effect on open
    pub preload_effects: bool,
}

impl Default for SoundboardConfig {
    fn default() -> Self {
        Self {
            quality: QualityPreset::default(),
            enable_notify: false,
            restore_slots: false,
            preload_effects: true,
        }
    }
}

/// Read-only view of the board for presentation layers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardSnapshot {
    pub recorder: RecorderState,
    pub slots: Vec<Option<Locator>>,
    pub next_slot: SlotIndex,
    pub playing: BTreeSet<SoundKey>,
}

impl BoardSnapshot {
    pub fn is_playing(&self, key: SoundKey) -> bool {
        self.playing.contains(&key)
    }
}

/// Result of the record button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordToggle {
    Started,
    Stored(SlotIndex),
}

pub struct Soundboard<G, S, N>
where
    G: AudioDeviceGateway,
    S: RecordStore,
    N: Notifier,
{
    slots: SlotManager<S>,
    playback: PlaybackCoordinator<G>,
    catalog: EffectCatalog,
    notifier: N,
    config: SoundboardConfig,
    updates: watch::Sender<BoardSnapshot>,
}

impl<G, S, N> Soundboard<G, S, N>
where
    G: AudioDeviceGateway,
    S: RecordStore,
    N: Notifier,
{
    /// Open a board session.
    ///
    /// Returns the board and the completion receiver, which the caller's
    /// event loop must feed back through `on_playback_finished`.
    pub async fn open(
        gateway: G,
        store: S,
        notifier: N,
        catalog: EffectCatalog,
        config: SoundboardConfig,
    ) -> (Self, CompletionReceiver) {
        let slots = SlotManager::new(store);
        slots.ensure_schema().await;
        if config.restore_slots {
            slots.restore().await;
        }

        let (playback, completions) = PlaybackCoordinator::new(gateway, config.quality);
        for key in catalog.missing() {
            debug!(effect = %key, "bundled effect file is missing");
        }
        if config.preload_effects {
            for key in catalog.keys() {
                if let Some(resource) = catalog.resource(key) {
                    playback.preload(SoundKey::Effect(key), resource).await;
                }
            }
        }

        let (updates, _) = watch::channel(BoardSnapshot::default());
        let board = Self {
            slots,
            playback,
            catalog,
            notifier,
            config,
            updates,
        };
        board.publish().await;
        info!("sound board open");
        (board, completions)
    }

    /// Stop everything and release the devices.
    pub async fn close(&self) {
        self.playback.shutdown().await;
        self.publish().await;
        info!("sound board closed");
    }

    /// Receive a fresh snapshot after every change
    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            recorder: self.playback.recorder_state().await,
            slots: self.slots.slot_contents(),
            next_slot: self.slots.next_index(),
            playing: self.playback.playing().await,
        }
    }

    async fn publish(&self) {
        let snapshot = self.snapshot().await;
        self.updates.send_replace(snapshot);
    }

    /// Alert the user for errors that need it, then hand the result back.
    async fn report<T>(&self, result: Result<T, SoundboardError>) -> Result<T, SoundboardError> {
        if let Err(err) = &result {
            if err.requires_alert() && self.config.enable_notify {
                if let Err(e) = self
                    .notifier
                    .notify(err.alert_title(), &err.to_string(), err.alert_icon())
                    .await
                {
                    warn!(error = %e, "alert failed");
                }
            }
        }
        result
    }

    pub async fn recorder_state(&self) -> RecorderState {
        self.playback.recorder_state().await
    }

    pub fn slot_contents(&self) -> Vec<Option<Locator>> {
        self.slots.slot_contents()
    }

    pub fn next_slot(&self) -> SlotIndex {
        self.slots.next_index()
    }

    pub async fn start_recording(&self) -> Result<(), SoundboardError> {
        let result = self.playback.start_recording().await;
        self.publish().await;
        self.report(result).await
    }

    /// Finish the recording and store it in the next slot.
    pub async fn stop_recording(&self) -> Result<SlotIndex, SoundboardError> {
        let result = match self.playback.stop_recording().await {
            Ok(locator) => Ok(self.slots.record_completed(locator).await),
            Err(e) => Err(e),
        };
        self.publish().await;
        self.report(result).await
    }

    /// Start when idle, stop and store when recording.
    pub async fn toggle_recording(&self) -> Result<RecordToggle, SoundboardError> {
        match self.playback.recorder_state().await {
            RecorderState::Idle => self.start_recording().await.map(|()| RecordToggle::Started),
            RecorderState::Recording => self.stop_recording().await.map(RecordToggle::Stored),
            current_state => Err(InvalidStateTransition {
                current_state,
                action: "toggle recording".to_string(),
            }
            .into()),
        }
    }

    pub async fn toggle_effect(&self, key: EffectKey) -> Result<PlaybackState, SoundboardError> {
        let sound = SoundKey::Effect(key);
        let Some(resource) = self.catalog.resource(key) else {
            return Err(SoundboardError::Load {
                key: sound,
                source: LoadError::NotFound(key.file_name().to_string()),
            });
        };
        self.toggle_resource(sound, resource).await
    }

    pub async fn toggle_slot(&self, index: SlotIndex) -> Result<PlaybackState, SoundboardError> {
        let Some(locator) = self.slots.slot(index) else {
            return Err(SoundboardError::EmptySlot(index));
        };
        self.toggle_resource(SoundKey::Slot(index), ResourceRef::Recorded(locator))
            .await
    }

    pub async fn toggle_sound(&self, key: SoundKey) -> Result<PlaybackState, SoundboardError> {
        match key {
            SoundKey::Effect(effect) => self.toggle_effect(effect).await,
            SoundKey::Slot(index) => self.toggle_slot(index).await,
        }
    }

    async fn toggle_resource(
        &self,
        key: SoundKey,
        resource: ResourceRef,
    ) -> Result<PlaybackState, SoundboardError> {
        let result = self.playback.toggle_sound(key, resource).await;
        self.publish().await;
        self.report(result).await
    }

    /// Apply a natural completion from the completion channel.
    pub async fn on_playback_finished(&self, token: PlaybackToken) -> Option<SoundKey> {
        let stopped = self.playback.on_playback_finished(token).await;
        if stopped.is_some() {
            self.publish().await;
        }
        stopped
    }
}
