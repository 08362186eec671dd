//! Board scenarios against a scripted audio device and a real SQLite index

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use soundboard::application::ports::{
    AudioDeviceGateway, CompletionReceiver, CompletionSender, DeviceError, LoadError,
    PermissionStatus, PersistenceError, PlaybackHandle, RecordStore, RecordingSession,
    StoredRecording,
};
use soundboard::application::{RecordToggle, Soundboard, SoundboardConfig, SoundboardError};
use soundboard::domain::effects::{EffectCatalog, EffectKey};
use soundboard::domain::playback::{HandleId, PlaybackState, PlaybackToken, ResourceRef, SoundKey};
use soundboard::domain::recorder::RecorderState;
use soundboard::domain::recording::QualityPreset;
use soundboard::domain::slots::{Locator, SlotIndex};
use soundboard::infrastructure::{NoOpNotifier, SqliteRecordStore};

/// Shared script and counters for the fake device
#[derive(Default)]
struct DeviceState {
    denied: AtomicBool,
    clips: AtomicUsize,
    next_handle: AtomicU64,
    loads: AtomicUsize,
    unloads: AtomicUsize,
    plays: Mutex<Vec<PlaybackToken>>,
    completions: Mutex<Option<CompletionSender>>,
    /// (reached, release): pauses the permission prompt
    gate: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

#[derive(Clone, Default)]
struct Device(Arc<DeviceState>);

impl Device {
    fn deny(&self, denied: bool) {
        self.0.denied.store(denied, Ordering::SeqCst);
    }

    fn loads(&self) -> usize {
        self.0.loads.load(Ordering::SeqCst)
    }

    fn unloads(&self) -> usize {
        self.0.unloads.load(Ordering::SeqCst)
    }

    fn plays(&self) -> Vec<PlaybackToken> {
        self.0.plays.lock().unwrap().clone()
    }

    /// Report a natural end of `token` through the completion channel
    fn drain(&self, token: PlaybackToken) {
        let sender = self.0.completions.lock().unwrap().clone();
        sender.expect("no handle registered").send(token).unwrap();
    }

    fn hold_permission_prompt(&self) -> (Arc<Notify>, Arc<Notify>) {
        let reached = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.0.gate.lock().unwrap() = Some((Arc::clone(&reached), Arc::clone(&release)));
        (reached, release)
    }
}

struct Clip(usize);

#[async_trait]
impl RecordingSession for Clip {
    async fn finish(self) -> Result<Locator, DeviceError> {
        Ok(Locator::new(format!("/clips/{}.flac", self.0)))
    }

    async fn cancel(self) {}
}

struct Sound {
    id: HandleId,
    generation: AtomicU64,
    device: Arc<DeviceState>,
}

#[async_trait]
impl PlaybackHandle for Sound {
    fn on_finished(&self, completions: CompletionSender) {
        *self.device.completions.lock().unwrap() = Some(completions);
    }

    async fn play(&self) -> Result<PlaybackToken, LoadError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = PlaybackToken::new(self.id, generation);
        self.device.plays.lock().unwrap().push(token);
        Ok(token)
    }

    async fn stop(&self) -> Result<(), DeviceError> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn unload(self) {
        self.device.unloads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AudioDeviceGateway for Device {
    type Session = Clip;
    type Handle = Sound;

    async fn request_permission(&self) -> PermissionStatus {
        let gate = self.0.gate.lock().unwrap().clone();
        if let Some((reached, release)) = gate {
            reached.notify_one();
            release.notified().await;
        }
        if self.0.denied.load(Ordering::SeqCst) {
            PermissionStatus::Denied
        } else {
            PermissionStatus::Granted
        }
    }

    async fn begin_recording(&self, _preset: QualityPreset) -> Result<Clip, DeviceError> {
        Ok(Clip(self.0.clips.fetch_add(1, Ordering::SeqCst) + 1))
    }

    async fn load_sound(&self, _resource: &ResourceRef) -> Result<Sound, LoadError> {
        self.0.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Sound {
            id: HandleId(self.0.next_handle.fetch_add(1, Ordering::SeqCst) + 1),
            generation: AtomicU64::new(0),
            device: Arc::clone(&self.0),
        })
    }
}

/// A store whose writes always fail
struct BrokenStore;

#[async_trait]
impl RecordStore for BrokenStore {
    async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        Err(PersistenceError("disk full".into()))
    }

    async fn insert_locator(&self, _locator: &Locator) -> Result<(), PersistenceError> {
        Err(PersistenceError("disk full".into()))
    }

    async fn recent_recordings(
        &self,
        _limit: usize,
    ) -> Result<Vec<StoredRecording>, PersistenceError> {
        Err(PersistenceError("disk full".into()))
    }
}

type Board<S> = Soundboard<Device, S, NoOpNotifier>;

fn config(preload_effects: bool, restore_slots: bool) -> SoundboardConfig {
    SoundboardConfig {
        preload_effects,
        restore_slots,
        ..Default::default()
    }
}

async fn open_board<S: RecordStore>(
    device: &Device,
    store: S,
    config: SoundboardConfig,
) -> (Board<S>, CompletionReceiver) {
    Soundboard::open(
        device.clone(),
        store,
        NoOpNotifier::new(),
        EffectCatalog::from_dir("/sfx"),
        config,
    )
    .await
}

fn slot(n: usize) -> SlotIndex {
    SlotIndex::new(n).unwrap()
}

async fn record<S: RecordStore>(board: &Board<S>) -> SlotIndex {
    assert_eq!(board.toggle_recording().await.unwrap(), RecordToggle::Started);
    match board.toggle_recording().await.unwrap() {
        RecordToggle::Stored(index) => index,
        other => panic!("expected a stored clip, got {:?}", other),
    }
}

fn database(dir: &Path) -> SqliteRecordStore {
    SqliteRecordStore::open(dir.join("recordings.db")).unwrap()
}

#[tokio::test]
async fn recordings_fill_slots_round_robin_and_are_indexed() {
    let dir = tempfile::tempdir().unwrap();
    let device = Device::default();
    let (board, _completions) = open_board(&device, database(dir.path()), config(false, false)).await;

    let stored: Vec<usize> = [
        record(&board).await,
        record(&board).await,
        record(&board).await,
        record(&board).await,
    ]
    .iter()
    .map(SlotIndex::get)
    .collect();

    assert_eq!(stored, vec![0, 1, 2, 0]);
    assert_eq!(
        board.slot_contents(),
        vec![
            Some(Locator::new("/clips/4.flac")),
            Some(Locator::new("/clips/2.flac")),
            Some(Locator::new("/clips/3.flac")),
        ]
    );
    assert_eq!(board.next_slot(), slot(1));
    assert_eq!(board.recorder_state().await, RecorderState::Idle);

    let rows = database(dir.path()).recent_recordings(10).await.unwrap();
    let uris: Vec<_> = rows.iter().map(|r| r.locator.as_str()).collect();
    assert_eq!(
        uris,
        vec!["/clips/1.flac", "/clips/2.flac", "/clips/3.flac", "/clips/4.flac"]
    );
}

#[tokio::test]
async fn restore_refills_slots_from_previous_session() {
    let dir = tempfile::tempdir().unwrap();
    let device = Device::default();
    {
        let (board, _completions) =
            open_board(&device, database(dir.path()), config(false, false)).await;
        for _ in 0..4 {
            record(&board).await;
        }
        board.close().await;
    }

    let (board, _completions) = open_board(&device, database(dir.path()), config(false, true)).await;
    assert_eq!(
        board.slot_contents(),
        vec![
            Some(Locator::new("/clips/2.flac")),
            Some(Locator::new("/clips/3.flac")),
            Some(Locator::new("/clips/4.flac")),
        ]
    );
}

#[tokio::test]
async fn persistence_failure_keeps_the_slot() {
    let device = Device::default();
    let (board, _completions) = open_board(&device, BrokenStore, config(false, false)).await;

    assert_eq!(record(&board).await, slot(0));
    assert_eq!(board.slot_contents()[0], Some(Locator::new("/clips/1.flac")));
    assert_eq!(board.recorder_state().await, RecorderState::Idle);
    assert_eq!(
        board.toggle_slot(slot(0)).await.unwrap(),
        PlaybackState::Playing
    );
}

#[tokio::test]
async fn stale_completion_from_earlier_play_is_ignored() {
    let device = Device::default();
    let store = SqliteRecordStore::open_memory().unwrap();
    let (board, mut completions) = open_board(&device, store, config(false, false)).await;
    let music = SoundKey::Effect(EffectKey::Music1);

    assert_eq!(board.toggle_sound(music).await.unwrap(), PlaybackState::Playing);
    assert_eq!(board.toggle_sound(music).await.unwrap(), PlaybackState::Stopped);
    assert_eq!(board.toggle_sound(music).await.unwrap(), PlaybackState::Playing);

    let plays = device.plays();
    assert_eq!(plays.len(), 2);

    device.drain(plays[0]);
    let token = completions.recv().await.unwrap();
    assert_eq!(board.on_playback_finished(token).await, None);
    assert!(board.snapshot().await.is_playing(music));

    device.drain(plays[1]);
    let token = completions.recv().await.unwrap();
    assert_eq!(board.on_playback_finished(token).await, Some(music));
    assert!(board.snapshot().await.playing.is_empty());
}

#[tokio::test]
async fn completion_from_unloaded_slot_handle_is_ignored() {
    let device = Device::default();
    let store = SqliteRecordStore::open_memory().unwrap();
    let (board, mut completions) = open_board(&device, store, config(false, false)).await;
    let index = record(&board).await;
    let key = SoundKey::Slot(index);

    assert_eq!(board.toggle_slot(index).await.unwrap(), PlaybackState::Playing);
    assert_eq!(board.toggle_slot(index).await.unwrap(), PlaybackState::Stopped);
    assert_eq!(device.unloads(), 1);
    assert_eq!(board.toggle_slot(index).await.unwrap(), PlaybackState::Playing);

    let plays = device.plays();
    assert_eq!(device.loads(), 2);
    assert_ne!(plays[0].handle, plays[1].handle);
    assert_eq!(plays[0].generation, plays[1].generation);

    device.drain(plays[0]);
    let token = completions.recv().await.unwrap();
    assert_eq!(board.on_playback_finished(token).await, None);
    assert!(board.snapshot().await.is_playing(key));
    assert_eq!(device.unloads(), 1);

    device.drain(plays[1]);
    let token = completions.recv().await.unwrap();
    assert_eq!(board.on_playback_finished(token).await, Some(key));
    assert!(board.snapshot().await.playing.is_empty());
    assert_eq!(device.unloads(), 2);
}

#[tokio::test]
async fn effects_stay_loaded_between_plays() {
    let device = Device::default();
    let store = SqliteRecordStore::open_memory().unwrap();
    let (board, _completions) = open_board(&device, store, config(true, false)).await;
    assert_eq!(device.loads(), 3);

    for _ in 0..2 {
        board.toggle_effect(EffectKey::Music2).await.unwrap();
        board.toggle_effect(EffectKey::Music2).await.unwrap();
    }

    assert_eq!(device.loads(), 3);
    assert_eq!(device.unloads(), 0);
}

#[tokio::test]
async fn recorded_slot_is_released_after_playing_through() {
    let device = Device::default();
    let store = SqliteRecordStore::open_memory().unwrap();
    let (board, mut completions) = open_board(&device, store, config(false, false)).await;
    let index = record(&board).await;

    assert_eq!(board.toggle_slot(index).await.unwrap(), PlaybackState::Playing);
    assert_eq!(device.loads(), 1);

    device.drain(device.plays()[0]);
    let token = completions.recv().await.unwrap();
    assert_eq!(
        board.on_playback_finished(token).await,
        Some(SoundKey::Slot(index))
    );
    assert_eq!(device.unloads(), 1);

    assert_eq!(board.toggle_slot(index).await.unwrap(), PlaybackState::Playing);
    assert_eq!(device.loads(), 2);
}

#[tokio::test]
async fn sounds_play_independently_while_recording() {
    let device = Device::default();
    let store = SqliteRecordStore::open_memory().unwrap();
    let (board, _completions) = open_board(&device, store, config(false, false)).await;
    let index = record(&board).await;

    board.toggle_effect(EffectKey::Music1).await.unwrap();
    board.toggle_effect(EffectKey::Music3).await.unwrap();
    board.toggle_slot(index).await.unwrap();
    board.start_recording().await.unwrap();

    let snapshot = board.snapshot().await;
    assert_eq!(snapshot.playing.len(), 3);
    assert_eq!(snapshot.recorder, RecorderState::Recording);

    board.toggle_effect(EffectKey::Music1).await.unwrap();
    let snapshot = board.snapshot().await;
    assert!(!snapshot.is_playing(SoundKey::Effect(EffectKey::Music1)));
    assert!(snapshot.is_playing(SoundKey::Effect(EffectKey::Music3)));
}

#[tokio::test]
async fn denied_permission_can_be_retried() {
    let device = Device::default();
    device.deny(true);
    let store = SqliteRecordStore::open_memory().unwrap();
    let (board, _completions) = open_board(&device, store, config(false, false)).await;

    let err = board.start_recording().await.unwrap_err();
    assert!(matches!(err, SoundboardError::PermissionDenied));
    assert_eq!(board.recorder_state().await, RecorderState::Idle);

    device.deny(false);
    board.start_recording().await.unwrap();
    assert_eq!(board.recorder_state().await, RecorderState::Recording);
}

#[tokio::test]
async fn second_start_while_arming_is_rejected() {
    let device = Device::default();
    let (reached, release) = device.hold_permission_prompt();
    let store = SqliteRecordStore::open_memory().unwrap();
    let (board, _completions) = open_board(&device, store, config(false, false)).await;

    let first = board.start_recording();
    let second = async {
        reached.notified().await;
        let result = board.start_recording().await;
        release.notify_one();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.is_ok());
    assert!(matches!(second, Err(SoundboardError::InvalidState(_))));
    assert_eq!(board.recorder_state().await, RecorderState::Recording);
}

#[tokio::test]
async fn stop_without_recording_is_invalid() {
    let device = Device::default();
    let store = SqliteRecordStore::open_memory().unwrap();
    let (board, _completions) = open_board(&device, store, config(false, false)).await;

    let err = board.stop_recording().await.unwrap_err();
    assert!(matches!(err, SoundboardError::InvalidState(_)));
    assert!(board.slot_contents().iter().all(Option::is_none));
}

#[tokio::test]
async fn subscribers_see_natural_completion() {
    let device = Device::default();
    let store = SqliteRecordStore::open_memory().unwrap();
    let (board, mut completions) = open_board(&device, store, config(false, false)).await;
    let mut updates = board.subscribe();
    let music = SoundKey::Effect(EffectKey::Music2);

    board.toggle_sound(music).await.unwrap();
    assert!(updates.borrow_and_update().is_playing(music));

    device.drain(device.plays()[0]);
    let token = completions.recv().await.unwrap();
    board.on_playback_finished(token).await;

    assert!(updates.has_changed().unwrap());
    assert!(!updates.borrow_and_update().is_playing(music));
}

#[tokio::test]
async fn close_stops_everything() {
    let device = Device::default();
    let store = SqliteRecordStore::open_memory().unwrap();
    let (board, _completions) = open_board(&device, store, config(true, false)).await;

    board.toggle_effect(EffectKey::Music1).await.unwrap();
    board.start_recording().await.unwrap();
    board.close().await;

    let snapshot = board.snapshot().await;
    assert!(snapshot.playing.is_empty());
    assert_eq!(snapshot.recorder, RecorderState::Idle);
    assert_eq!(device.unloads(), 3);
}
