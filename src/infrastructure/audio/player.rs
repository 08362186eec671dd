//! Loaded sound backed by a rodio sink

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use rodio::source::Buffered;
use rodio::{Decoder, OutputStreamHandle, Sink, Source};
use tracing::{debug, trace};

use crate::application::ports::{CompletionSender, DeviceError, LoadError, PlaybackHandle};
use crate::domain::playback::{HandleId, PlaybackToken};

type ClipSource = Buffered<Decoder<BufReader<File>>>;

const WATCH_INTERVAL: Duration = Duration::from_millis(25);

/// One decoded sound with its own sink.
///
/// The decoded source is buffered so every `play()` restarts from the
/// beginning without touching the file again.
pub struct RodioHandle {
    id: HandleId,
    sink: Arc<Sink>,
    source: StdMutex<ClipSource>,
    generation: Arc<AtomicU64>,
    completions: StdMutex<Option<CompletionSender>>,
}

impl RodioHandle {
    /// Decode `path` and attach a paused sink to `output`. Blocking.
    pub(super) fn load(
        id: HandleId,
        path: &Path,
        output: &OutputStreamHandle,
    ) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LoadError::NotFound(path.display().to_string()),
            _ => LoadError::Decode(format!("{}: {}", path.display(), e)),
        })?;
        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| LoadError::Decode(format!("{}: {}", path.display(), e)))?;
        let sink = Sink::try_new(output).map_err(|e| LoadError::Output(e.to_string()))?;

        debug!(%id, path = %path.display(), "sound loaded");
        Ok(Self {
            id,
            sink: Arc::new(sink),
            source: StdMutex::new(decoder.buffered()),
            generation: Arc::new(AtomicU64::new(0)),
            completions: StdMutex::new(None),
        })
    }

    /// Invalidate the current play so its watcher exits without reporting
    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Report a natural completion of `token` unless it gets invalidated first
    fn watch(&self, token: PlaybackToken) {
        let Some(completions) = self
            .completions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        else {
            return;
        };
        let sink = Arc::clone(&self.sink);
        let generation = Arc::clone(&self.generation);

        thread::spawn(move || loop {
            thread::sleep(WATCH_INTERVAL);
            if generation.load(Ordering::SeqCst) != token.generation {
                return;
            }
            if sink.empty() {
                trace!(handle = %token.handle, "playback drained");
                let _ = completions.send(token);
                return;
            }
        });
    }
}

#[async_trait]
impl PlaybackHandle for RodioHandle {
    fn on_finished(&self, completions: CompletionSender) {
        *self.completions.lock().unwrap_or_else(|e| e.into_inner()) = Some(completions);
    }

    async fn play(&self) -> Result<PlaybackToken, LoadError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let source = self
            .source
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        // append() may block briefly while a stopped source drains
        let sink = Arc::clone(&self.sink);
        tokio::task::spawn_blocking(move || {
            sink.append(source);
            sink.play();
        })
        .await
        .map_err(|e| LoadError::Output(format!("Task join error: {}", e)))?;

        let token = PlaybackToken::new(self.id, generation);
        self.watch(token);
        Ok(token)
    }

    async fn stop(&self) -> Result<(), DeviceError> {
        self.invalidate();
        self.sink.stop();
        Ok(())
    }

    async fn unload(self) {
        self.invalidate();
        self.sink.stop();
        debug!(id = %self.id, "sound unloaded");
    }
}
