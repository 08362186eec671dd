//! Microphone capture session using cpal
//!
//! The cpal stream is not `Send`, so it lives on its own thread for the
//! length of the session. Samples are mixed to mono i16 into a shared buffer
//! and encoded to FLAC when the session finishes.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex as StdMutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use rubato::{FftFixedIn, Resampler};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::flac::encode_to_flac;
use crate::application::ports::{DeviceError, RecordingSession};
use crate::domain::recording::QualityPreset;
use crate::domain::slots::Locator;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Buffer and flag shared with the stream callback
#[derive(Clone)]
struct CaptureBuffer {
    samples: Arc<StdMutex<Vec<i16>>>,
    active: Arc<AtomicBool>,
}

impl CaptureBuffer {
    fn new() -> Self {
        Self {
            samples: Arc::new(StdMutex::new(Vec::new())),
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    fn take(&self) -> Vec<i16> {
        let mut samples = self.samples.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *samples)
    }
}

/// An open microphone capture
pub struct CpalSession {
    buffer: CaptureBuffer,
    device_sample_rate: u32,
    preset: QualityPreset,
    output_dir: PathBuf,
    thread: Option<JoinHandle<()>>,
}

impl CpalSession {
    /// Open the default input device and start capturing.
    ///
    /// Returns once the stream is playing, or with the error that kept it
    /// from starting.
    pub async fn start(preset: QualityPreset, output_dir: PathBuf) -> Result<Self, DeviceError> {
        let buffer = CaptureBuffer::new();
        let (ready_tx, ready_rx) = mpsc::channel();

        let shared = buffer.clone();
        let thread = thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || capture_thread(shared, ready_tx))
            .map_err(|e| DeviceError::StartFailed(e.to_string()))?;

        let device_sample_rate = tokio::task::spawn_blocking(move || ready_rx.recv())
            .await
            .map_err(|e| DeviceError::StartFailed(format!("Task join error: {}", e)))?
            .map_err(|_| DeviceError::StartFailed("Capture thread exited".into()))??;

        info!(sample_rate = device_sample_rate, %preset, "capture started");

        Ok(Self {
            buffer,
            device_sample_rate,
            preset,
            output_dir,
            thread: Some(thread),
        })
    }

    /// Stop the stream and wait for the capture thread to release it
    async fn halt(&mut self) {
        self.buffer.active.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if tokio::task::spawn_blocking(move || thread.join())
                .await
                .is_err()
            {
                error!("capture thread did not shut down cleanly");
            }
        }
    }
}

#[async_trait]
impl RecordingSession for CpalSession {
    async fn finish(mut self) -> Result<Locator, DeviceError> {
        self.halt().await;

        let samples = self.buffer.take();
        if samples.is_empty() {
            return Err(DeviceError::FinishFailed("No audio data captured".into()));
        }

        let device_rate = self.device_sample_rate;
        let target_rate = self.preset.target_sample_rate(device_rate);
        debug!(samples = samples.len(), device_rate, target_rate, "encoding clip");

        let encoded = tokio::task::spawn_blocking(move || {
            let resampled = resample(&samples, device_rate, target_rate)?;
            encode_to_flac(&resampled, target_rate)
                .map_err(|e| DeviceError::FinishFailed(e.to_string()))
        })
        .await
        .map_err(|e| DeviceError::FinishFailed(format!("Encode task error: {}", e)))??;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| DeviceError::FinishFailed(e.to_string()))?;
        let path = self.output_dir.join(format!("{}.flac", Uuid::new_v4()));
        tokio::fs::write(&path, encoded)
            .await
            .map_err(|e| DeviceError::FinishFailed(e.to_string()))?;

        info!(path = %path.display(), "clip written");
        Ok(Locator::from(path))
    }

    async fn cancel(mut self) {
        self.halt().await;
        self.buffer.take();
        debug!("capture cancelled");
    }
}

impl Drop for CpalSession {
    fn drop(&mut self) {
        // The thread exits on its own once the flag drops
        self.buffer.active.store(false, Ordering::SeqCst);
    }
}

/// Whether a default input device exists
pub fn input_available() -> bool {
    cpal::default_host().default_input_device().is_some()
}

/// Body of the capture thread. Reports the device sample rate (or the start
/// error) on `ready`, then holds the stream until the session goes inactive.
fn capture_thread(buffer: CaptureBuffer, ready: mpsc::Sender<Result<u32, DeviceError>>) {
    let stream = match open_stream(&buffer) {
        Ok((stream, rate)) => {
            let _ = ready.send(Ok(rate));
            stream
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    while buffer.active.load(Ordering::SeqCst) {
        thread::sleep(POLL_INTERVAL);
    }
    drop(stream);
}

fn open_stream(buffer: &CaptureBuffer) -> Result<(cpal::Stream, u32), DeviceError> {
    let device = cpal::default_host()
        .default_input_device()
        .ok_or(DeviceError::NoInputDevice)?;
    let supported = device
        .default_input_config()
        .map_err(|e| DeviceError::StartFailed(format!("Failed to get config: {}", e)))?;

    let sample_format = supported.sample_format();
    let config: StreamConfig = supported.into();
    let rate = config.sample_rate.0;

    let stream = match sample_format {
        SampleFormat::I16 => build_stream::<i16>(&device, &config, buffer.clone()),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, buffer.clone()),
        SampleFormat::F32 => build_stream::<f32>(&device, &config, buffer.clone()),
        other => Err(DeviceError::StartFailed(format!(
            "Unsupported sample format: {}",
            other
        ))),
    }?;

    stream
        .play()
        .map_err(|e| DeviceError::StartFailed(e.to_string()))?;

    Ok((stream, rate))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    buffer: CaptureBuffer,
) -> Result<cpal::Stream, DeviceError>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    let channels = config.channels;
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if buffer.active.load(Ordering::SeqCst) {
                    let pcm: Vec<i16> = data.iter().map(|&s| i16::from_sample(s)).collect();
                    let mono = mix_to_mono(&pcm, channels);
                    if let Ok(mut samples) = buffer.samples.lock() {
                        samples.extend_from_slice(&mono);
                    }
                }
            },
            |err| error!(error = %err, "audio input stream error"),
            None,
        )
        .map_err(|e| DeviceError::StartFailed(e.to_string()))
}

/// Average interleaved channels down to one
fn mix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect()
}

/// Resample mono audio between rates. A no-op when the rates match.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Result<Vec<i16>, DeviceError> {
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    let samples_f32: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();
    let ratio = to_rate as f64 / from_rate as f64;
    let output_len = (samples_f32.len() as f64 * ratio).ceil() as usize;

    let mut resampler = FftFixedIn::<f32>::new(from_rate as usize, to_rate as usize, 1024, 2, 1)
        .map_err(|e| DeviceError::FinishFailed(format!("Resampler init failed: {}", e)))?;

    let mut output = Vec::with_capacity(output_len);
    let mut position = 0;

    while position < samples_f32.len() {
        let frames_needed = resampler.input_frames_next();
        let end = (position + frames_needed).min(samples_f32.len());
        let mut chunk = vec![samples_f32[position..end].to_vec()];
        chunk[0].resize(frames_needed, 0.0);

        let resampled = resampler
            .process(&chunk, None)
            .map_err(|e| DeviceError::FinishFailed(format!("Resampling failed: {}", e)))?;

        output.extend(
            resampled[0]
                .iter()
                .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16),
        );
        position = end;
    }

    output.truncate(output_len);
    Ok(output)
}
