//! Audio output thread
//!
//! `rodio::OutputStream` is not `Send`, so a dedicated thread owns it for
//! the lifetime of the gateway; sinks are created from the shared handle.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use rodio::{OutputStream, OutputStreamHandle};
use tracing::debug;

use crate::application::ports::DeviceError;

pub struct OutputDevice {
    handle: OutputStreamHandle,
    shutdown: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl OutputDevice {
    /// Open the default output device
    pub fn open() -> Result<Self, DeviceError> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("audio-output".into())
            .spawn(move || match OutputStream::try_default() {
                Ok((_stream, handle)) => {
                    let _ = ready_tx.send(Ok(handle));
                    // Returns once the sender is dropped
                    let _ = shutdown_rx.recv();
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            })
            .map_err(|e| DeviceError::NoOutputDevice(e.to_string()))?;

        let handle = ready_rx
            .recv()
            .map_err(|e| DeviceError::NoOutputDevice(e.to_string()))?
            .map_err(DeviceError::NoOutputDevice)?;
        debug!("audio output opened");

        Ok(Self {
            handle,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> &OutputStreamHandle {
        &self.handle
    }
}

impl Drop for OutputDevice {
    fn drop(&mut self) {
        self.shutdown.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
