//! Microphone recorder lifecycle

mod session;

pub use session::{InvalidStateTransition, RecorderSession, RecorderState};
