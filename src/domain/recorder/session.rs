//! Recorder session state machine

use std::fmt;
use thiserror::Error;

/// Recorder states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    /// Permission or device start in flight
    Arming,
    Recording,
    /// Device stop in flight
    Finishing,
}

impl RecorderState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Arming => "arming",
            Self::Recording => "recording",
            Self::Finishing => "finishing",
        }
    }
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while {current_state}")]
pub struct InvalidStateTransition {
    pub current_state: RecorderState,
    pub action: String,
}

/// Recorder session entity.
/// Guarantees at most one live microphone session.
///
/// State machine:
///   IDLE -> ARMING (begin_arming)
///   ARMING -> RECORDING (confirm_recording)
///   ARMING -> IDLE (abort_arming)
///   RECORDING -> FINISHING (begin_finishing)
///   FINISHING -> IDLE (complete_finishing)
#[derive(Debug, Default)]
pub struct RecorderSession {
    state: RecorderState,
}

impl RecorderSession {
    /// Create a new recorder session in idle state
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
        }
    }

    /// Get the current state
    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == RecorderState::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    fn transition(
        &mut self,
        from: RecorderState,
        to: RecorderState,
        action: &str,
    ) -> Result<(), InvalidStateTransition> {
        if self.state != from {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: action.to_string(),
            });
        }
        self.state = to;
        Ok(())
    }

    /// Transition from IDLE to ARMING
    pub fn begin_arming(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(RecorderState::Idle, RecorderState::Arming, "start recording")
    }

    /// Transition from ARMING to RECORDING
    pub fn confirm_recording(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            RecorderState::Arming,
            RecorderState::Recording,
            "confirm recording",
        )
    }

    /// Transition from ARMING back to IDLE (permission denied or device failure)
    pub fn abort_arming(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(RecorderState::Arming, RecorderState::Idle, "abort arming")
    }

    /// Transition from RECORDING to FINISHING
    pub fn begin_finishing(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            RecorderState::Recording,
            RecorderState::Finishing,
            "stop recording",
        )
    }

    /// Transition from FINISHING to IDLE, whether or not the stop succeeded
    pub fn complete_finishing(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            RecorderState::Finishing,
            RecorderState::Idle,
            "complete recording",
        )
    }

    /// Drop back to IDLE from any state (board shutdown)
    pub fn reset(&mut self) {
        self.state = RecorderState::Idle;
    }
}
