//! Board commands typed at the prompt

use std::str::FromStr;
use std::thread;

use tokio::sync::mpsc;

use crate::domain::effects::ALL_EFFECTS;
use crate::domain::playback::SoundKey;

/// One line of user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardCommand {
    /// Play or stop an effect or a recording slot
    Toggle(SoundKey),
    /// Start or stop recording
    Record,
    Status,
    Help,
    Quit,
}

impl FromStr for BoardCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();
        match input.as_str() {
            "r" | "rec" | "record" => return Ok(Self::Record),
            "s" | "status" => return Ok(Self::Status),
            "h" | "help" | "?" => return Ok(Self::Help),
            "q" | "quit" | "exit" => return Ok(Self::Quit),
            _ => {}
        }

        // Effect buttons are numbered like the slots, without the `p`
        if let Ok(n) = input.parse::<usize>() {
            if let Some(key) = n.checked_sub(1).and_then(|i| ALL_EFFECTS.get(i)) {
                return Ok(Self::Toggle(SoundKey::Effect(*key)));
            }
        }

        input
            .parse::<SoundKey>()
            .map(Self::Toggle)
            .map_err(|_| format!("Unknown command '{}'. Type h for help", s.trim()))
    }
}

/// Read stdin lines on a plain thread.
///
/// A tokio stdin read cannot be cancelled and would hold up runtime
/// shutdown; this thread simply dies with the process.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

pub const HELP: &[(&str, &str)] = &[
    ("1 2 3", "play / stop music1..music3"),
    ("r", "start / stop recording"),
    ("p1 p2 p3", "play / stop Record 1..3"),
    ("s", "show the board"),
    ("h", "show this help"),
    ("q", "quit"),
];
