//! CLI presenter for output formatting

use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ports::StoredRecording;
use crate::application::BoardSnapshot;
use crate::domain::effects::ALL_EFFECTS;
use crate::domain::playback::{PlaybackState, SoundKey};
use crate::domain::recorder::RecorderState;
use crate::domain::slots::{Locator, SlotIndex};

use super::console::HELP;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message, replacing any running one
    pub fn start_spinner(&mut self, message: &str) {
        self.stop_spinner();
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.red} {msg} {elapsed:.dim}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print to stderr without tearing a running spinner
    fn line(&self, text: String) {
        match self.spinner {
            Some(ref spinner) => spinner.suspend(|| eprintln!("{}", text)),
            None => eprintln!("{}", text),
        }
    }

    pub fn info(&self, message: &str) {
        self.line(format!("{} {}", "ℹ".cyan(), message));
    }

    pub fn success(&self, message: &str) {
        self.line(format!("{} {}", "✓".green(), message));
    }

    pub fn warn(&self, message: &str) {
        self.line(format!("{} {}", "⚠".yellow(), message));
    }

    pub fn error(&self, message: &str) {
        self.line(format!("{} {}", "✗".red(), message));
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    pub fn help(&self) {
        for (keys, action) in HELP {
            self.line(format!("  {:<10} {}", keys.bold(), action));
        }
    }

    /// Render the whole board
    pub fn board(&self, snapshot: &BoardSnapshot) {
        let effects: Vec<String> = ALL_EFFECTS
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let playing = snapshot.is_playing(SoundKey::Effect(*key));
                format!("{} {}{}", i + 1, key, play_marker(playing))
            })
            .collect();

        let slots: Vec<String> = SlotIndex::all()
            .map(|index| {
                let locator = snapshot.slots.get(index.get()).and_then(Option::as_ref);
                let playing = snapshot.is_playing(SoundKey::Slot(index));
                format_slot(index, locator, playing)
            })
            .collect();

        self.line(format!("{:<9} {}", "Effects".bold(), effects.join("   ")));
        self.line(format!(
            "{:<9} {}",
            "Recorder".bold(),
            format_recorder(snapshot.recorder, snapshot.next_slot)
        ));
        self.line(format!("{:<9} {}", "Slots".bold(), slots.join("   ")));
    }

    /// Report the state a toggle left a sound in
    pub fn sound_state(&self, key: SoundKey, state: PlaybackState) {
        match state {
            PlaybackState::Playing => self.info(&format!("{} playing", key)),
            PlaybackState::Stopped => self.info(&format!("{} stopped", key)),
        }
    }

    pub fn history_row(&self, row: &StoredRecording) {
        println!(
            "{:>5}  {:<19}  {}",
            row.id.to_string().dimmed(),
            row.recorded_at.as_deref().unwrap_or("-"),
            row.locator
        );
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

fn play_marker(playing: bool) -> String {
    if playing {
        format!(" {}", "▶".green())
    } else {
        String::new()
    }
}

/// `p1 clip.flac ▶` or `p2 (empty)`
fn format_slot(index: SlotIndex, locator: Option<&Locator>, playing: bool) -> String {
    let label = format!("p{}", index.number());
    match locator {
        Some(locator) => {
            let path = locator.to_path();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| locator.to_string());
            format!("{} {}{}", label, name, play_marker(playing))
        }
        None => format!("{} {}", label, "(empty)".dimmed()),
    }
}

fn format_recorder(state: RecorderState, next_slot: SlotIndex) -> String {
    match state {
        RecorderState::Idle => format!("idle, next clip goes to {}", next_slot),
        RecorderState::Arming => "opening microphone".yellow().to_string(),
        RecorderState::Recording => format!("{} into {}", "recording".red(), next_slot),
        RecorderState::Finishing => "saving clip".yellow().to_string(),
    }
}
