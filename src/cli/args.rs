//! CLI argument definitions using Clap

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::recording::QualityPreset;

/// Sound board - three effects and three recording slots
#[derive(Parser, Debug)]
#[command(name = "soundboard")]
#[command(version)]
#[command(about = "Play bundled effects and record short clips into three slots")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory holding music.mp3, music1.mp3 and music2.mp3
    #[arg(long, value_name = "DIR")]
    pub effects_dir: Option<String>,

    /// Directory new recordings are written to
    #[arg(long, value_name = "DIR")]
    pub recordings_dir: Option<String>,

    /// SQLite file indexing recordings
    #[arg(long, value_name = "FILE", env = "SOUNDBOARD_DATABASE")]
    pub database: Option<String>,

    /// Capture quality
    #[arg(short = 'q', long, value_name = "QUALITY")]
    pub quality: Option<QualityArg>,

    /// Show desktop notifications for errors
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Refill the slots from the newest stored recordings
    #[arg(long)]
    pub restore: bool,

    /// Load effects on first use instead of at startup
    #[arg(long)]
    pub no_preload: bool,

    /// Log debug output to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List stored recordings
    History {
        /// Number of recordings to show
        #[arg(short = 'l', long, default_value_t = 10)]
        limit: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum QualityArg {
    High,
    Low,
}

impl From<QualityArg> for QualityPreset {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::High => QualityPreset::High,
            QualityArg::Low => QualityPreset::Low,
        }
    }
}

/// Settings for the interactive board, after config merging
#[derive(Debug, Clone)]
pub struct BoardOptions {
    pub effects_dir: std::path::PathBuf,
    pub recordings_dir: std::path::PathBuf,
    pub database: std::path::PathBuf,
    pub quality: QualityPreset,
    pub notify: bool,
    pub restore_slots: bool,
    pub preload_effects: bool,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "effects_dir",
    "recordings_dir",
    "database",
    "quality",
    "notify",
    "restore_slots",
    "preload_effects",
];

pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
