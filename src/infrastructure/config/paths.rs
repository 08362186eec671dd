//! Data file locations

use std::path::PathBuf;

use super::xdg::XdgDirs;
use crate::domain::config::AppConfig;

/// Where effects, clips and the recording index live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub effects_dir: PathBuf,
    pub recordings_dir: PathBuf,
    pub database: PathBuf,
}

impl DataPaths {
    /// Configured paths, falling back to `$XDG_DATA_HOME/soundboard/...`
    pub fn resolve(config: &AppConfig) -> Self {
        XdgDirs::discover().data_paths(config)
    }

    pub(super) fn resolve_in(config: &AppConfig, data_dir: PathBuf) -> Self {
        let pick = |value: &Option<String>, default: &str| {
            value
                .as_deref()
                .map(expand_home)
                .unwrap_or_else(|| data_dir.join(default))
        };

        Self {
            effects_dir: pick(&config.effects_dir, "sfx"),
            recordings_dir: pick(&config.recordings_dir, "recordings"),
            database: pick(&config.database, "recordings.db"),
        }
    }
}

/// Expand a leading `~/`
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
