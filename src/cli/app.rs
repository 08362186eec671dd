//! Shared CLI plumbing: exit codes, config merging, logging

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::recording::QualityPreset;
use crate::infrastructure::{DataPaths, SqliteRecordStore, XdgConfigStore};

use super::args::{BoardOptions, Cli};
use super::history_cmd::handle_history_command;
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

const DEFAULT_LOG_FILTER: &str = "soundboard=warn";
const VERBOSE_LOG_FILTER: &str = "soundboard=debug";

/// Install the stderr log subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Config layer contributed by command-line flags
pub fn cli_config(cli: &Cli) -> AppConfig {
    AppConfig {
        effects_dir: cli.effects_dir.clone(),
        recordings_dir: cli.recordings_dir.clone(),
        database: cli.database.clone(),
        quality: cli
            .quality
            .map(|q| QualityPreset::from(q).to_string()),
        notify: cli.notify.then_some(true),
        restore_slots: cli.restore.then_some(true),
        preload_effects: cli.no_preload.then_some(false),
    }
}

/// Merge: defaults < config file < CLI (and its env fallbacks)
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, path = %store.path().display(), "ignoring config file");
            AppConfig::empty()
        }
    };

    AppConfig::defaults().merge(file_config).merge(cli_config)
}

/// Resolve merged config into board settings
pub fn board_options(config: &AppConfig) -> Result<BoardOptions, String> {
    let quality = match config.quality.as_deref() {
        Some(value) => value
            .parse::<QualityPreset>()
            .map_err(|e| e.to_string())?,
        None => QualityPreset::default(),
    };
    let paths = DataPaths::resolve(config);

    Ok(BoardOptions {
        effects_dir: paths.effects_dir,
        recordings_dir: paths.recordings_dir,
        database: paths.database,
        quality,
        notify: config.notify_or_default(),
        restore_slots: config.restore_slots_or_default(),
        preload_effects: config.preload_effects_or_default(),
    })
}

/// Run `soundboard history`
pub async fn run_history(config: &AppConfig, limit: usize, json: bool) -> ExitCode {
    let presenter = Presenter::new();
    let paths = DataPaths::resolve(config);

    let store = match SqliteRecordStore::open(&paths.database) {
        Ok(store) => store,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match handle_history_command(&store, limit, json, &presenter).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}
