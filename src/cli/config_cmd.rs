//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::recording::QualityPreset;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let mut config = store.load().await?;
    set_field(&mut config, key, value)?;
    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let config = store.load().await?;
    presenter.output(get_field(&config, key).as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, get_field(&config, key).as_deref().unwrap_or(NOT_SET));
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

fn get_field(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "effects_dir" => config.effects_dir.clone(),
        "recordings_dir" => config.recordings_dir.clone(),
        "database" => config.database.clone(),
        "quality" => config.quality.clone(),
        "notify" => config.notify.map(|b| b.to_string()),
        "restore_slots" => config.restore_slots.map(|b| b.to_string()),
        "preload_effects" => config.preload_effects.map(|b| b.to_string()),
        _ => None,
    }
}

/// Validate `value` for `key` and store it
fn set_field(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };
    let boolean = || {
        parse_bool(value).map_err(|_| invalid("Value must be 'true' or 'false'".to_string()))
    };
    let path = || {
        if value.trim().is_empty() {
            Err(invalid("Path must not be empty".to_string()))
        } else {
            Ok(value.to_string())
        }
    };

    match key {
        "effects_dir" => config.effects_dir = Some(path()?),
        "recordings_dir" => config.recordings_dir = Some(path()?),
        "database" => config.database = Some(path()?),
        "quality" => {
            let preset: QualityPreset = value.parse().map_err(|e| invalid(format!("{}", e)))?;
            config.quality = Some(preset.to_string());
        }
        "notify" => config.notify = Some(boolean()?),
        "restore_slots" => config.restore_slots = Some(boolean()?),
        "preload_effects" => config.preload_effects = Some(boolean()?),
        _ => return Err(invalid("Unknown key".to_string())),
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("NO"), Ok(false));
        assert_eq!(parse_bool("1"), Ok(true));
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn set_quality_normalizes() {
        let mut config = AppConfig::empty();
        set_field(&mut config, "quality", "LOW").unwrap();
        assert_eq!(config.quality, Some("low".to_string()));
    }

    #[test]
    fn set_quality_rejects_unknown() {
        let mut config = AppConfig::empty();
        assert!(matches!(
            set_field(&mut config, "quality", "lossless"),
            Err(ConfigError::ValidationError { .. })
        ));
        assert_eq!(config.quality, None);
    }

    #[test]
    fn set_and_get_booleans() {
        let mut config = AppConfig::empty();
        set_field(&mut config, "restore_slots", "yes").unwrap();
        assert_eq!(get_field(&config, "restore_slots"), Some("true".to_string()));
        assert!(set_field(&mut config, "notify", "often").is_err());
    }

    #[test]
    fn empty_path_is_rejected() {
        let mut config = AppConfig::empty();
        assert!(set_field(&mut config, "database", "  ").is_err());
        set_field(&mut config, "database", "/tmp/r.db").unwrap();
        assert_eq!(get_field(&config, "database"), Some("/tmp/r.db".to_string()));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(check_key("api_key").is_err());
        assert!(check_key("quality").is_ok());
    }
}
