//! XDG locations: the config file and the data home

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::paths::DataPaths;
use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Directory name under the XDG config and data homes
pub const APP_DIR: &str = "soundboard";

const CONFIG_FILE: &str = "config.toml";

/// The board's own directories under the XDG homes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XdgDirs {
    pub config: PathBuf,
    pub data: PathBuf,
}

impl XdgDirs {
    /// `$XDG_CONFIG_HOME/soundboard` and `$XDG_DATA_HOME/soundboard`
    pub fn discover() -> Self {
        let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("~/.config"));
        let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("~/.local/share"));
        Self {
            config: config.join(APP_DIR),
            data: data.join(APP_DIR),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config.join(CONFIG_FILE)
    }

    /// Data locations, configured values first
    pub fn data_paths(&self, config: &AppConfig) -> DataPaths {
        DataPaths::resolve_in(config, self.data.clone())
    }
}

/// TOML config file store
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    pub fn new() -> Self {
        Self::in_dirs(&XdgDirs::discover())
    }

    pub fn in_dirs(dirs: &XdgDirs) -> Self {
        Self::with_path(dirs.config_file())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling the new contents are staged in before the rename
    fn staging_path(&self) -> PathBuf {
        self.path.with_extension("toml.new")
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no config file");
                return Ok(AppConfig::empty());
            }
            Err(e) => return Err(ConfigError::ReadError(e.to_string())),
        };

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Staged next to the target, then renamed into place
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let write_err = |e: std::io::Error| ConfigError::WriteError(e.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let content = toml::to_string_pretty(config)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        let staged = self.staging_path();
        fs::write(&staged, content).await.map_err(write_err)?;
        fs::rename(&staged, &self.path).await.map_err(write_err)?;

        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(
                self.path.display().to_string(),
            ));
        }

        self.save(&AppConfig::defaults()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs_in(root: &std::path::Path) -> XdgDirs {
        XdgDirs {
            config: root.join("config/soundboard"),
            data: root.join("data/soundboard"),
        }
    }

    #[test]
    fn discovered_dirs_are_app_scoped() {
        let dirs = XdgDirs::discover();
        assert!(dirs.config.ends_with(APP_DIR));
        assert!(dirs.data.ends_with(APP_DIR));
        assert!(XdgConfigStore::new().path().ends_with("soundboard/config.toml"));
    }

    #[test]
    fn data_paths_default_under_data_home() {
        let dirs = dirs_in(std::path::Path::new("/home/u"));
        let paths = dirs.data_paths(&AppConfig::empty());
        assert_eq!(
            paths.database,
            PathBuf::from("/home/u/data/soundboard/recordings.db")
        );
    }

    #[tokio::test]
    async fn partial_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::in_dirs(&dirs_in(dir.path()));
        std::fs::create_dir_all(dir.path().join("config/soundboard")).unwrap();
        std::fs::write(
            store.path(),
            "quality = \"low\"\nrestore_slots = true\nrecordings_dir = \"/tmp/clips\"\n",
        )
        .unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.quality, Some("low".to_string()));
        assert_eq!(config.restore_slots, Some(true));
        assert_eq!(config.recordings_dir, Some("/tmp/clips".to_string()));
        assert_eq!(config.notify, None);
    }

    #[tokio::test]
    async fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        std::fs::write(store.path(), "quality = ").unwrap();

        assert!(matches!(
            store.load().await,
            Err(ConfigError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("nested/config.toml"));
        assert_eq!(store.load().await.unwrap(), AppConfig::empty());

        store.init().await.unwrap();
        assert_eq!(store.load().await.unwrap(), AppConfig::defaults());
        assert!(matches!(
            store.init().await,
            Err(ConfigError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn save_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let config = AppConfig {
            quality: Some("high".to_string()),
            ..Default::default()
        };

        store.save(&config).await.unwrap();
        store.save(&config).await.unwrap();

        assert!(!store.staging_path().exists());
        assert_eq!(store.load().await.unwrap(), config);
    }
}
