//! Configuration management.
//!
//! Configuration is kept in a `config.json` file inside a config directory.
//! The directory can be given explicitly; with the `desktop` feature it
//! defaults to the platform config directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BookmarkError, BookmarkResult};
use crate::models::SortKey;

const CONFIG_FILE_NAME: &str = "config.json";
const DEFAULT_DATABASE_FILE_NAME: &str = "bookmarks.db";

/// Contents of the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigData {
    /// Path to the SQLite database file
    #[serde(default)]
    pub database_file: String,
    /// Listing order used when a request does not name one
    #[serde(default)]
    pub default_sort: SortKey,
}

/// Configuration manager
pub struct Config {
    config_dir: PathBuf,
    config_file: PathBuf,
    data: ConfigData,
}

impl Config {
    /// Load (or create) the configuration in `config_dir`.
    ///
    /// Without the `desktop` feature, `config_dir` is required.
    pub fn new(config_dir: Option<PathBuf>) -> BookmarkResult<Self> {
        let config_dir = match config_dir {
            Some(dir) => dir,
            None => default_config_dir()?,
        };

        fs::create_dir_all(&config_dir)?;
        let config_file = config_dir.join(CONFIG_FILE_NAME);

        let data = if config_file.exists() {
            match fs::read_to_string(&config_file)
                .map_err(BookmarkError::from)
                .and_then(|content| Ok(serde_json::from_str::<ConfigData>(&content)?))
            {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(
                        path = %config_file.display(),
                        error = %e,
                        "Unreadable config file, using defaults"
                    );
                    ConfigData::default()
                }
            }
        } else {
            ConfigData::default()
        };

        let mut config = Self {
            config_dir,
            config_file,
            data,
        };

        if config.data.database_file.is_empty() {
            config.data.database_file = config
                .config_dir
                .join(DEFAULT_DATABASE_FILE_NAME)
                .to_string_lossy()
                .to_string();
        }

        // Save default config if it doesn't exist
        if !config.config_file.exists() {
            config.save()?;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> BookmarkResult<()> {
        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.config_file, content)?;
        Ok(())
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn database_file(&self) -> &str {
        &self.data.database_file
    }

    /// Point at a different database file
    pub fn set_database_file(&mut self, path: &str) -> BookmarkResult<()> {
        if path.trim().is_empty() {
            return Err(BookmarkError::validation(
                "database_file",
                "cannot be empty",
            ));
        }
        self.data.database_file = path.to_string();
        self.save()
    }

    pub fn default_sort(&self) -> SortKey {
        self.data.default_sort
    }

    pub fn set_default_sort(&mut self, sort: SortKey) -> BookmarkResult<()> {
        self.data.default_sort = sort;
        self.save()
    }
}

#[cfg(feature = "desktop")]
fn default_config_dir() -> BookmarkResult<PathBuf> {
    Ok(dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bookmarkcore"))
}

#[cfg(not(feature = "desktop"))]
fn default_config_dir() -> BookmarkResult<PathBuf> {
    Err(BookmarkError::Config(
        "config_dir is required without the desktop feature".to_string(),
    ))
}
