use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::board::DEFAULT_STORY_PREFIX;
use crate::store::DEFAULT_URL;

const APP_NAME: &str = "scrum-board";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the document store
    pub base_url: String,
    /// Login user checked against `GET /login`
    pub user: Option<String>,
    /// Login password checked against `GET /login`
    pub password: Option<String>,
    /// Prefix of generated story ids
    pub story_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            user: None,
            password: None,
            story_prefix: DEFAULT_STORY_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the user's config directory, then apply
    /// `SCRUM_BOARD_*` environment overrides.
    /// Falls back to defaults if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let config = match get_config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env()
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save the current configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Save to the user's config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("SCRUM_BOARD_URL") {
            self.base_url = url;
        }
        if let Ok(user) = std::env::var("SCRUM_BOARD_USER") {
            self.user = Some(user);
        }
        if let Ok(password) = std::env::var("SCRUM_BOARD_PASSWORD") {
            self.password = Some(password);
        }
        self
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
