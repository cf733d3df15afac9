use crate::log_debug;
use crate::orchestrator::ModelCatalog;
use crate::provider::gemini::DEFAULT_BASE_URL;
use crate::storage::Store;
use crate::types::{Mode, ToneSelection};

use anyhow::{Result, anyhow};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable consulted for the API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration structure for `RizzMaster`
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Mode used when none is given on the command line
    #[serde(default)]
    pub default_mode: Mode,
    /// Tone used when none is given on the command line
    #[serde(default)]
    pub default_tone: ToneSelection,
    /// Base URL of the Generative Language API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Whether to enable verbose logging (includes HTTP client internals)
    #[serde(default)]
    pub verbose_logging: bool,
    /// Model identifiers per tier
    #[serde(default)]
    pub models: ModelCatalog,
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_mode: Mode::default(),
            default_tone: ToneSelection::default(),
            api_base_url: default_api_base_url(),
            verbose_logging: false,
            models: ModelCatalog::default(),
        }
    }
}

impl Config {
    /// Load the configuration from the user's config file
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        let config = Self::load_from(&config_path)?;
        log_debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    /// Load from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        toml::from_str(&content).map_err(|e| {
            anyhow!(
                "Invalid configuration file format: {}. Please check {} for syntax errors.",
                e,
                path.display()
            )
        })
    }

    /// Save the configuration to the user's config file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_content = toml::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        log_debug!("Configuration saved: {:?}", self);
        Ok(())
    }

    /// Get the path to the configuration file
    fn get_config_path() -> Result<PathBuf> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push("rizzmaster");
        fs::create_dir_all(&path)?;
        path.push("config.toml");
        Ok(path)
    }

    /// Update the configuration with new values
    pub fn update(&mut self, mode: Option<Mode>, tone: Option<ToneSelection>) -> bool {
        let mut changes_made = false;

        if let Some(mode) = mode
            && self.default_mode != mode
        {
            self.default_mode = mode;
            changes_made = true;
        }
        if let Some(tone) = tone
            && self.default_tone != tone
        {
            self.default_tone = tone;
            changes_made = true;
        }

        log_debug!("Configuration updated: {:?}", self);
        changes_made
    }
}

/// Picks the credential: environment first, then the stored key
pub fn resolve_api_key(env_value: Option<String>, store: &Store) -> Result<Option<String>> {
    if let Some(key) = env_value.filter(|k| !k.trim().is_empty()) {
        log_debug!("Using API key from {}", API_KEY_ENV);
        return Ok(Some(key));
    }
    store.load_api_key()
}
