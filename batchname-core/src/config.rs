use crate::pipeline::PipelineConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory (relative to the working directory) holding config and logs
pub const STATE_DIR: &str = ".batchname";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Base pipeline that command-line flags are layered on
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default output format: "summary" or "json"
    #[serde(default = "default_output")]
    pub output_format: String,

    /// Whether to use color output by default (None = auto-detect)
    #[serde(default)]
    pub use_color: Option<bool>,

    /// Whether to write the activity log
    #[serde(default = "default_true")]
    pub activity_log: bool,

    /// Activity log location, relative to the working directory
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_format: default_output(),
            use_color: None,
            activity_log: true,
            log_path: default_log_path(),
        }
    }
}

fn default_output() -> String {
    "summary".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> PathBuf {
    Path::new(STATE_DIR).join("activity.log")
}

impl Config {
    /// Load `.batchname/config.toml` from the current directory, then the
    /// user config directory, falling back to defaults
    pub fn load() -> Result<Self> {
        if let Ok(cwd) = std::env::current_dir() {
            let config_path = cwd.join(STATE_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Self::load_from_path(&config_path);
            }
        }

        if let Some(path) = Self::global_path() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    /// `<config dir>/batchname/config.toml`, if the platform has one
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("batchname").join(CONFIG_FILE))
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.pipeline = config.pipeline.normalized();
        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
