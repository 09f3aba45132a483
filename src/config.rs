//! Configuration loading.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! sensible defaults so the tool can always start.

use crate::chunk::DEFAULT_MAX_CHUNK_LEN;
use crate::gesture::DEFAULT_SWIPE_THRESHOLD;
use crate::progress::DEFAULT_DAILY_GOAL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

pub const CONFIG_PATH: &str = "conf/config.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Chunk budget in bytes for the packer.
    #[serde(default = "default_max_chunk_len")]
    pub max_chunk_len: usize,
    /// Words per day the progress percentage is measured against.
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u64,
    /// Gesture distance that counts as a page turn.
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f32,
    /// Root directory for persisted state.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            max_chunk_len: default_max_chunk_len(),
            daily_goal: default_daily_goal(),
            swipe_threshold: default_swipe_threshold(),
            data_dir: default_data_dir(),
            log_level: LogLevel::default(),
        }
    }
}

fn default_max_chunk_len() -> usize {
    DEFAULT_MAX_CHUNK_LEN
}

fn default_daily_goal() -> u64 {
    DEFAULT_DAILY_GOAL
}

fn default_swipe_threshold() -> f32 {
    DEFAULT_SWIPE_THRESHOLD
}

fn default_data_dir() -> String {
    ".bookswipe".to_string()
}

/// Log verbosity applied after the config file is read.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Read the config file, falling back to defaults on any problem.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            AppConfig::default()
        }
    }
}
