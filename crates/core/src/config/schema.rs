//! Configuration schema definitions
//!
//! Layout of `mcsdk.toml`.

use crate::options::PluginOptions;
use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// Plugin options (`serverUrl`, `appId`, ...)
    #[serde(default)]
    pub plugin: PluginOptions,

    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Native project layout relative to the project root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// iOS platform directory
    #[serde(default = "default_ios_dir")]
    pub ios_dir: String,

    /// Android platform directory
    #[serde(default = "default_android_dir")]
    pub android_dir: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            ios_dir: default_ios_dir(),
            android_dir: default_android_dir(),
        }
    }
}

fn default_ios_dir() -> String {
    "ios".to_string()
}

fn default_android_dir() -> String {
    "android".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
