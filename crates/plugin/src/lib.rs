//! Marketing Cloud SDK configuration pass
//!
//! Ties option validation, the run-once registry and both platform adapters
//! into the passes exposed by the command-line tool:
//!
//! - [`with_marketing_cloud_sdk`]: validate, then apply the Android and iOS steps
//! - [`status`]: report which generated blocks are present and current
//! - [`clean`]: remove every generated block
//!
//! # Example
//!
//! ```rust,no_run
//! use mcsdk_core::options::PluginOptions;
//! use mcsdk_core::run_once::RunOnceRegistry;
//! use mcsdk_plugin::{with_marketing_cloud_sdk, ApplySettings, ProjectLayout};
//!
//! let options = PluginOptions {
//!     server_url: Some("https://mc.example.com/".into()),
//!     app_id: Some("app-id".into()),
//!     access_token: Some("token".into()),
//!     ..PluginOptions::default()
//! };
//!
//! let report = with_marketing_cloud_sdk(
//!     &ProjectLayout::new("my-app"),
//!     Some(&options),
//!     RunOnceRegistry::global(),
//!     &ApplySettings::default(),
//! )?;
//! println!("{} files changed", report.changes.len());
//! # Ok::<(), mcsdk_core::Error>(())
//! ```

mod apply;
mod clean;
mod status;

pub use apply::{fingerprint, with_marketing_cloud_sdk, ApplyReport, ApplySettings, Outcome};
pub use clean::{clean, CleanReport, RemovedBlock};
pub use status::{status, BlockState, BlockStatus};

use mcsdk_core::config::ProjectConfig;
use mcsdk_core::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Where the native projects live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    /// iOS directory relative to `root`
    pub ios_dir: PathBuf,
    /// Android directory relative to `root`
    pub android_dir: PathBuf,
}

impl ProjectLayout {
    /// Standard `ios/` and `android/` layout
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_config(root, &ProjectConfig::default())
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &ProjectConfig) -> Self {
        Self {
            root: root.into(),
            ios_dir: PathBuf::from(&config.ios_dir),
            android_dir: PathBuf::from(&config.android_dir),
        }
    }
}

/// Which platforms a pass touches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platforms {
    #[default]
    All,
    Ios,
    Android,
}

impl Platforms {
    pub fn includes_ios(self) -> bool {
        matches!(self, Platforms::All | Platforms::Ios)
    }

    pub fn includes_android(self) -> bool {
        matches!(self, Platforms::All | Platforms::Android)
    }
}

impl fmt::Display for Platforms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platforms::All => "all",
            Platforms::Ios => "ios",
            Platforms::Android => "android",
        })
    }
}

impl FromStr for Platforms {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Platforms::All),
            "ios" => Ok(Platforms::Ios),
            "android" => Ok(Platforms::Android),
            other => Err(Error::config(format!(
                "Unknown platform \"{}\", expected ios, android or all",
                other
            ))),
        }
    }
}
