//! Plugin options and their validation
//!
//! Options arrive partially filled from the config file, environment and
//! command line. [`PluginOptions::validate`] turns them into
//! [`MarketingCloudSdkProps`] before any native file is read or written.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// APNs environment written to the iOS entitlements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Mode::Development),
            "production" => Ok(Mode::Production),
            other => Err(Error::invalid_option(format!(
                "Unknown mode \"{}\", expected \"development\" or \"production\".",
                other
            ))),
        }
    }
}

/// Options as supplied by the user; every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginOptions {
    #[serde(default, alias = "serverUrl", skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    #[serde(default, alias = "appId", skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    #[serde(default, alias = "accessToken", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,

    #[serde(default, alias = "analyticsEnabled", skip_serializing_if = "Option::is_none")]
    pub analytics_enabled: Option<bool>,
}

/// Validated options consumed by the platform adapters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketingCloudSdkProps {
    pub server_url: String,
    pub app_id: String,
    pub access_token: String,
    pub mode: Mode,
    pub analytics_enabled: bool,
}

fn required(value: Option<&String>, message: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(Error::missing_option(message)),
    }
}

impl PluginOptions {
    /// True when no option at all was supplied
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fill unset fields from `fallback`
    pub fn or(self, fallback: PluginOptions) -> PluginOptions {
        PluginOptions {
            server_url: self.server_url.or(fallback.server_url),
            app_id: self.app_id.or(fallback.app_id),
            access_token: self.access_token.or(fallback.access_token),
            mode: self.mode.or(fallback.mode),
            analytics_enabled: self.analytics_enabled.or(fallback.analytics_enabled),
        }
    }

    /// Check required options in order: server url, app id, access token
    pub fn validate(&self) -> Result<MarketingCloudSdkProps> {
        let server_url = required(self.server_url.as_ref(), "Must provide server url.")?;
        let app_id = required(self.app_id.as_ref(), "Must provide app id.")?;
        let access_token = required(self.access_token.as_ref(), "Must provide access token.")?;

        if !server_url.starts_with("https://") {
            tracing::warn!(%server_url, "server url is not an https:// URL");
        }

        Ok(MarketingCloudSdkProps {
            server_url,
            app_id,
            access_token,
            mode: self.mode.unwrap_or_default(),
            analytics_enabled: self.analytics_enabled.unwrap_or(false),
        })
    }
}

/// Validate possibly-absent options
///
/// Absent or entirely empty options are rejected before the individual fields.
pub fn validate(options: Option<&PluginOptions>) -> Result<MarketingCloudSdkProps> {
    match options {
        Some(opts) if !opts.is_empty() => opts.validate(),
        _ => Err(Error::missing_option("Must configure plugin options.")),
    }
}
