//! Run-once bookkeeping for plugin passes
//!
//! A configuration pass must apply at most once per process, even when the
//! plugin is listed several times or composed by another plugin. The key is
//! the plugin name; the version applied under that name is recorded so a
//! skipped caller can report what already ran.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Name and version identifying an applied plugin
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginFingerprint {
    pub name: String,
    pub version: String,
}

impl PluginFingerprint {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PluginFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Result of claiming a fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// First claim for this plugin name; the pass should run
    Granted,
    /// The plugin already ran under this fingerprint
    AlreadyApplied(PluginFingerprint),
}

/// Registry of plugin names that have already run
#[derive(Debug, Default)]
pub struct RunOnceRegistry {
    applied: Mutex<HashMap<String, String>>,
}

static GLOBAL: Lazy<RunOnceRegistry> = Lazy::new(RunOnceRegistry::default);

impl RunOnceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used by the command-line tool
    pub fn global() -> &'static RunOnceRegistry {
        &GLOBAL
    }

    /// Record `fingerprint` unless its name was already claimed
    pub fn claim(&self, fingerprint: &PluginFingerprint) -> Claim {
        let mut applied = self
            .applied
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match applied.get(&fingerprint.name) {
            Some(version) => Claim::AlreadyApplied(PluginFingerprint::new(
                fingerprint.name.clone(),
                version.clone(),
            )),
            None => {
                applied.insert(fingerprint.name.clone(), fingerprint.version.clone());
                Claim::Granted
            }
        }
    }

    /// Forget a claim whose pass failed, so a later pass can run
    pub fn release(&self, name: &str) {
        self.applied
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(name);
    }

    /// Whether a plugin name has been claimed
    pub fn is_applied(&self, name: &str) -> bool {
        self.applied
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(name)
    }
}
