//! The configuration pass

use crate::{Platforms, ProjectLayout};
use chrono::{DateTime, Utc};
use mcsdk_android::AndroidProject;
use mcsdk_core::error::{Result, ResultExt};
use mcsdk_core::options::{self, MarketingCloudSdkProps, PluginOptions};
use mcsdk_core::run_once::{Claim, PluginFingerprint, RunOnceRegistry};
use mcsdk_core::session::{FileChange, ModSession};
use mcsdk_core::PLUGIN_NAME;
use mcsdk_ios::IosProject;
use serde::Serialize;

/// Knobs for one pass
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplySettings {
    pub platforms: Platforms,
    /// Stage and diff every edit without writing
    pub dry_run: bool,
}

/// What the pass did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    /// The plugin already ran in this process
    Skipped { previous: PluginFingerprint },
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub plugin: PluginFingerprint,
    pub outcome: Outcome,
    pub platforms: Platforms,
    pub dry_run: bool,
    /// Changed files; pending when `dry_run` is set, written otherwise
    pub changes: Vec<FileChange>,
    pub finished_at: DateTime<Utc>,
}

/// Fingerprint recorded in the run-once registry
pub fn fingerprint() -> PluginFingerprint {
    PluginFingerprint::new(PLUGIN_NAME, env!("CARGO_PKG_VERSION"))
}

/// Android then iOS steps in one staged session; returns the changed files
fn run_pass(
    layout: &ProjectLayout,
    props: &MarketingCloudSdkProps,
    settings: &ApplySettings,
) -> Result<Vec<FileChange>> {
    let mut session = ModSession::new(&layout.root);

    if settings.platforms.includes_android() {
        let project = AndroidProject::discover(&layout.root, &layout.android_dir)?;
        mcsdk_android::with_android_config(&mut session, &project, props)
            .context("Android configuration")?;
    }

    if settings.platforms.includes_ios() {
        let project = IosProject::discover(&layout.root, &layout.ios_dir)?;
        mcsdk_ios::with_ios_config(&mut session, &project, props)
            .context("iOS configuration")?;
    }

    if settings.dry_run {
        Ok(session.changes())
    } else {
        session.commit()
    }
}

/// Apply the SDK setup to the native projects under `layout`
///
/// Options are validated before any file is read, and every edit is staged
/// until all steps succeed, so a failing pass writes nothing. The pass runs at
/// most once per `registry`; dry runs do not claim it, and a failed pass
/// releases its claim.
pub fn with_marketing_cloud_sdk(
    layout: &ProjectLayout,
    options: Option<&PluginOptions>,
    registry: &RunOnceRegistry,
    settings: &ApplySettings,
) -> Result<ApplyReport> {
    let props = options::validate(options)?;
    let plugin = fingerprint();

    if !settings.dry_run {
        if let Claim::AlreadyApplied(previous) = registry.claim(&plugin) {
            tracing::info!(%previous, "plugin already applied, skipping");
            return Ok(ApplyReport {
                plugin,
                outcome: Outcome::Skipped { previous },
                platforms: settings.platforms,
                dry_run: false,
                changes: Vec::new(),
                finished_at: Utc::now(),
            });
        }
    }

    let changes = match run_pass(layout, &props, settings) {
        Ok(changes) => changes,
        Err(e) => {
            if !settings.dry_run {
                registry.release(&plugin.name);
            }
            return Err(e);
        }
    };

    tracing::info!(
        plugin = %plugin,
        changed = changes.len(),
        dry_run = settings.dry_run,
        "configuration pass finished"
    );

    Ok(ApplyReport {
        plugin,
        outcome: Outcome::Applied,
        platforms: settings.platforms,
        dry_run: settings.dry_run,
        changes,
        finished_at: Utc::now(),
    })
}
