//! Removal of generated blocks
//!
//! Only tag-delimited blocks are removed. The entitlement value and the
//! header protocol list are plain edits without markers and stay as they are.

use crate::{Platforms, ProjectLayout};
use mcsdk_android::AndroidProject;
use mcsdk_core::error::Result;
use mcsdk_core::generated_code::remove_generated_contents;
use mcsdk_core::session::{FileChange, ModSession};
use mcsdk_ios::IosProject;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedBlock {
    pub path: PathBuf,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub removed: Vec<RemovedBlock>,
    pub dry_run: bool,
    pub changes: Vec<FileChange>,
}

/// Remove every block the plugin generated
pub fn clean(layout: &ProjectLayout, platforms: Platforms, dry_run: bool) -> Result<CleanReport> {
    let mut targets: Vec<(PathBuf, Vec<String>)> = Vec::new();
    if platforms.includes_android() {
        let project = AndroidProject::discover(&layout.root, &layout.android_dir)?;
        targets.extend(mcsdk_android::generated_tags(&project));
    }
    if platforms.includes_ios() {
        let project = IosProject::discover(&layout.root, &layout.ios_dir)?;
        targets.extend(mcsdk_ios::generated_tags(&project));
    }

    let mut session = ModSession::new(&layout.root);
    let mut removed = Vec::new();

    for (path, tags) in targets {
        if !session.exists(&path) {
            tracing::debug!(path = %path.display(), "skipping missing file");
            continue;
        }

        session.update(&path, |src| {
            let mut contents = src.to_string();
            for tag in &tags {
                while let Some(next) = remove_generated_contents(&contents, tag) {
                    contents = next;
                    removed.push(RemovedBlock {
                        path: path.clone(),
                        tag: tag.clone(),
                    });
                }
            }
            Ok(contents)
        })?;
    }

    let changes = if dry_run {
        session.changes()
    } else {
        session.commit()?
    };

    tracing::info!(removed = removed.len(), dry_run, "clean finished");

    Ok(CleanReport {
        removed,
        dry_run,
        changes,
    })
}
