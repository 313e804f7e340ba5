//! Generated block status

use crate::{Platforms, ProjectLayout};
use mcsdk_android::AndroidProject;
use mcsdk_core::error::Result;
use mcsdk_core::generated_code::{find_generated_block, fragment_hash};
use mcsdk_core::options::{self, PluginOptions};
use mcsdk_core::session::{ModSession, PlannedMerge};
use mcsdk_ios::IosProject;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockState {
    /// Present with the fragment the current options produce
    Current,
    /// Present but generated from different options or an older version
    Stale,
    Missing,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockStatus {
    pub path: PathBuf,
    pub tag: String,
    pub state: BlockState,
    /// 1-based line range of the block, when present
    pub lines: Option<(usize, usize)>,
}

/// Report every tagged block the current options would generate
pub fn status(
    layout: &ProjectLayout,
    options: Option<&PluginOptions>,
    platforms: Platforms,
) -> Result<Vec<BlockStatus>> {
    let props = options::validate(options)?;

    let mut plan: Vec<PlannedMerge> = Vec::new();
    if platforms.includes_android() {
        let project = AndroidProject::discover(&layout.root, &layout.android_dir)?;
        plan.extend(mcsdk_android::merge_plan(&project, &props)?);
    }
    if platforms.includes_ios() {
        let project = IosProject::discover(&layout.root, &layout.ios_dir)?;
        plan.extend(mcsdk_ios::merge_plan(&project, &props)?);
    }

    let mut session = ModSession::new(&layout.root);
    let mut report = Vec::with_capacity(plan.len());

    for planned in plan {
        let contents = session.read(&planned.path)?;
        let block = find_generated_block(contents, &planned.spec.tag);

        let state = match &block {
            None => BlockState::Missing,
            Some(b) if b.hash.as_deref() == Some(fragment_hash(&planned.spec.new_src).as_str()) => {
                BlockState::Current
            }
            Some(_) => BlockState::Stale,
        };

        report.push(BlockStatus {
            path: planned.path,
            tag: planned.spec.tag,
            state,
            lines: block.map(|b| (b.start + 1, b.end + 1)),
        });
    }

    Ok(report)
}
