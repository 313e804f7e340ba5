//! AndroidManifest permission for notifications

use mcsdk_core::error::Result;
use mcsdk_core::generated_code::{find_generated_block, CommentSyntax, MergeSpec};
use mcsdk_core::plugin_tag;
use mcsdk_core::session::{ModSession, PlannedMerge};
use std::path::Path;

pub const TAG: &str = "notification-permission";

/// Runtime permission required to post notifications on Android 13+
pub const POST_NOTIFICATIONS: &str = "android.permission.POST_NOTIFICATIONS";

pub fn merge_plan(path: &Path) -> Result<PlannedMerge> {
    let fragment = format!("  <uses-permission android:name=\"{}\"/>", POST_NOTIFICATIONS);
    Ok(PlannedMerge::new(
        path,
        MergeSpec::new(plugin_tag(TAG), fragment, r"<application\b", 0, CommentSyntax::xml())?,
    ))
}

/// Declare `POST_NOTIFICATIONS` unless the app already declares it
pub fn with_notification_permission(session: &mut ModSession, path: &Path) -> Result<bool> {
    let planned = merge_plan(path)?;
    let manifest = session.read(path)?;

    if find_generated_block(manifest, &planned.spec.tag).is_none() && manifest.contains(POST_NOTIFICATIONS) {
        tracing::debug!(path = %path.display(), "notification permission already declared");
        return Ok(false);
    }

    let merged = session.apply(&planned)?.did_merge;
    tracing::debug!(path = %path.display(), merged, "notification permission");
    Ok(merged)
}
