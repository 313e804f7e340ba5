//! iOS adapter for the Marketing Cloud SDK prebuild tools
//!
//! This crate applies the SDK setup to a generated iOS project:
//! - `aps-environment` entitlement
//! - Notification protocols on the app delegate header
//! - SDK configuration, push registration and delegate methods in the app delegate
//! - The `MarketingCloudSDK` pod

pub mod app_delegate;
pub mod entitlements;
pub mod header;
pub mod podfile;
pub mod project;

pub use project::IosProject;

use mcsdk_core::error::Result;
use mcsdk_core::options::MarketingCloudSdkProps;
use mcsdk_core::plugin_tag;
use mcsdk_core::session::{ModSession, PlannedMerge};
use std::path::PathBuf;

/// Apply every iOS step, in order, to the staged session
pub fn with_ios_config(
    session: &mut ModSession,
    project: &IosProject,
    props: &MarketingCloudSdkProps,
) -> Result<()> {
    let _span = tracing::info_span!("ios", project = %project.name).entered();

    entitlements::with_entitlements(session, &project.entitlements, props)?;
    header::with_extra_app_delegate_protocols(session, &project.app_delegate_header)?;
    app_delegate::with_app_delegate(session, &project.app_delegate, props)?;
    podfile::with_cocoapods(session, &project.podfile)?;

    tracing::info!("iOS project configured");
    Ok(())
}

/// Every tagged merge the iOS pass performs
pub fn merge_plan(project: &IosProject, props: &MarketingCloudSdkProps) -> Result<Vec<PlannedMerge>> {
    let mut plan = app_delegate::merge_plan(&project.app_delegate, props)?;
    plan.push(podfile::merge_plan(&project.podfile)?);
    Ok(plan)
}

/// Tags the iOS pass may have generated, grouped by file
pub fn generated_tags(project: &IosProject) -> Vec<(PathBuf, Vec<String>)> {
    vec![
        (
            project.app_delegate.clone(),
            app_delegate::TAGS.iter().map(|name| plugin_tag(name)).collect(),
        ),
        (project.podfile.clone(), vec![podfile::TAG.to_string()]),
    ]
}
