//! Android adapter for the Marketing Cloud SDK prebuild tools
//!
//! This crate applies the SDK setup to a generated Android project:
//! - Marketing Cloud maven repository and SDK dependency in Gradle
//! - `POST_NOTIFICATIONS` permission in the manifest
//! - SDK imports and initialisation in `MainApplication` (Java or Kotlin)

pub mod gradle;
pub mod main_application;
pub mod manifest;
pub mod project;

pub use project::{AndroidProject, Language};

use mcsdk_core::error::Result;
use mcsdk_core::options::MarketingCloudSdkProps;
use mcsdk_core::plugin_tag;
use mcsdk_core::session::{ModSession, PlannedMerge};
use std::path::PathBuf;

/// Apply every Android step, in order, to the staged session
pub fn with_android_config(
    session: &mut ModSession,
    project: &AndroidProject,
    props: &MarketingCloudSdkProps,
) -> Result<()> {
    let _span = tracing::info_span!("android", dir = %project.android_dir.display()).entered();

    gradle::with_maven_repository(session, &project.project_build_gradle)?;
    gradle::with_sdk_dependency(session, &project.app_build_gradle)?;
    manifest::with_notification_permission(session, &project.manifest)?;
    main_application::with_sdk_initialization(
        session,
        &project.main_application,
        project.language,
        props,
    )?;

    tracing::info!("Android project configured");
    Ok(())
}

/// Every tagged merge the Android pass performs
pub fn merge_plan(
    project: &AndroidProject,
    props: &MarketingCloudSdkProps,
) -> Result<Vec<PlannedMerge>> {
    let mut plan = vec![
        gradle::repository_plan(&project.project_build_gradle)?,
        gradle::dependency_plan(&project.app_build_gradle)?,
        manifest::merge_plan(&project.manifest)?,
    ];
    plan.extend(main_application::merge_plan(
        &project.main_application,
        project.language,
        props,
    )?);
    Ok(plan)
}

/// Tags the Android pass may have generated, grouped by file
pub fn generated_tags(project: &AndroidProject) -> Vec<(PathBuf, Vec<String>)> {
    vec![
        (
            project.project_build_gradle.clone(),
            vec![plugin_tag(gradle::REPOSITORY_TAG)],
        ),
        (
            project.app_build_gradle.clone(),
            vec![plugin_tag(gradle::DEPENDENCY_TAG)],
        ),
        (project.manifest.clone(), vec![plugin_tag(manifest::TAG)]),
        (
            project.main_application.clone(),
            vec![
                plugin_tag(main_application::IMPORTS_TAG),
                plugin_tag(main_application::INITIALIZATION_TAG),
            ],
        ),
    ]
}
