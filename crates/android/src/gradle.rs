//! Gradle build script edits
//!
//! Adds the Marketing Cloud maven repository to the project build script and
//! the SDK dependency to the app module.

use mcsdk_core::error::Result;
use mcsdk_core::generated_code::MergeSpec;
use mcsdk_core::plugin_tag;
use mcsdk_core::session::{ModSession, PlannedMerge};
use std::path::Path;

/// Maven repository hosting the SDK
pub const MAVEN_REPOSITORY: &str =
    "https://salesforce-marketingcloud.github.io/MarketingCloudSDK-Android/repository";

/// SDK artifact coordinates
pub const SDK_ARTIFACT: &str = "com.salesforce.marketingcloud:marketingcloudsdk:8.1.0";

pub const REPOSITORY_TAG: &str = "gradle-repository";
pub const DEPENDENCY_TAG: &str = "gradle-dependency";

pub fn repository_plan(path: &Path) -> Result<PlannedMerge> {
    let fragment = format!(
        "    repositories {{\n        maven {{ url \"{}\" }}\n    }}",
        MAVEN_REPOSITORY
    );
    Ok(PlannedMerge::new(
        path,
        MergeSpec::new(plugin_tag(REPOSITORY_TAG), fragment, r"^\s*allprojects\s*\{", 1, "//")?,
    ))
}

pub fn dependency_plan(path: &Path) -> Result<PlannedMerge> {
    let fragment = format!("    implementation \"{}\"", SDK_ARTIFACT);
    Ok(PlannedMerge::new(
        path,
        MergeSpec::new(plugin_tag(DEPENDENCY_TAG), fragment, r"^dependencies\s*\{", 1, "//")?,
    ))
}

/// Register the SDK repository for every module
pub fn with_maven_repository(session: &mut ModSession, path: &Path) -> Result<bool> {
    let merged = session.apply(&repository_plan(path)?)?.did_merge;
    tracing::debug!(path = %path.display(), merged, "gradle repository");
    Ok(merged)
}

/// Add the SDK to the app module dependencies
pub fn with_sdk_dependency(session: &mut ModSession, path: &Path) -> Result<bool> {
    let merged = session.apply(&dependency_plan(path)?)?.did_merge;
    tracing::debug!(path = %path.display(), merged, "gradle dependency");
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcsdk_core::generated_code::merge_contents;

    const PROJECT_GRADLE: &str = "buildscript {\n    repositories {\n        google()\n        mavenCentral()\n    }\n}\n\nallprojects {\n    repositories {\n        google()\n        mavenCentral()\n    }\n}\n";

    const APP_GRADLE: &str = "apply plugin: \"com.android.application\"\n\nandroid {\n    namespace \"com.example.app\"\n}\n\ndependencies {\n    implementation(\"com.facebook.react:react-android\")\n}\n";

    #[test]
    fn test_repository_inside_allprojects() {
        let plan = repository_plan(Path::new("build.gradle")).unwrap();
        let out = merge_contents(PROJECT_GRADLE, &plan.spec).unwrap();
        let lines: Vec<&str> = out.contents.lines().collect();

        let allprojects = lines.iter().position(|l| *l == "allprojects {").unwrap();
        assert!(lines[allprojects + 1].starts_with("// @generated begin"));
        assert!(lines[allprojects + 3].contains(MAVEN_REPOSITORY));

        let buildscript_end = lines.iter().position(|l| *l == "}").unwrap();
        assert!(buildscript_end < allprojects);
    }

    #[test]
    fn test_dependency_in_app_module() {
        let plan = dependency_plan(Path::new("app/build.gradle")).unwrap();
        let out = merge_contents(APP_GRADLE, &plan.spec).unwrap();
        let lines: Vec<&str> = out.contents.lines().collect();

        let deps = lines.iter().position(|l| *l == "dependencies {").unwrap();
        assert_eq!(lines[deps + 2], format!("    implementation \"{}\"", SDK_ARTIFACT));
        assert_eq!(lines[deps + 4], "    implementation(\"com.facebook.react:react-android\")");
    }

    #[test]
    fn test_missing_dependencies_block() {
        let plan = dependency_plan(Path::new("app/build.gradle")).unwrap();
        assert!(merge_contents("android {\n}\n", &plan.spec).is_err());
    }
}
