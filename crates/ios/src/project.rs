//! Native iOS project discovery
//!
//! Locates the files the adapter edits inside a generated `ios/` directory:
//! the Xcode project name, the entitlements file referenced by the build
//! settings, the Objective-C app delegate pair and the Podfile.

use mcsdk_core::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

static ENTITLEMENTS_SETTING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"CODE_SIGN_ENTITLEMENTS\s*=\s*"?([^";]+)"?\s*;"#).unwrap());

/// Paths (relative to the project root) of every file the iOS pass touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IosProject {
    /// Platform directory, e.g. `ios`
    pub ios_dir: PathBuf,
    /// Xcode project name (`<name>.xcodeproj`)
    pub name: String,
    pub entitlements: PathBuf,
    pub app_delegate: PathBuf,
    pub app_delegate_header: PathBuf,
    pub podfile: PathBuf,
}

impl IosProject {
    /// Discover the iOS project under `project_root/ios_dir`
    pub fn discover(project_root: &Path, ios_dir: impl AsRef<Path>) -> Result<Self> {
        let ios_dir = ios_dir.as_ref().to_path_buf();
        let ios_root = project_root.join(&ios_dir);
        if !ios_root.is_dir() {
            return Err(Error::project_not_found(format!(
                "iOS project directory not found: {}",
                ios_root.display()
            ))
            .with_suggestion("Run `expo prebuild --platform ios` first"));
        }

        let name = project_name(&ios_root)?;
        let entitlements = entitlements_path(&ios_root, &name);
        let app_delegate = app_delegate_path(&ios_root, &name)?;

        tracing::debug!(%name, entitlements = %entitlements.display(), "discovered iOS project");

        Ok(Self {
            entitlements: ios_dir.join(entitlements),
            app_delegate: ios_dir.join(app_delegate),
            app_delegate_header: ios_dir.join(&name).join("AppDelegate.h"),
            podfile: ios_dir.join("Podfile"),
            ios_dir,
            name,
        })
    }
}

/// Name of the first application `.xcodeproj` in the platform directory
fn project_name(ios_root: &Path) -> Result<String> {
    let pattern = format!(
        "{}/*.xcodeproj",
        glob::Pattern::escape(&ios_root.display().to_string())
    );

    let mut names: Vec<String> = glob::glob(&pattern)
        .map_err(|e| Error::project_not_found(format!("Invalid project search pattern: {}", e)))?
        .filter_map(|entry| entry.ok())
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .filter(|name| name != "Pods")
        .collect();
    names.sort();

    names.into_iter().next().ok_or_else(|| {
        Error::project_not_found(format!("No .xcodeproj found in {}", ios_root.display()))
    })
}

/// Entitlements path relative to the platform directory
///
/// Prefers `CODE_SIGN_ENTITLEMENTS` from the project build settings and falls
/// back to `<name>/<name>.entitlements`.
fn entitlements_path(ios_root: &Path, name: &str) -> PathBuf {
    let pbxproj = ios_root
        .join(format!("{}.xcodeproj", name))
        .join("project.pbxproj");

    fs::read_to_string(&pbxproj)
        .ok()
        .and_then(|content| {
            ENTITLEMENTS_SETTING
                .captures(&content)
                .map(|cap| PathBuf::from(cap[1].trim()))
        })
        .unwrap_or_else(|| PathBuf::from(name).join(format!("{}.entitlements", name)))
}

/// Objective-C app delegate relative to the platform directory
fn app_delegate_path(ios_root: &Path, name: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(name);

    for file in ["AppDelegate.mm", "AppDelegate.m"] {
        if ios_root.join(&dir).join(file).is_file() {
            return Ok(dir.join(file));
        }
    }

    if ios_root.join(&dir).join("AppDelegate.swift").is_file() {
        return Err(Error::project_not_found(
            "Swift AppDelegate is not supported; an Objective-C AppDelegate.m or AppDelegate.mm is required",
        ));
    }

    Err(Error::file_not_found(ios_root.join(&dir).join("AppDelegate.mm")))
}
