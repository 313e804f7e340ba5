//! Native Android project discovery

use mcsdk_core::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source language of `MainApplication`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Java,
    Kotlin,
}

impl Language {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "java" => Some(Language::Java),
            "kt" => Some(Language::Kotlin),
            _ => None,
        }
    }
}

/// Paths (relative to the project root) of every file the Android pass touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidProject {
    /// Platform directory, e.g. `android`
    pub android_dir: PathBuf,
    /// Project-level `build.gradle`
    pub project_build_gradle: PathBuf,
    /// App module `build.gradle`
    pub app_build_gradle: PathBuf,
    pub manifest: PathBuf,
    pub main_application: PathBuf,
    pub language: Language,
}

impl AndroidProject {
    /// Discover the Android project under `project_root/android_dir`
    pub fn discover(project_root: &Path, android_dir: impl AsRef<Path>) -> Result<Self> {
        let android_dir = android_dir.as_ref().to_path_buf();
        let android_root = project_root.join(&android_dir);
        if !android_root.is_dir() {
            return Err(Error::project_not_found(format!(
                "Android project directory not found: {}",
                android_root.display()
            ))
            .with_suggestion("Run `expo prebuild --platform android` first"));
        }

        let (main_application, language) = find_main_application(&android_root)?;
        tracing::debug!(main_application = %main_application.display(), ?language, "discovered Android project");

        Ok(Self {
            project_build_gradle: android_dir.join("build.gradle"),
            app_build_gradle: android_dir.join("app").join("build.gradle"),
            manifest: android_dir.join("app/src/main/AndroidManifest.xml"),
            main_application: android_dir.join(main_application),
            language,
            android_dir,
        })
    }
}

/// First `MainApplication.java` / `MainApplication.kt` under `app/src/main`
fn find_main_application(android_root: &Path) -> Result<(PathBuf, Language)> {
    let source_root = android_root.join("app/src/main");

    let mut candidates: Vec<(PathBuf, Language)> = WalkDir::new(&source_root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .file_stem()
                .is_some_and(|stem| stem == "MainApplication")
        })
        .filter_map(|entry| {
            let language = Language::from_path(entry.path())?;
            let rel = entry.path().strip_prefix(android_root).ok()?.to_path_buf();
            Some((rel, language))
        })
        .collect();
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    candidates.into_iter().next().ok_or_else(|| {
        Error::file_not_found(source_root.join("java/.../MainApplication.java"))
            .with_context("searched for MainApplication.java and MainApplication.kt")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcsdk_core::ErrorCode;
    use std::fs;
    use tempfile::TempDir;

    fn scaffold(dir: &Path, file: &str) {
        let pkg = dir.join("android/app/src/main/java/com/example/app");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join(file), "package com.example.app\n").unwrap();
    }

    #[test]
    fn test_discover_java() {
        let dir = TempDir::new().unwrap();
        scaffold(dir.path(), "MainApplication.java");

        let project = AndroidProject::discover(dir.path(), "android").unwrap();

        assert_eq!(project.language, Language::Java);
        assert_eq!(
            project.main_application,
            PathBuf::from("android/app/src/main/java/com/example/app/MainApplication.java")
        );
        assert_eq!(project.app_build_gradle, PathBuf::from("android/app/build.gradle"));
        assert_eq!(project.manifest, PathBuf::from("android/app/src/main/AndroidManifest.xml"));
    }

    #[test]
    fn test_discover_kotlin() {
        let dir = TempDir::new().unwrap();
        scaffold(dir.path(), "MainApplication.kt");

        let project = AndroidProject::discover(dir.path(), "android").unwrap();
        assert_eq!(project.language, Language::Kotlin);
    }

    #[test]
    fn test_missing_main_application() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("android/app/src/main")).unwrap();

        let err = AndroidProject::discover(dir.path(), "android").unwrap_err();
        assert_eq!(err.code, ErrorCode::FileNotFound);
    }
}
