//! CocoaPods dependency injection

use mcsdk_core::error::{Error, ErrorCode, Result};
use mcsdk_core::generated_code::MergeSpec;
use mcsdk_core::session::{ModSession, PlannedMerge};
use std::path::Path;

/// Tag of the Podfile block
pub const TAG: &str = "marketing-cloud-sdk";

/// Pod declaration added to the app target
pub const POD_LINE: &str = "  pod 'MarketingCloudSDK', '~> 7.6'";

const MALFORMED_MESSAGE: &str = "Cannot add MarketingCloudSDK to the project's ios/Podfile because it's malformed. Please report this with a copy of your project Podfile.";

pub fn merge_plan(path: &Path) -> Result<PlannedMerge> {
    Ok(PlannedMerge::new(
        path,
        MergeSpec::new(TAG, POD_LINE, "use_native_modules", 0, "#")?,
    ))
}

/// Declare the SDK pod ahead of `use_native_modules!`
pub fn with_cocoapods(session: &mut ModSession, path: &Path) -> Result<bool> {
    let planned = merge_plan(path)?;
    let results = session.apply(&planned).map_err(|err| match err.code {
        ErrorCode::NoAnchorMatch => Error::malformed_target(MALFORMED_MESSAGE)
            .with_context(path.display().to_string())
            .with_source(err),
        _ => err,
    })?;

    tracing::debug!(path = %path.display(), merged = results.did_merge, "podfile");
    Ok(results.did_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PODFILE: &str = "target 'MyApp' do\n  use_expo_modules!\n  config = use_native_modules!\n\n  use_react_native!(\n    :path => config[:reactNativePath],\n  )\nend\n";

    #[test]
    fn test_pod_inserted_before_native_modules() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Podfile"), PODFILE).unwrap();
        let mut session = ModSession::new(dir.path());

        assert!(with_cocoapods(&mut session, Path::new("Podfile")).unwrap());
        let out = session.read("Podfile").unwrap().to_string();
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[2].starts_with("# @generated begin marketing-cloud-sdk - "));
        assert_eq!(lines[3], POD_LINE);
        assert_eq!(lines[4], "# @generated end marketing-cloud-sdk");
        assert_eq!(lines[5], "  config = use_native_modules!");

        assert!(!with_cocoapods(&mut session, Path::new("Podfile")).unwrap());
    }

    #[test]
    fn test_malformed_podfile() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Podfile"), "target 'MyApp' do\nend\n").unwrap();
        let mut session = ModSession::new(dir.path());

        let err = with_cocoapods(&mut session, Path::new("Podfile")).unwrap_err();

        assert_eq!(err.code, ErrorCode::MalformedTargetFile);
        assert_eq!(err.message, MALFORMED_MESSAGE);
        assert!(session.changes().is_empty());
    }
}
