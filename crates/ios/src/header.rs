//! App delegate header protocol conformance
//!
//! The delegate must adopt the notification protocols for the SDK to receive
//! callbacks. The protocol list is edited in place; each protocol is added at
//! most once.

use mcsdk_core::error::Result;
use mcsdk_core::session::ModSession;
use mcsdk_core::text_edit::{expect_single_match, replace_exactly_once};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;

/// Protocols the app delegate must declare
pub const EXTRA_PROTOCOLS: [&str; 2] = ["UIApplicationDelegate", "UNUserNotificationCenterDelegate"];

static PROTOCOL_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(EXAppDelegateWrapper\s*<(.*?RCTBridgeDelegate.*?))(>)").unwrap());

/// Add any missing `protocols` to the `EXAppDelegateWrapper <...>` list
///
/// The list must appear exactly once. Protocols already declared are skipped
/// individually, so re-running never duplicates an entry.
pub fn add_protocols(header: &str, protocols: &[&str]) -> Result<String> {
    let caps = expect_single_match(header, &PROTOCOL_LIST)?;

    let declared: Vec<&str> = caps[2].split(',').map(str::trim).collect();
    let missing: Vec<&str> = protocols
        .iter()
        .copied()
        .filter(|protocol| !declared.contains(protocol))
        .collect();

    if missing.is_empty() {
        return Ok(header.to_string());
    }

    let extra: String = missing.iter().map(|protocol| format!(", {}", protocol)).collect();
    replace_exactly_once(header, &PROTOCOL_LIST, |caps: &Captures| {
        format!("{}{}{}", &caps[1], extra, &caps[3])
    })
}

/// Declare the notification protocols in `AppDelegate.h`
pub fn with_extra_app_delegate_protocols(session: &mut ModSession, path: &Path) -> Result<bool> {
    let changed = session.update(path, |header| add_protocols(header, &EXTRA_PROTOCOLS))?;
    tracing::debug!(path = %path.display(), changed, "app delegate protocols");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcsdk_core::ErrorCode;

    const HEADER: &str = "#import <RCTAppDelegate.h>\n#import <Expo/Expo.h>\n\n@interface AppDelegate : EXAppDelegateWrapper <RCTBridgeDelegate>\n\n@end\n";

    #[test]
    fn test_adds_both_protocols() {
        let out = add_protocols(HEADER, &EXTRA_PROTOCOLS).unwrap();
        assert!(out.contains(
            "EXAppDelegateWrapper <RCTBridgeDelegate, UIApplicationDelegate, UNUserNotificationCenterDelegate>"
        ));
    }

    #[test]
    fn test_is_idempotent() {
        let once = add_protocols(HEADER, &EXTRA_PROTOCOLS).unwrap();
        let twice = add_protocols(&once, &EXTRA_PROTOCOLS).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_skips_protocols_already_declared() {
        let header = HEADER.replace("<RCTBridgeDelegate>", "<RCTBridgeDelegate, UIApplicationDelegate>");
        let out = add_protocols(&header, &EXTRA_PROTOCOLS).unwrap();

        assert_eq!(out.matches("UIApplicationDelegate").count(), 1);
        assert!(out.contains("<RCTBridgeDelegate, UIApplicationDelegate, UNUserNotificationCenterDelegate>"));
    }

    #[test]
    fn test_protocol_mentioned_elsewhere_is_still_added() {
        let header = format!("// UNUserNotificationCenterDelegate is set up below\n{}", HEADER);
        let out = add_protocols(&header, &EXTRA_PROTOCOLS).unwrap();
        assert!(out.contains("UIApplicationDelegate, UNUserNotificationCenterDelegate>"));
    }

    #[test]
    fn test_missing_protocol_list_is_error() {
        let header = "@interface AppDelegate : EXAppDelegateWrapper\n@end\n";
        let err = add_protocols(header, &EXTRA_PROTOCOLS).unwrap_err();
        assert_eq!(err.code, ErrorCode::PatternMismatch);
    }

    #[test]
    fn test_repeated_protocol_list_is_error() {
        let header = format!("{}{}", HEADER, HEADER);
        let err = add_protocols(&header, &EXTRA_PROTOCOLS).unwrap_err();

        assert_eq!(err.code, ErrorCode::PatternMismatch);
        assert!(err.message.contains("found 2 matches"));
    }
}
