//! AppDelegate code injection
//!
//! Four tagged blocks are merged into the Objective-C app delegate:
//!
//! | tag | anchor | offset |
//! |---|---|---|
//! | `header` | `#import "AppDelegate.h"` | 1 |
//! | `configuration` | `[super application:... didFinishLaunchingWithOptions:...]` | -1 |
//! | `push-configuration` | same | 1 |
//! | `user-notification-methods` | `- (BOOL)application:... didFinishLaunchingWithOptions` | -1 |

use mcsdk_core::error::Result;
use mcsdk_core::generated_code::MergeSpec;
use mcsdk_core::options::MarketingCloudSdkProps;
use mcsdk_core::plugin_tag;
use mcsdk_core::session::{ModSession, PlannedMerge};
use std::path::Path;

const COMMENT: &str = "//";

const HEADER_ANCHOR: &str = r#"#import "AppDelegate\.h""#;
const SUPER_LAUNCH_ANCHOR: &str =
    r"\[super application:application didFinishLaunchingWithOptions:launchOptions\];";
const LAUNCH_METHOD_ANCHOR: &str =
    r"-\s*\(BOOL\)application:\(UIApplication\s*\*\)application\s*didFinishLaunchingWithOptions";

/// Tag names merged into the app delegate, in merge order
pub const TAGS: [&str; 4] = [
    "header",
    "configuration",
    "push-configuration",
    "user-notification-methods",
];

const SDK_IMPORT: &str = "#import <MarketingCloudSDK/MarketingCloudSDK.h>";

const PUSH_CONFIGURATION: &str = r#"  if (success == YES) {
        dispatch_async(dispatch_get_main_queue(), ^{
          if (@available(iOS 10, *)) {
              // set the UNUserNotificationCenter delegate - the delegate must be set here in
              // didFinishLaunchingWithOptions
              [UNUserNotificationCenter currentNotificationCenter].delegate = self;
              [[UIApplication sharedApplication] registerForRemoteNotifications];

              [[UNUserNotificationCenter currentNotificationCenter]
                  requestAuthorizationWithOptions:UNAuthorizationOptionAlert |
                                                  UNAuthorizationOptionSound |
                                                  UNAuthorizationOptionBadge
                                completionHandler:^(BOOL granted, NSError *_Nullable error) {
                                  if (error == nil) {
                                      if (granted == YES) {
                                          dispatch_async(dispatch_get_main_queue(), ^{
                                                         });
                                      }
                                  }
                                }];
          } else {
#if __IPHONE_OS_VERSION_MIN_REQUIRED < 100000
              UIUserNotificationSettings *settings = [UIUserNotificationSettings
                  settingsForTypes:UIUserNotificationTypeBadge | UIUserNotificationTypeSound |
                                   UIUserNotificationTypeAlert
                        categories:nil];
              [[UIApplication sharedApplication] registerUserNotificationSettings:settings];
#endif
              [[UIApplication sharedApplication] registerForRemoteNotifications];
          }
        });
    } else {
        //  MarketingCloudSDK sfmc_configure failed
        os_log_debug(OS_LOG_DEFAULT, "MarketingCloudSDK sfmc_configure failed with error = %@",
                     error);
    }"#;

const USER_NOTIFICATION_METHODS: &str = r#"- (void)application:(UIApplication *)application
    didRegisterForRemoteNotificationsWithDeviceToken:(NSData *)deviceToken {
    [[MarketingCloudSDK sharedInstance] sfmc_setDeviceToken:deviceToken];
}

- (void)application:(UIApplication *)application
    didFailToRegisterForRemoteNotificationsWithError:(NSError *)error {
    os_log_debug(OS_LOG_DEFAULT, "didFailToRegisterForRemoteNotificationsWithError = %@", error);
}

// The method will be called on the delegate when the user responded to the notification by opening
// the application, dismissing the notification or choosing a UNNotificationAction. The delegate
// must be set before the application returns from applicationDidFinishLaunching:.
- (void)userNotificationCenter:(UNUserNotificationCenter *)center
    didReceiveNotificationResponse:(UNNotificationResponse *)response
              withCompletionHandler:(void (^)(void))completionHandler {
    // tell the MarketingCloudSDK about the notification
    [[MarketingCloudSDK sharedInstance] sfmc_setNotificationRequest:response.notification.request];

    if (completionHandler != nil) {
        completionHandler();
    }
}

- (void)userNotificationCenter:(UNUserNotificationCenter *)center
        willPresentNotification:(UNNotification *)notification
          withCompletionHandler:
              (void (^)(UNNotificationPresentationOptions options))completionHandler {
    NSLog(@"User Info : %@", notification.request.content.userInfo);
    completionHandler(UNAuthorizationOptionSound | UNAuthorizationOptionAlert |
                      UNAuthorizationOptionBadge);
}

// This method is REQUIRED for correct functionality of the SDK.
// This method will be called on the delegate when the application receives a silent push
- (void)application:(UIApplication *)application
    didReceiveRemoteNotification:(NSDictionary *)userInfo
          fetchCompletionHandler:(void (^)(UIBackgroundFetchResult))completionHandler {
    [[MarketingCloudSDK sharedInstance] sfmc_setNotificationUserInfo:userInfo];

    completionHandler(UIBackgroundFetchResultNewData);
}"#;

/// Objective-C `NSString` literal for `value`
fn objc_string(value: &str) -> Result<String> {
    Ok(format!("@{}", serde_json::to_string(value)?))
}

/// SDK configuration block, run just before `[super application:...]`
pub fn configuration_fragment(props: &MarketingCloudSdkProps) -> Result<String> {
    Ok(format!(
        "  MarketingCloudSDKConfigBuilder *mcsdkBuilder = [MarketingCloudSDKConfigBuilder new];
    [mcsdkBuilder sfmc_setApplicationId:{app_id}];
    [mcsdkBuilder sfmc_setAccessToken:{access_token}];
    [mcsdkBuilder sfmc_setAnalyticsEnabled:@({analytics})];
    [mcsdkBuilder sfmc_setMarketingCloudServerUrl:{server_url}];

    NSError *error = nil;
    BOOL success = [[MarketingCloudSDK sharedInstance] sfmc_configureWithDictionary:[mcsdkBuilder sfmc_build] error:&error];",
        app_id = objc_string(&props.app_id)?,
        access_token = objc_string(&props.access_token)?,
        analytics = if props.analytics_enabled { "YES" } else { "NO" },
        server_url = objc_string(&props.server_url)?,
    ))
}

/// Every app delegate merge, in application order
pub fn merge_plan(path: &Path, props: &MarketingCloudSdkProps) -> Result<Vec<PlannedMerge>> {
    let specs = [
        MergeSpec::new(plugin_tag(TAGS[0]), SDK_IMPORT, HEADER_ANCHOR, 1, COMMENT)?,
        MergeSpec::new(
            plugin_tag(TAGS[1]),
            configuration_fragment(props)?,
            SUPER_LAUNCH_ANCHOR,
            -1,
            COMMENT,
        )?,
        MergeSpec::new(plugin_tag(TAGS[2]), PUSH_CONFIGURATION, SUPER_LAUNCH_ANCHOR, 1, COMMENT)?,
        MergeSpec::new(
            plugin_tag(TAGS[3]),
            USER_NOTIFICATION_METHODS,
            LAUNCH_METHOD_ANCHOR,
            -1,
            COMMENT,
        )?,
    ];

    Ok(specs
        .into_iter()
        .map(|spec| PlannedMerge::new(path, spec))
        .collect())
}

/// Merge the SDK setup into the app delegate
pub fn with_app_delegate(
    session: &mut ModSession,
    path: &Path,
    props: &MarketingCloudSdkProps,
) -> Result<usize> {
    let mut merged = 0;
    for planned in merge_plan(path, props)? {
        if session.apply(&planned)?.did_merge {
            merged += 1;
        }
    }
    tracing::debug!(path = %path.display(), merged, "app delegate merges");
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcsdk_core::generated_code::{find_generated_block, merge_contents};
    use mcsdk_core::options::Mode;
    use mcsdk_core::ErrorCode;

    const APP_DELEGATE: &str = r#"#import "AppDelegate.h"

#import <React/RCTBundleURLProvider.h>
#import <React/RCTLinkingManager.h>

@implementation AppDelegate

- (BOOL)application:(UIApplication *)application didFinishLaunchingWithOptions:(NSDictionary *)launchOptions
{
  self.moduleName = @"main";
  self.initialProps = @{};

  [super application:application didFinishLaunchingWithOptions:launchOptions];
  return YES;
}

@end
"#;

    fn props() -> MarketingCloudSdkProps {
        MarketingCloudSdkProps {
            server_url: "https://mc.example.com/".to_string(),
            app_id: "app-\"123\"".to_string(),
            access_token: "token".to_string(),
            mode: Mode::Development,
            analytics_enabled: true,
        }
    }

    fn apply_all(src: &str) -> String {
        merge_plan(Path::new("AppDelegate.mm"), &props())
            .unwrap()
            .iter()
            .fold(src.to_string(), |acc, planned| {
                merge_contents(&acc, &planned.spec).unwrap().contents
            })
    }

    #[test]
    fn test_configuration_fragment_escapes_values() {
        let fragment = configuration_fragment(&props()).unwrap();

        assert!(fragment.contains(r#"sfmc_setApplicationId:@"app-\"123\""];"#));
        assert!(fragment.contains("sfmc_setAnalyticsEnabled:@(YES)"));
        assert!(fragment.contains(r#"sfmc_setMarketingCloudServerUrl:@"https://mc.example.com/"];"#));
    }

    #[test]
    fn test_analytics_disabled() {
        let props = MarketingCloudSdkProps {
            analytics_enabled: false,
            ..props()
        };
        assert!(configuration_fragment(&props)
            .unwrap()
            .contains("sfmc_setAnalyticsEnabled:@(NO)"));
    }

    #[test]
    fn test_all_blocks_placed() {
        let out = apply_all(APP_DELEGATE);
        let lines: Vec<&str> = out.split('\n').collect();

        let import = find_generated_block(&out, &plugin_tag("header")).unwrap();
        assert_eq!(lines[import.start - 1], "#import \"AppDelegate.h\"");

        let super_line = lines
            .iter()
            .position(|l| l.contains("[super application:application"))
            .unwrap();
        let config = find_generated_block(&out, &plugin_tag("configuration")).unwrap();
        let push = find_generated_block(&out, &plugin_tag("push-configuration")).unwrap();
        assert!(config.end < super_line);
        assert_eq!(push.start, super_line + 1);

        let methods = find_generated_block(&out, &plugin_tag("user-notification-methods")).unwrap();
        let launch_line = lines
            .iter()
            .position(|l| l.starts_with("- (BOOL)application:"))
            .unwrap();
        assert!(methods.end < launch_line);
        assert!(methods.start > lines.iter().position(|l| *l == "@implementation AppDelegate").unwrap());
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let once = apply_all(APP_DELEGATE);
        let twice = apply_all(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_super_call_fails() {
        let src = APP_DELEGATE.replace(
            "  [super application:application didFinishLaunchingWithOptions:launchOptions];\n",
            "",
        );
        let plan = merge_plan(Path::new("AppDelegate.mm"), &props()).unwrap();
        let err = merge_contents(&src, &plan[1].spec).unwrap_err();

        assert_eq!(err.code, ErrorCode::NoAnchorMatch);
        assert!(err.message.contains("(configuration)"));
    }

    #[test]
    fn test_fragment_hashes_match_previously_generated_blocks() {
        use mcsdk_core::generated_code::fragment_hash;

        let props = MarketingCloudSdkProps {
            server_url: "https://mc.example.com/".to_string(),
            app_id: "app-id".to_string(),
            access_token: "token".to_string(),
            mode: Mode::Development,
            analytics_enabled: false,
        };

        assert_eq!(
            fragment_hash(&configuration_fragment(&props).unwrap()),
            "sync-3948842a71afbae1268eea7c1db2bdd831987316"
        );
        assert_eq!(
            fragment_hash(PUSH_CONFIGURATION),
            "sync-856818acc87ac1c21fb71ac6e91c80980cf9b0aa"
        );
        assert_eq!(
            fragment_hash(USER_NOTIFICATION_METHODS),
            "sync-8eaeff29fb873dd0da07999a626db70091b60a90"
        );
    }
}
