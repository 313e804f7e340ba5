//! Command-line behaviour of `mcsdk-prebuild`

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const APP_DELEGATE: &str = "#import \"AppDelegate.h\"\n\n@implementation AppDelegate\n\n- (BOOL)application:(UIApplication *)application didFinishLaunchingWithOptions:(NSDictionary *)launchOptions\n{\n  self.moduleName = @\"main\";\n  return [super application:application didFinishLaunchingWithOptions:launchOptions];\n}\n\n@end\n";

const APP_DELEGATE_HEADER: &str = "#import <RCTAppDelegate.h>\n#import <Expo/Expo.h>\n\n@interface AppDelegate : EXAppDelegateWrapper <RCTBridgeDelegate>\n\n@end\n";

const PODFILE: &str = "target 'MyApp' do\n  config = use_native_modules!\n  use_react_native!(:path => config[:reactNativePath])\nend\n";

const PROJECT_GRADLE: &str = "allprojects {\n    repositories {\n        google()\n    }\n}\n";

const APP_GRADLE: &str = "dependencies {\n    implementation(\"com.facebook.react:react-android\")\n}\n";

const MANIFEST: &str = "<manifest xmlns:android=\"http://schemas.android.com/apk/res/android\">\n  <application android:name=\".MainApplication\">\n  </application>\n</manifest>\n";

const MAIN_APPLICATION: &str = "package com.example.app;\n\npublic class MainApplication extends Application {\n  @Override\n  public void onCreate() {\n    super.onCreate();\n  }\n}\n";

const ENV_VARS: [&str; 8] = [
    "MCSDK_PROJECT_ROOT",
    "MCSDK_CONFIG",
    "MCSDK_SERVER_URL",
    "MCSDK_APP_ID",
    "MCSDK_ACCESS_TOKEN",
    "MCSDK_MODE",
    "MCSDK_ANALYTICS_ENABLED",
    "RUST_LOG",
];

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(root, "ios/MyApp.xcodeproj/project.pbxproj", "");
    write(root, "ios/MyApp/AppDelegate.mm", APP_DELEGATE);
    write(root, "ios/MyApp/AppDelegate.h", APP_DELEGATE_HEADER);
    write(root, "ios/Podfile", PODFILE);
    write(root, "android/build.gradle", PROJECT_GRADLE);
    write(root, "android/app/build.gradle", APP_GRADLE);
    write(root, "android/app/src/main/AndroidManifest.xml", MANIFEST);
    write(
        root,
        "android/app/src/main/java/com/example/app/MainApplication.java",
        MAIN_APPLICATION,
    );

    dir
}

/// Binary rooted at `dir` with no inherited `MCSDK_*` settings
fn mcsdk(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mcsdk-prebuild").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.arg("--project-root").arg(dir.path()).arg("--no-color");
    cmd
}

fn with_options(cmd: &mut Command) -> &mut Command {
    cmd.args([
        "--server-url",
        "https://mc.example.com/",
        "--app-id",
        "app-id",
        "--access-token",
        "token",
    ])
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("mcsdk-prebuild")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn test_missing_options_exit_code() {
    let dir = fixture();

    mcsdk(&dir)
        .arg("apply")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Marketing Cloud SDK Plugin: Must configure plugin options.",
        ));

    assert_eq!(read(dir.path(), "ios/Podfile"), PODFILE);
}

#[test]
fn test_missing_server_url_reported_first() {
    let dir = fixture();

    mcsdk(&dir)
        .args(["--app-id", "app-id", "apply"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Must provide server url."));
}

#[test]
fn test_apply_then_rerun() {
    let dir = fixture();

    with_options(&mut mcsdk(&dir))
        .arg("apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated"));

    let podfile = read(dir.path(), "ios/Podfile");
    assert!(podfile.contains("pod 'MarketingCloudSDK'"));
    assert!(read(dir.path(), "ios/MyApp/MyApp.entitlements").contains("aps-environment"));

    with_options(&mut mcsdk(&dir))
        .arg("apply")
        .assert()
        .success()
        .stdout(predicate::str::contains("already up to date"));

    assert_eq!(read(dir.path(), "ios/Podfile"), podfile);
}

#[test]
fn test_environment_options() {
    let dir = fixture();

    mcsdk(&dir)
        .env("MCSDK_SERVER_URL", "https://mc.example.com/")
        .env("MCSDK_APP_ID", "env-app")
        .env("MCSDK_ACCESS_TOKEN", "token")
        .env("MCSDK_MODE", "production")
        .args(["apply", "--platform", "ios"])
        .assert()
        .success();

    assert!(read(dir.path(), "ios/MyApp/AppDelegate.mm").contains("@\"env-app\""));
    assert!(read(dir.path(), "ios/MyApp/MyApp.entitlements").contains("<string>production</string>"));
    assert_eq!(read(dir.path(), "android/build.gradle"), PROJECT_GRADLE);
}

#[test]
fn test_config_file_options() {
    let dir = fixture();
    write(
        dir.path(),
        "mcsdk.toml",
        "[plugin]\nserverUrl = \"https://mc.example.com/\"\nappId = \"from-file\"\naccessToken = \"token\"\nanalyticsEnabled = true\n",
    );

    mcsdk(&dir)
        .args(["--app-id", "from-flag", "apply", "--platform", "android"])
        .assert()
        .success();

    let main_application = read(
        dir.path(),
        "android/app/src/main/java/com/example/app/MainApplication.java",
    );
    assert!(main_application.contains(".setApplicationId(\"from-flag\")"));
    assert!(main_application.contains(".setAnalyticsEnabled(true)"));
}

#[test]
fn test_missing_config_file_exit_code() {
    let dir = fixture();

    mcsdk(&dir)
        .args(["--config", "does-not-exist.toml", "status"])
        .assert()
        .code(3);
}

#[test]
fn test_malformed_podfile_exit_code() {
    let dir = fixture();
    write(dir.path(), "ios/Podfile", "target 'MyApp' do\nend\n");

    with_options(&mut mcsdk(&dir))
        .arg("apply")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("malformed"));

    assert_eq!(read(dir.path(), "android/build.gradle"), PROJECT_GRADLE);
}

#[test]
fn test_dry_run_json() {
    let dir = fixture();

    let output = with_options(&mut mcsdk(&dir))
        .args(["--format", "json", "apply", "--dry-run"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["outcome"]["status"], "applied");
    assert_eq!(report["changes"].as_array().unwrap().len(), 8);
    assert_eq!(read(dir.path(), "ios/Podfile"), PODFILE);
}

#[test]
fn test_json_error_report() {
    let dir = fixture();

    let output = mcsdk(&dir)
        .args(["--format", "json", "apply"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["error"]["code"], "MISSING_OPTION");
    assert_eq!(report["error"]["category"], "Validation");
}

#[test]
fn test_check_reports_pending_changes() {
    let dir = fixture();

    with_options(&mut mcsdk(&dir)).arg("check").assert().code(1);
    with_options(&mut mcsdk(&dir)).arg("apply").assert().success();
    with_options(&mut mcsdk(&dir))
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn test_status_then_clean() {
    let dir = fixture();
    with_options(&mut mcsdk(&dir)).arg("apply").assert().success();

    with_options(&mut mcsdk(&dir))
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("marketing-cloud-sdk ios/Podfile:"))
        .stderr(predicate::str::contains("(missing)").not());

    mcsdk(&dir)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("10 blocks removed"));

    assert_eq!(read(dir.path(), "ios/Podfile"), PODFILE);
    assert_eq!(read(dir.path(), "android/app/build.gradle"), APP_GRADLE);
    assert_eq!(read(dir.path(), "ios/MyApp/AppDelegate.mm"), APP_DELEGATE);
}
