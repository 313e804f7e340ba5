//! SDK initialisation in `MainApplication`
//!
//! The imports go right after the `package` declaration and the
//! initialisation right after `super.onCreate()`. Java and Kotlin sources get
//! their own fragments.

use crate::project::Language;
use mcsdk_core::error::Result;
use mcsdk_core::generated_code::MergeSpec;
use mcsdk_core::options::MarketingCloudSdkProps;
use mcsdk_core::plugin_tag;
use mcsdk_core::session::{ModSession, PlannedMerge};
use std::path::Path;

pub const IMPORTS_TAG: &str = "imports";
pub const INITIALIZATION_TAG: &str = "initialization";

const IMPORTS: [&str; 3] = [
    "com.salesforce.marketingcloud.MarketingCloudConfig",
    "com.salesforce.marketingcloud.MarketingCloudSdk",
    "com.salesforce.marketingcloud.notifications.NotificationCustomizationOptions",
];

/// Java/Kotlin string literal for `value`
fn string_literal(value: &str, language: Language) -> Result<String> {
    let quoted = serde_json::to_string(value)?;
    Ok(match language {
        Language::Java => quoted,
        // `$` starts a string template in Kotlin
        Language::Kotlin => quoted.replace('$', "\\$"),
    })
}

pub fn imports_fragment(language: Language) -> String {
    let terminator = match language {
        Language::Java => ";",
        Language::Kotlin => "",
    };
    IMPORTS
        .iter()
        .map(|import| format!("import {}{}", import, terminator))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn initialization_fragment(props: &MarketingCloudSdkProps, language: Language) -> Result<String> {
    let app_id = string_literal(&props.app_id, language)?;
    let access_token = string_literal(&props.access_token, language)?;
    let server_url = string_literal(&props.server_url, language)?;

    Ok(match language {
        Language::Java => format!(
            "    MarketingCloudSdk.init(this, MarketingCloudConfig.builder()
        .setApplicationId({app_id})
        .setAccessToken({access_token})
        .setMarketingCloudServerUrl({server_url})
        .setAnalyticsEnabled({analytics})
        .setNotificationCustomizationOptions(NotificationCustomizationOptions.create(R.mipmap.ic_launcher))
        .build(this), initializationStatus -> {{}});",
            analytics = props.analytics_enabled,
        ),
        Language::Kotlin => format!(
            "    MarketingCloudSdk.init(
      this,
      MarketingCloudConfig.builder()
        .setApplicationId({app_id})
        .setAccessToken({access_token})
        .setMarketingCloudServerUrl({server_url})
        .setAnalyticsEnabled({analytics})
        .setNotificationCustomizationOptions(NotificationCustomizationOptions.create(R.mipmap.ic_launcher))
        .build(this)
    ) {{ _ -> }}",
            analytics = props.analytics_enabled,
        ),
    })
}

pub fn merge_plan(
    path: &Path,
    language: Language,
    props: &MarketingCloudSdkProps,
) -> Result<Vec<PlannedMerge>> {
    Ok(vec![
        PlannedMerge::new(
            path,
            MergeSpec::new(
                plugin_tag(IMPORTS_TAG),
                imports_fragment(language),
                r"^package\s+[\w.]+",
                1,
                "//",
            )?,
        ),
        PlannedMerge::new(
            path,
            MergeSpec::new(
                plugin_tag(INITIALIZATION_TAG),
                initialization_fragment(props, language)?,
                r"super\.onCreate\(\)",
                1,
                "//",
            )?,
        ),
    ])
}

/// Initialise the SDK when the application starts
pub fn with_sdk_initialization(
    session: &mut ModSession,
    path: &Path,
    language: Language,
    props: &MarketingCloudSdkProps,
) -> Result<usize> {
    let mut merged = 0;
    for planned in merge_plan(path, language, props)? {
        if session.apply(&planned)?.did_merge {
            merged += 1;
        }
    }
    tracing::debug!(path = %path.display(), merged, "main application merges");
    Ok(merged)
}
