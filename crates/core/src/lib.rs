//! Core library for the Marketing Cloud SDK prebuild tools
//!
//! This crate provides the pieces shared by the platform adapters:
//!
//! - **Generated code**: idempotent, tag-delimited insertion next to an anchor line
//! - **Text edits**: regex substitutions that must match exactly once
//! - **Options**: plugin options and their all-or-nothing validation
//! - **Configuration**: TOML-based configuration with defaults
//! - **Sessions**: staged whole-file edits, written only on commit
//! - **Run-once**: process-wide record of applied plugin passes
//!
//! # Example
//!
//! ```rust,no_run
//! use mcsdk_core::generated_code::MergeSpec;
//! use mcsdk_core::session::ModSession;
//!
//! let spec = MergeSpec::new(
//!     "marketing-cloud-sdk",
//!     "  pod 'MarketingCloudSDK', '~> 7.6'",
//!     "use_native_modules",
//!     0,
//!     "#",
//! )?;
//!
//! let mut session = ModSession::new("my-app");
//! session.merge("ios/Podfile", &spec)?;
//! session.commit()?;
//! # Ok::<(), mcsdk_core::Error>(())
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod generated_code;
pub mod options;
pub mod run_once;
pub mod session;
pub mod text_edit;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Scope of every plugin tag, kept stable so previously generated blocks are recognised
pub const PLUGIN_NAME: &str = "@allboatsrise/expo-marketingcloudsdk";

/// Build a scoped tag such as `@allboatsrise/expo-marketingcloudsdk(header)`
pub fn plugin_tag(name: &str) -> String {
    format!("{}({})", PLUGIN_NAME, name)
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::generated_code::{
        find_generated_block, merge_contents, remove_generated_contents, CommentSyntax,
        GeneratedBlock, MergeResults, MergeSpec,
    };
    pub use crate::options::{MarketingCloudSdkProps, Mode, PluginOptions};
    pub use crate::run_once::{Claim, PluginFingerprint, RunOnceRegistry};
    pub use crate::session::{FileChange, ModSession, PlannedMerge};
    pub use crate::{plugin_tag, PLUGIN_NAME};
}
