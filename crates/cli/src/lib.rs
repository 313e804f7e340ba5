//! Terminal output for the Marketing Cloud SDK prebuild tools
//!
//! Provides shared CLI functionality:
//! - Status messages and colored diffs
//! - Text or JSON output selection
//! - Error rendering

#![warn(missing_docs)]

pub mod output;
