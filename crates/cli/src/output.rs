//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output. Colors go through
//! `if_supports_color`, so [`set_color`] and non-terminal streams disable them.

use mcsdk_core::Error;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

/// Output format selected with `--format`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// One JSON document on stdout
    Json,
}

/// Force colors off, or leave detection to the terminal
pub fn set_color(enabled: bool) {
    if enabled {
        owo_colors::unset_override();
    } else {
        owo_colors::set_override(false);
    }
}

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!(
            "{} {}",
            "✓".if_supports_color(Stream::Stdout, |t| t.green()),
            message
        );
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!(
            "{} {}",
            "✗".if_supports_color(Stream::Stderr, |t| t.red()),
            message
        );
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!(
            "{} {}",
            "⚠".if_supports_color(Stream::Stderr, |t| t.yellow()),
            message
        );
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!(
            "{} {}",
            "ℹ".if_supports_color(Stream::Stdout, |t| t.blue()),
            message
        );
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.if_supports_color(Stream::Stdout, |t| t.bold()));
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Print a unified diff, coloring added and removed lines
pub fn print_diff(diff: &str) {
    for line in diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.if_supports_color(Stream::Stdout, |t| t.bold()));
        } else if line.starts_with('+') {
            println!("{}", line.if_supports_color(Stream::Stdout, |t| t.green()));
        } else if line.starts_with('-') {
            println!("{}", line.if_supports_color(Stream::Stdout, |t| t.red()));
        } else if line.starts_with("@@") {
            println!("{}", line.if_supports_color(Stream::Stdout, |t| t.cyan()));
        } else {
            println!("{}", line);
        }
    }
}

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render a failed pass in the selected format
pub fn print_error(error: &Error, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let report = serde_json::json!({ "error": error.to_report() });
            println!("{}", report);
        }
        OutputFormat::Text => {
            Status::error(&format!("{} {}", error.code, error.message));
            if let Some(context) = &error.context {
                eprintln!("  {} {}", "context:".if_supports_color(Stream::Stderr, |t| t.dimmed()), context);
            }
            if let Some(suggestion) = &error.suggestion {
                eprintln!("  {} {}", "hint:".if_supports_color(Stream::Stderr, |t| t.cyan()), suggestion);
            }
        }
    }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
