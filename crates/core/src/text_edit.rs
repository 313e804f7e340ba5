//! Regex-driven whole-file substitutions
//!
//! Structural edits that cannot be expressed as a tagged insertion (protocol
//! lists, property values) go through here. Each edit requires its pattern to
//! match exactly once so that a template change surfaces as an error instead
//! of a silent no-op or a double edit.

use crate::error::{Error, Result};
use regex::{Captures, Regex, Replacer};

/// Return the single match of `pattern` in `src`
pub fn expect_single_match<'t>(src: &'t str, pattern: &Regex) -> Result<Captures<'t>> {
    let mut matches = pattern.captures_iter(src);
    match (matches.next(), matches.next()) {
        (Some(caps), None) => Ok(caps),
        (None, _) => Err(Error::pattern_mismatch(pattern.as_str(), 0)),
        (Some(_), Some(_)) => Err(Error::pattern_mismatch(
            pattern.as_str(),
            2 + matches.count(),
        )),
    }
}

/// Replace the single match of `pattern`, failing on zero or several matches
pub fn replace_exactly_once<R: Replacer>(src: &str, pattern: &Regex, replacement: R) -> Result<String> {
    expect_single_match(src, pattern)?;
    Ok(pattern.replacen(src, 1, replacement).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_replace_single_match() {
        let re = Regex::new(r"(<.*?)(>)").unwrap();
        let out = replace_exactly_once("A <B> C", &re, "$1, D$2").unwrap();
        assert_eq!(out, "A <B, D> C");
    }

    #[test]
    fn test_no_match_is_error() {
        let re = Regex::new("missing").unwrap();
        let err = replace_exactly_once("text", &re, "x").unwrap_err();

        assert_eq!(err.code, ErrorCode::PatternMismatch);
        assert!(err.message.contains("found 0 matches"));
    }

    #[test]
    fn test_multiple_matches_is_error() {
        let re = Regex::new("a").unwrap();
        let err = replace_exactly_once("a a a", &re, "b").unwrap_err();

        assert!(err.message.contains("found 3 matches"));
    }

    #[test]
    fn test_expect_single_match_returns_captures() {
        let re = Regex::new(r"key=(\w+)").unwrap();
        let caps = expect_single_match("key=value;", &re).unwrap();
        assert_eq!(&caps[1], "value");
    }
}
