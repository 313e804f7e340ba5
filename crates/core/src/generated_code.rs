//! Anchored, tag-delimited code generation
//!
//! Inserts a fragment into an existing text file next to the first line that
//! matches an anchor pattern. The fragment is wrapped in begin/end marker
//! comments carrying its tag and a hash of its content:
//!
//! ```text
//! // @generated begin <tag> - expo prebuild (DO NOT MODIFY) sync-<sha1>
//! <fragment>
//! // @generated end <tag>
//! ```
//!
//! Re-running a merge with the same tag and fragment is a no-op. Running it
//! with the same tag and a different fragment replaces the old block.
//!
//! # Example
//!
//! ```rust
//! use mcsdk_core::generated_code::{merge_contents, MergeSpec};
//!
//! let spec = MergeSpec::new("example", "X", "^ANCHOR$", 1, "//").unwrap();
//! let first = merge_contents("a\nANCHOR\nb", &spec).unwrap();
//! let second = merge_contents(&first.contents, &spec).unwrap();
//!
//! assert!(first.did_merge);
//! assert!(!second.did_merge);
//! assert_eq!(first.contents, second.contents);
//! ```

use crate::error::{Error, Result};
use regex::Regex;
use serde::Serialize;
use sha1::{Digest, Sha1};

/// Generator label written into every begin marker.
pub const GENERATOR_LABEL: &str = "expo prebuild (DO NOT MODIFY)";

/// How marker lines are commented out in the target language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSyntax {
    prefix: String,
    suffix: Option<String>,
}

impl CommentSyntax {
    /// Line comment such as `//` or `#`
    pub fn line(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: None,
        }
    }

    /// Block comment such as `<!--` ... `-->`
    pub fn block(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            prefix: open.into(),
            suffix: Some(close.into()),
        }
    }

    /// XML / HTML comments
    pub fn xml() -> Self {
        Self::block("<!--", "-->")
    }

    /// Render `body` as a single comment line
    pub fn wrap(&self, body: &str) -> String {
        match &self.suffix {
            Some(suffix) => format!("{} {} {}", self.prefix, body, suffix),
            None => format!("{} {}", self.prefix, body),
        }
    }
}

impl From<&str> for CommentSyntax {
    fn from(prefix: &str) -> Self {
        Self::line(prefix)
    }
}

/// One tagged insertion: what to insert, where, and how to mark it
#[derive(Debug, Clone)]
pub struct MergeSpec {
    /// Unique tag delimiting the generated block
    pub tag: String,
    /// Fragment to insert (may span several lines)
    pub new_src: String,
    /// First line matching this pattern orients the insertion
    pub anchor: Regex,
    /// Signed line displacement from the anchor line
    pub offset: isize,
    /// Marker comment syntax
    pub comment: CommentSyntax,
}

impl MergeSpec {
    /// Build a spec, compiling the anchor pattern
    pub fn new(
        tag: impl Into<String>,
        new_src: impl Into<String>,
        anchor: &str,
        offset: isize,
        comment: impl Into<CommentSyntax>,
    ) -> Result<Self> {
        Ok(Self {
            tag: tag.into(),
            new_src: new_src.into(),
            anchor: Regex::new(anchor)?,
            offset,
            comment: comment.into(),
        })
    }
}

/// Location of a generated block, as inclusive line indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedBlock {
    /// Line index of the begin marker
    pub start: usize,
    /// Line index of the end marker
    pub end: usize,
    /// `sync-<sha1>` recorded in the begin marker, if readable
    pub hash: Option<String>,
}

impl GeneratedBlock {
    /// Number of fragment lines between the markers
    pub fn fragment_len(&self) -> usize {
        self.end - self.start - 1
    }
}

/// Outcome of [`merge_contents`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResults {
    /// Resulting file contents
    pub contents: String,
    /// The fragment was inserted by this call
    pub did_merge: bool,
    /// A stale block with the same tag was removed first
    pub did_clear: bool,
    /// Where the tagged block sits in `contents`
    pub block: Option<GeneratedBlock>,
}

/// Hash identifying a fragment's exact content
pub fn fragment_hash(src: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(src.as_bytes());
    format!("sync-{}", hex::encode(hasher.finalize()))
}

/// Begin marker for a fragment
pub fn create_generated_header(new_src: &str, tag: &str, comment: &CommentSyntax) -> String {
    comment.wrap(&format!(
        "@generated begin {} - {} {}",
        tag,
        GENERATOR_LABEL,
        fragment_hash(new_src)
    ))
}

/// End marker for a tag
pub fn create_generated_footer(tag: &str, comment: &CommentSyntax) -> String {
    comment.wrap(&format!("@generated end {}", tag))
}

/// Whether `line` contains `needle` as a whole marker (not a prefix of a longer tag)
fn has_marker(line: &str, needle: &str) -> bool {
    line.match_indices(needle).any(|(i, _)| {
        matches!(
            line[i + needle.len()..].chars().next(),
            None | Some(' ' | '\t' | '\r')
        )
    })
}

fn parse_hash(line: &str) -> Option<String> {
    line.split_whitespace()
        .find(|token| token.starts_with("sync-"))
        .map(String::from)
}

/// Find the first generated block for `tag`
pub fn find_generated_block(src: &str, tag: &str) -> Option<GeneratedBlock> {
    let begin = format!("@generated begin {}", tag);
    let end = format!("@generated end {}", tag);
    let lines: Vec<&str> = src.split('\n').collect();

    let start = lines.iter().position(|line| has_marker(line, &begin))?;
    let end_offset = lines[start + 1..]
        .iter()
        .position(|line| has_marker(line, &end))?;

    Some(GeneratedBlock {
        start,
        end: start + 1 + end_offset,
        hash: parse_hash(lines[start]),
    })
}

/// Remove the generated block for `tag`, leaving everything else untouched
///
/// Returns `None` when no complete block exists.
pub fn remove_generated_contents(src: &str, tag: &str) -> Option<String> {
    let block = find_generated_block(src, tag)?;
    let mut lines: Vec<&str> = src.split('\n').collect();
    lines.drain(block.start..=block.end);
    Some(lines.join("\n"))
}

/// Insert `to_add` at the first anchor match plus `offset`
///
/// Returns the new contents and the index of the first inserted line.
fn add_lines(
    content: &str,
    anchor: &Regex,
    offset: isize,
    to_add: &[String],
    tag: &str,
) -> Result<(String, usize)> {
    let mut lines: Vec<&str> = content.split('\n').collect();

    let anchor_index = lines
        .iter()
        .position(|line| anchor.is_match(line))
        .ok_or_else(|| Error::no_anchor_match(anchor.as_str(), tag))?;

    let index = anchor_index as isize + offset;
    if index < 0 || index as usize > lines.len() {
        return Err(Error::offset_out_of_range(anchor_index, offset, lines.len()));
    }
    let index = index as usize;

    lines.splice(index..index, to_add.iter().map(String::as_str));
    Ok((lines.join("\n"), index))
}

/// Merge a tagged fragment into `src`
///
/// 1. If the exact begin marker (tag + fragment hash) is present, `src` is
///    returned unchanged.
/// 2. Otherwise any stale block with the same tag is removed.
/// 3. The wrapped fragment is inserted at the anchor line index plus offset.
///
/// Fails with `NoAnchorMatch` when no line matches the anchor, or
/// `OffsetOutOfRange` when the computed index falls outside the file. On
/// failure nothing is returned, so callers cannot write a partial result.
pub fn merge_contents(src: &str, spec: &MergeSpec) -> Result<MergeResults> {
    let header = create_generated_header(&spec.new_src, &spec.tag, &spec.comment);

    if src.contains(&header) {
        tracing::debug!(tag = %spec.tag, "generated block already up to date");
        return Ok(MergeResults {
            contents: src.to_string(),
            did_merge: false,
            did_clear: false,
            block: find_generated_block(src, &spec.tag),
        });
    }

    let sanitized = remove_generated_contents(src, &spec.tag);
    let did_clear = sanitized.is_some();
    let base = sanitized.as_deref().unwrap_or(src);

    let mut to_add = Vec::with_capacity(spec.new_src.lines().count() + 2);
    to_add.push(header);
    to_add.extend(spec.new_src.split('\n').map(String::from));
    to_add.push(create_generated_footer(&spec.tag, &spec.comment));

    let (contents, start) = add_lines(base, &spec.anchor, spec.offset, &to_add, &spec.tag)?;
    let end = start + to_add.len() - 1;

    tracing::debug!(
        tag = %spec.tag,
        start,
        end,
        cleared = did_clear,
        "merged generated block"
    );

    Ok(MergeResults {
        contents,
        did_merge: true,
        did_clear,
        block: Some(GeneratedBlock {
            start,
            end,
            hash: Some(fragment_hash(&spec.new_src)),
        }),
    })
}
