//! Entitlements property list edits
//!
//! Only string values at the root dictionary are written; the rest of the
//! document is preserved byte for byte.

use mcsdk_core::error::{Error, Result};
use mcsdk_core::options::MarketingCloudSdkProps;
use mcsdk_core::session::ModSession;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Key controlling the APNs environment
pub const APS_ENVIRONMENT: &str = "aps-environment";

/// Content used when the entitlements file does not exist yet
pub const EMPTY_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict/>
</plist>
"#;

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

static ROOT_DICT: Lazy<Regex> = Lazy::new(|| Regex::new(r"<dict\s*(/?)>").unwrap());

static STRUCTURE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(/?)(dict|array|key)\b[^>]*?(/?)>").unwrap());

static SCALAR_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(<string>[^<]*</string>|<string\s*/>|<true\s*/>|<false\s*/>|<integer>[^<]*</integer>)",
    )
    .unwrap()
});

/// Where a key sits among the root dictionary's direct children
struct RootDict {
    /// Offset of the root `</dict>`
    close: usize,
    /// Offset just past `</key>` of the wanted key, when present at depth 0
    value_start: Option<usize>,
}

/// Walk the root dictionary body, which starts at `body`
///
/// Keys inside nested `<dict>` or `<array>` values are skipped.
fn scan_root_dict(plist: &str, body: usize, key: &str) -> Result<RootDict> {
    let mut depth = 0usize;
    let mut value_start = None;

    for caps in STRUCTURE_TAG.captures_iter(&plist[body..]) {
        let tag = caps.get(0).map_or(0..0, |m| (m.start() + body)..(m.end() + body));
        let closing = !caps[1].is_empty();
        let self_closing = !caps[3].is_empty();

        match (&caps[2], closing) {
            ("key", false) if depth == 0 && value_start.is_none() => {
                let rest = &plist[tag.end..];
                let text_len = rest
                    .find("</key>")
                    .ok_or_else(|| Error::malformed_target("Unterminated <key> in property list"))?;
                if rest[..text_len].trim() == key {
                    value_start = Some(tag.end + text_len + "</key>".len());
                }
            }
            ("key", _) => {}
            (_, false) if !self_closing => depth += 1,
            (_, false) => {}
            ("dict", true) if depth == 0 => {
                return Ok(RootDict {
                    close: tag.start,
                    value_start,
                });
            }
            (_, true) => depth = depth.saturating_sub(1),
        }
    }

    Err(Error::malformed_target("Property list root <dict> is not closed"))
}

/// Set `key` to a string `value` in the root dictionary
///
/// An existing scalar value is replaced in place; otherwise the pair is
/// appended before the root's closing `</dict>`. Nested dictionaries are
/// never touched.
pub fn set_string_key(plist: &str, key: &str, value: &str) -> Result<String> {
    let value = escape_xml(value);
    let key = escape_xml(key);
    let key_xml = format!("<key>{}</key>", key);

    let search_from = plist.find("<plist").unwrap_or(0);
    let root = ROOT_DICT
        .captures(&plist[search_from..])
        .ok_or_else(|| Error::malformed_target("Property list has no root <dict>"))?;
    let open = root.get(0).map_or(0..0, |m| (m.start() + search_from)..(m.end() + search_from));

    if !root[1].is_empty() {
        let mut out = String::with_capacity(plist.len() + 64);
        out.push_str(&plist[..open.start]);
        out.push_str(&format!(
            "<dict>\n\t{}\n\t<string>{}</string>\n</dict>",
            key_xml, value
        ));
        out.push_str(&plist[open.end..]);
        return Ok(out);
    }

    let dict = scan_root_dict(plist, open.end, &key)?;

    if let Some(value_start) = dict.value_start {
        let scalar = SCALAR_VALUE
            .captures(&plist[value_start..])
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| {
                Error::malformed_target(format!(
                    "Entitlement \"{}\" exists but does not hold a scalar value",
                    key
                ))
            })?;

        let mut out = String::with_capacity(plist.len() + value.len());
        out.push_str(&plist[..value_start + scalar.start()]);
        out.push_str(&format!("<string>{}</string>", value));
        out.push_str(&plist[value_start + scalar.end()..]);
        return Ok(out);
    }

    let pos = dict.close;
    let line_start = plist[..pos].rfind('\n').map_or(0, |i| i + 1);

    let mut out = String::with_capacity(plist.len() + 64);
    if plist[line_start..pos].trim().is_empty() {
        out.push_str(&plist[..line_start]);
        out.push_str(&format!("\t{}\n\t<string>{}</string>\n", key_xml, value));
        out.push_str(&plist[line_start..]);
    } else {
        out.push_str(&plist[..pos]);
        out.push_str(&format!("{}<string>{}</string>", key_xml, value));
        out.push_str(&plist[pos..]);
    }
    Ok(out)
}

/// Write `aps-environment` for the configured mode
pub fn with_entitlements(
    session: &mut ModSession,
    path: &Path,
    props: &MarketingCloudSdkProps,
) -> Result<bool> {
    let mode = props.mode.as_str();
    let changed = session.update_or_create(path, EMPTY_PLIST, |plist| {
        set_string_key(plist, APS_ENVIRONMENT, mode)
    })?;

    tracing::debug!(path = %path.display(), %mode, changed, "set aps-environment");
    Ok(changed)
}
