//! Flatten a raw email body into a single line of plain text.
//!
//! CBRE dispatches arrive as HTML, often still quoted-printable encoded by
//! the time the collector hands them over. Every extractor runs on the
//! output of [`normalize`], so label/value pairs that were split across
//! `<P>` and `<FONT>` tags end up adjacent with single spaces between them.

use std::sync::LazyLock;

use regex::Regex;

static RE_SOFT_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"=\r?\n").unwrap());

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Quoted-printable escapes seen in CBRE mail, decoded in this order.
const QP_ESCAPES: &[(&str, &str)] = &[("=3D", "="), ("=20", " "), ("=2F", "/"), ("=2C", ",")];

/// Normalize a raw body.
///
/// Steps, in order (later steps rely on earlier ones):
/// 1. Drop quoted-printable soft line breaks (`=` + LF or CRLF)
/// 2. Decode `=3D`, `=20`, `=2F`, `=2C`
/// 3. Replace every HTML tag with a space
/// 4. Decode `&nbsp;` and `&amp;`
/// 5. Collapse whitespace runs to one space and trim
///
/// Never fails; an empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut text = RE_SOFT_BREAK.replace_all(raw, "").into_owned();

    for (escape, decoded) in QP_ESCAPES {
        text = text.replace(escape, decoded);
    }

    text = RE_TAG.replace_all(&text, " ").into_owned();

    text = text.replace("&nbsp;", " ");
    text = text.replace("&amp;", "&");

    RE_WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Collapse whitespace in an already-extracted fragment.
pub(crate) fn squash(fragment: &str) -> String {
    RE_WHITESPACE.replace_all(fragment, " ").trim().to_string()
}

/// Truncate to at most `limit` characters, respecting char boundaries.
pub(crate) fn truncate_chars(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \r\n\t "), "");
    }

    #[test]
    fn test_qp_escapes_without_html() {
        assert_eq!(normalize("=3D=20=2F"), "= /");
    }

    #[test]
    fn test_qp_comma() {
        assert_eq!(normalize("US=2C SC=2C West Columbia"), "US, SC, West Columbia");
    }

    #[test]
    fn test_soft_line_breaks_joined() {
        let raw = "Problem Descrip=\r\ntion: Faulty out=\nlet";
        assert_eq!(normalize(raw), "Problem Description: Faulty outlet");
    }

    #[test]
    fn test_soft_break_removed_before_escape_decoding() {
        // "=3D" split by a soft break must still decode
        assert_eq!(normalize("a=3=\nD b"), "a= b");
    }

    #[test]
    fn test_html_stripped_to_spaces() {
        let raw = "<P><FONT face=3D\"Calibri\">Building: SCCAE</FONT></P><P>Floor: All</P>";
        assert_eq!(normalize(raw), "Building: SCCAE Floor: All");
    }

    #[test]
    fn test_entities() {
        assert_eq!(normalize("Tom&nbsp;&amp;&nbsp;Jerry"), "Tom & Jerry");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(
            normalize("  Date Entered: Jan  5 2026  2:48PM \n\n "),
            "Date Entered: Jan 5 2026 2:48PM"
        );
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_squash() {
        assert_eq!(squash("  a \n  b  "), "a b");
    }
}
