//! Tolerant anchor scanning and HTML text escaping
//!
//! The scanner does not build a document tree. It looks for `<a ...>...</a>`
//! pairs anywhere in the input and ignores everything else, so stray markup,
//! unknown tags or binary noise around the anchors never abort a parse.

use regex::Regex;
use std::sync::OnceLock;

/// An anchor element as found in the input, entities already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAnchor {
    pub href: Option<String>,
    pub text: String,
}

fn anchor_regex() -> &'static Regex {
    static ANCHOR: OnceLock<Regex> = OnceLock::new();
    ANCHOR.get_or_init(|| {
        Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>")
            .unwrap_or_else(|e| panic!("Failed to compile anchor regex: {}", e))
    })
}

fn href_regex() -> &'static Regex {
    static HREF: OnceLock<Regex> = OnceLock::new();
    HREF.get_or_init(|| {
        Regex::new(r#"(?is)(?:^|\s)href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .unwrap_or_else(|e| panic!("Failed to compile href regex: {}", e))
    })
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"(?s)<[^>]*>").unwrap_or_else(|e| panic!("Failed to compile tag regex: {}", e))
    })
}

/// Find every closed anchor element in `input`, in document order.
pub fn scan_anchors(input: &str) -> Vec<RawAnchor> {
    anchor_regex()
        .captures_iter(input)
        .map(|caps| {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let inner = caps.get(2).map_or("", |m| m.as_str());

            let href = href_regex().captures(attrs).and_then(|h| {
                h.get(1)
                    .or_else(|| h.get(2))
                    .or_else(|| h.get(3))
                    .map(|m| unescape(m.as_str().trim()))
            });

            let stripped = tag_regex().replace_all(inner, "");
            let text = unescape(&stripped)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");

            RawAnchor { href, text }
        })
        .collect()
}

/// Escape text for use in element content or a double-quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode named and numeric character references.
///
/// Unknown or malformed references are kept verbatim.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// Decode `%XX` escapes in a URL path segment.
///
/// Returns the input unchanged if the decoded bytes are not valid UTF-8.
/// `+` is left alone; it is a literal character in filenames.
pub fn percent_decode(segment: &str) -> String {
    if !segment.contains('%') {
        return segment.to_string();
    }

    let bytes = segment.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                decoded.push(byte);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(decoded).unwrap_or_else(|_| segment.to_string())
}
