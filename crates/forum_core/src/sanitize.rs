//! Markup sanitization stage.
//!
//! # Responsibility
//! - Render script-bearing markup inert in free-text fields.
//! - Keep benign formatting markup (`<p>`, `<b>`, `<img src>`) intact.
//!
//! # Invariants
//! - Sanitization never fails; it only rewrites.
//! - Output is a fixed point: `clean(clean(x)) == clean(x)`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Marker substituted for removed constructs.
pub const REMOVED_MARKER: &str = "[removed]";

// Passes repeat until the text stops changing, at most this many times.
const MAX_PASSES: usize = 8;

const NEVER_ALLOWED_LITERALS: &[(&str, &str)] = &[
    ("document.cookie", REMOVED_MARKER),
    ("document.write", REMOVED_MARKER),
    (".parentNode", REMOVED_MARKER),
    (".innerHTML", REMOVED_MARKER),
    ("window.location", REMOVED_MARKER),
    ("-moz-binding", REMOVED_MARKER),
    ("<!--", "&lt;!--"),
    ("-->", "--&gt;"),
    ("<![CDATA[", "&lt;![CDATA["),
];

static INVISIBLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]|%0[0-8bcef]|%1[0-9a-f]")
        .expect("valid invisible regex")
});
static NEVER_ALLOWED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)javascript\s*:|vbscript\s*:|expression\s*(\(|&#40;)|Redirect\s+302")
        .expect("valid never-allowed regex")
});
static SCRIPT_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<\s*/*\s*(script|xss)\b[^>]*>").expect("valid script regex"));
static EVENT_HANDLER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<([^><]+?)([^a-z_\-]on\w*|xmlns)(\s*=\s*[^><]*)([><]*)")
        .expect("valid event handler regex")
});
static NAUGHTY_ELEMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)<(/?)(alert|applet|audio|basefont|base|behavior|bgsound|blink|body|embed|expression|form|frameset|frame|head|html|ilayer|iframe|input|isindex|layer|link|meta|object|plaintext|style|textarea|title|video|xml)\b([^>]*?)(>|$)",
    )
    .expect("valid naughty element regex")
});
static NAUGHTY_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(alert|cmd|passthru|eval|exec|expression|system|fopen|fsockopen|file|file_get_contents|readfile|unlink)\s*\(",
    )
    .expect("valid naughty call regex")
});
static OPEN_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[A-Za-z][^<>]*>").expect("valid open tag regex"));
static ATTRIBUTE_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"=(\s*)("[^"]*"|'[^']*'|[^\s"'>]+)"#).expect("valid attribute value regex")
});
static ATTRIBUTE_ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)&#(?:x([0-9a-f]+)|([0-9]+));?|&(colon|tab|newline);")
        .expect("valid attribute entity regex")
});

/// Returns `input` with unsafe markup neutralized.
pub fn clean(input: &str) -> String {
    let mut current = input.to_string();
    for _ in 0..MAX_PASSES {
        let next = single_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Sanitizes a field in place.
pub fn clean_in_place(value: &mut String) {
    let cleaned = clean(value);
    if cleaned != *value {
        *value = cleaned;
    }
}

fn single_pass(input: &str) -> String {
    let text = INVISIBLE_RE.replace_all(input, "");
    let mut text = normalize_attribute_values(&text);

    for (needle, replacement) in NEVER_ALLOWED_LITERALS {
        if text.contains(needle) {
            text = text.replace(needle, replacement);
        }
    }

    text = NEVER_ALLOWED_RE
        .replace_all(&text, REMOVED_MARKER)
        .into_owned();
    text = SCRIPT_TAG_RE.replace_all(&text, REMOVED_MARKER).into_owned();
    text = EVENT_HANDLER_RE
        .replace_all(&text, "<${1}${4}")
        .into_owned();
    text = NAUGHTY_ELEMENT_RE
        .replace_all(&text, "&lt;${1}${2}${3}&gt;")
        .into_owned();
    escape_naughty_calls(&text)
}

/// Rewrites attribute values the way a browser reads URLs: references that
/// decode to letters, digits, `:` or URL whitespace are decoded, then tabs
/// and line breaks are dropped.
fn normalize_attribute_values(text: &str) -> String {
    OPEN_TAG_RE
        .replace_all(text, |tag: &Captures<'_>| {
            ATTRIBUTE_VALUE_RE
                .replace_all(&tag[0], |attribute: &Captures<'_>| {
                    let decoded =
                        ATTRIBUTE_ENTITY_RE.replace_all(&attribute[2], decode_attribute_entity);
                    let value: String = decoded
                        .chars()
                        .filter(|&ch| !matches!(ch, '\t' | '\n' | '\r'))
                        .collect();
                    format!("={}{}", &attribute[1], value)
                })
                .into_owned()
        })
        .into_owned()
}

// References to any other character stay encoded.
fn decode_attribute_entity(entity: &Captures<'_>) -> String {
    let decoded = if let Some(hex) = entity.get(1) {
        u32::from_str_radix(hex.as_str(), 16)
            .ok()
            .and_then(char::from_u32)
    } else if let Some(decimal) = entity.get(2) {
        decimal.as_str().parse::<u32>().ok().and_then(char::from_u32)
    } else {
        match entity.get(3).map(|name| name.as_str().to_ascii_lowercase()).as_deref() {
            Some("colon") => Some(':'),
            Some("tab") => Some('\t'),
            Some("newline") => Some('\n'),
            _ => None,
        }
    };

    match decoded {
        Some(ch) if ch.is_ascii_alphanumeric() || matches!(ch, ':' | '\t' | '\n' | '\r') => {
            ch.to_string()
        }
        _ => entity[0].to_string(),
    }
}

/// Entity-escapes the parentheses of every naughty call in one scan, nested
/// calls included. An opening parenthesis without a closer is escaped alone.
fn escape_naughty_calls(text: &str) -> String {
    let mut escape = vec![false; text.len()];
    let mut found = false;
    for call in NAUGHTY_CALL_RE.find_iter(text) {
        escape[call.end() - 1] = true;
        found = true;
    }
    if !found {
        return text.to_string();
    }

    let mut open_parens = Vec::new();
    for (index, byte) in text.bytes().enumerate() {
        match byte {
            b'(' => open_parens.push(index),
            b')' => {
                if let Some(open) = open_parens.pop() {
                    if escape[open] {
                        escape[index] = true;
                    }
                }
            }
            _ => {}
        }
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for (index, ch) in text.char_indices() {
        match ch {
            '(' if escape[index] => escaped.push_str("&#40;"),
            ')' if escape[index] => escaped.push_str("&#41;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{clean, clean_in_place};

    #[test]
    fn script_tags_become_markers_and_calls_are_escaped() {
        assert_eq!(
            clean("<script>alert('xss');</script>"),
            "[removed]alert&#40;'xss'&#41;;[removed]"
        );
    }

    #[test]
    fn benign_markup_is_preserved() {
        let input = r#"<p>asdsadsa</p><img src="asd.jpg"><b>bold</b> <a href="/topics/1">link</a>"#;
        assert_eq!(clean(input), input);
    }

    #[test]
    fn event_handlers_are_stripped_from_tags() {
        assert_eq!(
            clean(r#"<img src="x.png" onerror="steal()">"#),
            r#"<img src="x.png">"#
        );
    }

    #[test]
    fn dangerous_urls_and_dom_access_are_removed() {
        let cleaned = clean(r#"<a href="javascript:go()">x</a> document.cookie"#);
        assert!(!cleaned.to_ascii_lowercase().contains("javascript:"));
        assert!(!cleaned.contains("document.cookie"));
        assert!(cleaned.contains("[removed]"));
    }

    #[test]
    fn naughty_elements_are_entity_escaped() {
        assert_eq!(
            clean(r#"<iframe src="evil"></iframe>"#),
            r#"&lt;iframe src="evil"&gt;&lt;/iframe&gt;"#
        );
        assert_eq!(clean("<header>ok</header>"), "<header>ok</header>");
    }

    #[test]
    fn control_characters_are_dropped() {
        assert_eq!(clean("ja\u{0}va%0bscript"), "javascript");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let nested = format!("{}1{}", "eval(".repeat(12), ")".repeat(12));
        let samples = [
            "<script>alert('xss');</script>",
            r#"<a onclick="x()" onmouseover="y()">hi</a>"#,
            "<!-- hidden --> <![CDATA[ x ]]>",
            "eval(eval(1))",
            r#"<div style="width: expression(alert(1))">"#,
            "<scr<script>ipt>alert(1)</script>",
            "plain text with (parentheses) and profile(s)",
            nested.as_str(),
            r#"<a href="&#106;avascript:alert(1)">x</a>"#,
            "<a href='a.png' title=\"&#40;x&#41;\">",
        ];
        for sample in samples {
            let once = clean(sample);
            assert_eq!(clean(&once), once, "not a fixed point for {sample:?}");
        }
    }

    #[test]
    fn clean_in_place_rewrites_only_when_needed() {
        let mut value = "<xss>".to_string();
        clean_in_place(&mut value);
        assert_eq!(value, "[removed]");
    }

    #[test]
    fn deeply_nested_calls_are_escaped_in_one_pass() {
        let input = format!("{}1{}", "eval(".repeat(12), ")".repeat(12));
        let expected = format!("{}1{}", "eval&#40;".repeat(12), "&#41;".repeat(12));
        assert_eq!(clean(&input), expected);
        assert_eq!(clean("alert(1"), "alert&#40;1");
        assert_eq!(clean("eval(x) (y)"), "eval&#40;x&#41; (y)");
    }

    #[test]
    fn encoded_script_schemes_in_attributes_are_removed() {
        let neutralized = r#"<a href="[removed]alert&#40;1&#41;">x</a>"#;
        for input in [
            r#"<a href="&#106;avascript:alert(1)">x</a>"#,
            "<a href=\"java\tscript:alert(1)\">x</a>",
            r#"<a href="javascript&#58;alert(1)">x</a>"#,
            r#"<a href="&#x6A;ava&#10;script&colon;alert(1)">x</a>"#,
            "<a href='&#0000106avascript:alert(1)'>x</a>",
        ] {
            let cleaned = clean(input);
            assert!(
                !cleaned.to_ascii_lowercase().contains("script:"),
                "scheme survived in {cleaned:?}"
            );
            if input.contains('"') {
                assert_eq!(cleaned, neutralized);
            }
        }
    }

    #[test]
    fn attribute_normalization_leaves_benign_markup_alone() {
        let input = "<a href=\"/q?a=1&amp;b=2\" title=\"&quot;hi&quot;\">x</a>\n<img\nsrc=\"a.png\">";
        assert_eq!(clean(input), input);
        assert_eq!(
            clean("<a title=\"&#72;i\">x</a> &#106;avascript"),
            "<a title=\"Hi\">x</a> &#106;avascript"
        );
    }
}
