//! Typed repair rules for quasi-JSON parameter blocks.
//!
//! Callers try each rule alone on the raw block first, then cumulatively in
//! [`RepairRule::ORDER`], attempting a decode after every step and stopping at
//! the first success.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

static SCHEME_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)(https?)"+://"#).expect("scheme split pattern"));
static LEADING_QUOTES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#":(\s*)"{2,}([^",}\s])"#).expect("leading quotes pattern"));
static TRAILING_QUOTES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([^"\s:])"{2,}(\s*[,}\]])"#).expect("trailing quotes pattern"));
static BARE_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_\-]*)(\s*):").expect("bare key pattern")
});
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(https?)["'\\]*://([^\s"'\\<>{}]+)"#).expect("url pattern")
});
static URL_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)["']*([A-Za-z_][A-Za-z0-9_]*url[A-Za-z0-9_]*)["']*\s*:"#)
        .expect("url key pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairRule {
    QuoteStyle,
    WrappedQuotes,
    BareKeys,
}

impl RepairRule {
    pub const ORDER: [RepairRule; 3] = [
        RepairRule::QuoteStyle,
        RepairRule::WrappedQuotes,
        RepairRule::BareKeys,
    ];

    pub fn apply(self, text: &str) -> String {
        match self {
            RepairRule::QuoteStyle => normalize_quote_style(text),
            RepairRule::WrappedQuotes => collapse_wrapped_quotes(text),
            RepairRule::BareKeys => quote_bare_keys(text),
        }
    }
}

/// `'` delimiters become `"`. A `'` counts as a delimiter when the nearest
/// non-blank neighbour on either side is structural (`{ [ : , } ]`), another
/// quote, or the edge of the text; apostrophes inside words are kept.
pub fn normalize_quote_style(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let structural = |c: Option<&char>| match c {
        None => true,
        Some(&c) => matches!(c, '{' | '[' | ':' | ',' | '}' | ']' | '\'' | '"'),
    };
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if c != '\'' {
                return c;
            }
            let before = chars[..i].iter().rev().find(|c| !c.is_whitespace());
            let after = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if structural(before) || structural(after) {
                '"'
            } else {
                c
            }
        })
        .collect()
}

/// Collapses runs of quotes around string values, including a quote wedged
/// between a URL scheme and `://`.
pub fn collapse_wrapped_quotes(text: &str) -> String {
    let text = SCHEME_SPLIT_RE.replace_all(text, "${1}://");
    let text = LEADING_QUOTES_RE.replace_all(&text, ":${1}\"${2}");
    TRAILING_QUOTES_RE
        .replace_all(&text, "${1}\"${2}")
        .into_owned()
}

/// Quotes identifier keys that directly follow `{` or `,`.
pub fn quote_bare_keys(text: &str) -> String {
    BARE_KEY_RE
        .replace_all(text, "${1}\"${2}\"${3}:")
        .into_owned()
}

/// Decodes `text` as a JSON object; any other JSON value is rejected.
pub fn decode_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// First http(s) URL in `text`, tolerating quotes between scheme and `://`.
///
/// A URL closed by a quote is returned as written. An unquoted one loses
/// trailing sentence punctuation and unbalanced closing brackets.
pub fn isolate_url(text: &str) -> Option<String> {
    let captures = URL_RE.captures(text)?;
    let scheme = captures.get(1)?.as_str().to_ascii_lowercase();
    let body = captures.get(2)?;
    let quoted = text[body.end()..].starts_with(['"', '\'', '\\']);
    let rest = if quoted {
        body.as_str()
    } else {
        trim_prose_punctuation(body.as_str())
    };
    if rest.is_empty() {
        return None;
    }
    Some(format!("{scheme}://{rest}"))
}

fn trim_prose_punctuation(mut url: &str) -> &str {
    loop {
        let trimmed = url.trim_end_matches(['.', ',', ';', '!', '?']);
        let trimmed = match trimmed.chars().last() {
            Some(')') if unbalanced(trimmed, '(', ')') => &trimmed[..trimmed.len() - 1],
            Some(']') if unbalanced(trimmed, '[', ']') => &trimmed[..trimmed.len() - 1],
            _ => trimmed,
        };
        if trimmed.len() == url.len() {
            return url;
        }
        url = trimmed;
    }
}

fn unbalanced(text: &str, open: char, close: char) -> bool {
    text.matches(close).count() > text.matches(open).count()
}

/// First key whose name mentions `url`, quoted or not.
pub fn url_bearing_key(text: &str) -> Option<String> {
    URL_KEY_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
