//! Tool directives embedded in free-text model replies.
//!
//! Expected shape, produced by the model:
//!
//! ```text
//! TOOL: performance_tracker
//! PARAMS: {"video_url": "https://www.youtube.com/watch?v=abc"}
//! ```
//!
//! Model output is treated as untrusted text. Recovery runs a strict decode
//! first, then narrower fallbacks; see [`RecoveryStage`].

use super::repair::{self, RepairRule};
use crate::application::tooling::ToolRegistry;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DIRECTIVE_MARKER: &str = "TOOL:";

static DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)TOOL:[ \t]*[`"'*]*([A-Za-z_][A-Za-z0-9_\-]*)[`"'*]*\s*PARAMS:[ \t]*(\{.*\})"#,
    )
    .expect("directive pattern")
});

/// Tool name plus the parameter block exactly as the model wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub tool_name: String,
    pub raw_parameters: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "rule", rename_all = "snake_case")]
pub enum RecoveryStage {
    StrictDecode,
    UrlIsolation,
    Repair(RepairRule),
    UrlFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDirective {
    pub tool_name: String,
    pub parameters: Map<String, Value>,
    pub recovered_by: RecoveryStage,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("reply contains {DIRECTIVE_MARKER} but no tool name and parameter block")]
    Malformed,
    #[error("parameters for tool '{tool}' could not be recovered from {raw:?}")]
    Unparsable { tool: String, raw: String },
}

pub struct DirectiveParser {
    registry: Arc<ToolRegistry>,
}

impl DirectiveParser {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Detection and extraction. `Ok(None)` means the reply is a final answer.
    pub fn extract(reply: &str) -> Result<Option<Directive>, DirectiveError> {
        if !reply.contains(DIRECTIVE_MARKER) {
            return Ok(None);
        }
        let captures = DIRECTIVE_RE
            .captures(reply)
            .ok_or(DirectiveError::Malformed)?;
        match (captures.get(1), captures.get(2)) {
            (Some(name), Some(params)) => Ok(Some(Directive {
                tool_name: name.as_str().to_string(),
                raw_parameters: balanced_block(params.as_str())
                    .unwrap_or(params.as_str())
                    .to_string(),
            })),
            _ => Err(DirectiveError::Malformed),
        }
    }

    pub fn parse(&self, reply: &str) -> Result<Option<ParsedDirective>, DirectiveError> {
        match Self::extract(reply)? {
            Some(directive) => self.recover(directive).map(Some),
            None => Ok(None),
        }
    }

    pub fn recover(&self, directive: Directive) -> Result<ParsedDirective, DirectiveError> {
        let Directive {
            tool_name,
            raw_parameters: raw,
        } = directive;
        debug!(tool = %tool_name, raw = %raw, "Recovering directive parameters");
        let url_param = self.registry.url_parameter(&tool_name);

        let finish = |mut parameters: Map<String, Value>, stage: RecoveryStage| {
            if let Some(param) = url_param.as_deref() {
                unwrap_url_value(&mut parameters, param);
            }
            info!(tool = %tool_name, stage = ?stage, "Directive parameters recovered");
            ParsedDirective {
                tool_name: tool_name.clone(),
                parameters,
                recovered_by: stage,
            }
        };

        if let Some(parameters) = repair::decode_object(&raw) {
            return Ok(finish(parameters, RecoveryStage::StrictDecode));
        }

        if let Some(param) = url_param.as_deref().filter(|param| raw.contains(param)) {
            if let Some(url) = repair::isolate_url(&raw) {
                return Ok(finish(single(param, url), RecoveryStage::UrlIsolation));
            }
        }

        for rule in RepairRule::ORDER {
            let text = rule.apply(&raw);
            if let Some(parameters) = repair::decode_object(&text) {
                debug!(tool = %tool_name, cleaned = %text, "Repaired parameter block");
                return Ok(finish(parameters, RecoveryStage::Repair(rule)));
            }
        }

        let mut text = raw.clone();
        for rule in RepairRule::ORDER {
            text = rule.apply(&text);
            if let Some(parameters) = repair::decode_object(&text) {
                debug!(tool = %tool_name, cleaned = %text, "Repaired parameter block");
                return Ok(finish(parameters, RecoveryStage::Repair(rule)));
            }
        }

        if let (Some(key), Some(url)) = (repair::url_bearing_key(&raw), repair::isolate_url(&raw)) {
            return Ok(finish(single(&key, url), RecoveryStage::UrlFallback));
        }

        warn!(tool = %tool_name, raw = %raw, "Directive parameters are unparsable");
        Err(DirectiveError::Unparsable {
            tool: tool_name,
            raw,
        })
    }
}

/// Prefix of `text` up to the brace closing its opening `{`, skipping braces
/// inside double-quoted strings. `None` when the braces never balance.
fn balanced_block(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn single(key: &str, url: String) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), Value::String(url));
    map
}

/// Strips quote noise that survived decoding, e.g. `"\"https://…\""`.
fn unwrap_url_value(parameters: &mut Map<String, Value>, param: &str) {
    let Some(Value::String(current)) = parameters.get(param) else {
        return;
    };
    let noisy = current.contains(['"', '\'', '\\']) || current.trim() != current;
    if !noisy {
        return;
    }
    if let Some(url) = repair::isolate_url(current) {
        parameters.insert(param.to_string(), Value::String(url));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parser() -> DirectiveParser {
        DirectiveParser::new(Arc::new(ToolRegistry::with_default_tools()))
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn replies_without_marker_carry_no_directive() {
        assert_eq!(parser().parse("Here are three ideas for your channel.").unwrap(), None);
    }

    #[test]
    fn marker_without_block_is_malformed() {
        let err = parser().parse("I would use TOOL: but I am not sure.").unwrap_err();
        assert_eq!(err, DirectiveError::Malformed);
    }

    #[test]
    fn extraction_tolerates_whitespace_and_decorated_names() {
        let directive = DirectiveParser::extract(
            "Let me check.\r\nTOOL:  `youtube_scraper`  \r\n\r\n  PARAMS:   {\"niche\": \"chess\"}\n\n",
        )
        .unwrap()
        .expect("directive");
        assert_eq!(directive.tool_name, "youtube_scraper");
        assert_eq!(directive.raw_parameters, "{\"niche\": \"chess\"}");
    }

    #[test]
    fn prose_after_the_block_is_not_part_of_it() {
        let reply = "TOOL: youtube_scraper\nPARAMS: {\"niche\": \"chess {openings}\"}\n\nI'll summarize the {results} next.";
        let directive = DirectiveParser::extract(reply).unwrap().expect("directive");
        assert_eq!(directive.raw_parameters, r#"{"niche": "chess {openings}"}"#);

        let parsed = parser().parse(reply).unwrap().expect("directive");
        assert_eq!(parsed.parameters, object(json!({"niche": "chess {openings}"})));
        assert_eq!(parsed.recovered_by, RecoveryStage::StrictDecode);
    }

    #[test]
    fn unbalanced_blocks_fall_back_to_the_widest_match() {
        let reply = "TOOL: youtube_scraper\nPARAMS: {\"niche\": \"chess}";
        let directive = DirectiveParser::extract(reply).unwrap().expect("directive");
        assert_eq!(directive.raw_parameters, "{\"niche\": \"chess}");
    }

    #[test]
    fn apostrophes_survive_bare_key_repair() {
        let reply = "TOOL: content_generator\nPARAMS: {prompt: \"Don't quit vlogs\"}";
        let parsed = parser().parse(reply).unwrap().expect("directive");
        assert_eq!(parsed.parameters, object(json!({"prompt": "Don't quit vlogs"})));
        assert_eq!(parsed.recovered_by, RecoveryStage::Repair(RepairRule::BareKeys));
    }

    #[test]
    fn well_formed_json_matches_direct_decoding() {
        let blocks = [
            r#"{"niche": "fitness"}"#,
            r#"{"prompt": "vlog ideas", "trending_data": {"videos": [1, 2, {"a": null}]}}"#,
            r#"{"content": {"title": "Don't stop", "description": "a: b, c"}}"#,
            r#"{}"#,
        ];
        for block in blocks {
            let reply = format!("TOOL: content_generator\nPARAMS: {block}");
            let parsed = parser().parse(&reply).unwrap().expect("directive");
            let direct: Value = serde_json::from_str(block).expect("valid json");
            assert_eq!(Value::Object(parsed.parameters), direct);
            assert_eq!(parsed.recovered_by, RecoveryStage::StrictDecode);
        }
    }

    #[test]
    fn double_wrapped_scheme_is_recovered() {
        let reply = "TOOL: performance_tracker\nPARAMS: {\"video_url\": \"\"https\"://example.com/watch?v=abc\"}";
        let parsed = parser().parse(reply).unwrap().expect("directive");
        assert_eq!(
            parsed.parameters,
            object(json!({"video_url": "https://example.com/watch?v=abc"}))
        );
        assert_eq!(parsed.recovered_by, RecoveryStage::UrlIsolation);
    }

    #[test]
    fn extra_wrapping_quotes_around_urls_are_removed() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42";
        for count in 1..=3 {
            for quote in ['"', '\''] {
                let extra = quote.to_string().repeat(count);
                let reply = format!(
                    "TOOL: performance_tracker\nPARAMS: {{\"video_url\": \"{extra}{url}{extra}\"}}"
                );
                let parsed = parser().parse(&reply).unwrap().expect("directive");
                assert_eq!(
                    parsed.parameters.get("video_url"),
                    Some(&Value::String(url.to_string())),
                    "{reply}"
                );
            }
        }
    }

    #[test]
    fn single_quoted_blocks_are_repaired() {
        let reply = "TOOL: youtube_scraper\nPARAMS: {'niche': 'home brewing'}";
        let parsed = parser().parse(reply).unwrap().expect("directive");
        assert_eq!(parsed.parameters, object(json!({"niche": "home brewing"})));
        assert_eq!(parsed.recovered_by, RecoveryStage::Repair(RepairRule::QuoteStyle));
    }

    #[test]
    fn bare_keys_are_repaired() {
        let reply = "TOOL: content_generator\nPARAMS: {prompt: 'desk setups', trending_data: {views: 10}}";
        let parsed = parser().parse(reply).unwrap().expect("directive");
        assert_eq!(
            parsed.parameters,
            object(json!({"prompt": "desk setups", "trending_data": {"views": 10}}))
        );
        assert_eq!(parsed.recovered_by, RecoveryStage::Repair(RepairRule::BareKeys));
    }

    #[test]
    fn url_fallback_applies_to_tools_without_url_schema() {
        let reply = "TOOL: mystery_tool\nPARAMS: {\"video_url\": \"https://youtu.be/xyz\", broken}";
        let parsed = parser().parse(reply).unwrap().expect("directive");
        assert_eq!(parsed.tool_name, "mystery_tool");
        assert_eq!(
            parsed.parameters,
            object(json!({"video_url": "https://youtu.be/xyz"}))
        );
        assert_eq!(parsed.recovered_by, RecoveryStage::UrlFallback);
    }

    #[test]
    fn escaped_quotes_inside_valid_json_are_unwrapped() {
        let reply = r#"TOOL: performance_tracker
PARAMS: {"video_url": "\"https://youtu.be/xyz\""}"#;
        let parsed = parser().parse(reply).unwrap().expect("directive");
        assert_eq!(
            parsed.parameters,
            object(json!({"video_url": "https://youtu.be/xyz"}))
        );
    }

    #[test]
    fn hopeless_blocks_are_unparsable() {
        let reply = "TOOL: youtube_scraper\nPARAMS: {niche = fitness; sort = views}";
        let err = parser().parse(reply).unwrap_err();
        assert!(matches!(err, DirectiveError::Unparsable { ref tool, .. } if tool == "youtube_scraper"));
    }
}
