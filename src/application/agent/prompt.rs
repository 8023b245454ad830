//! Prompt text sent to the model each round.
//!
//! The whole transcript is rebuilt every round, so prompt size grows with the
//! session.

use crate::application::tooling::ToolRegistry;
use crate::domain::Turn;

const DIRECTIVE_INSTRUCTIONS: &str = "If you need to use a tool, respond with:\n\
TOOL: <tool_name>\n\
PARAMS: {\"param1\": \"value1\", \"param2\": \"value2\"}\n\
\n\
Use exactly one tool per reply and write PARAMS as a JSON object.\n\
Otherwise respond directly to the user.";

pub fn build_prompt(registry: &ToolRegistry, transcript: &[Turn]) -> String {
    let mut prompt = String::from("You have access to the following tools:\n");
    for descriptor in registry.descriptors() {
        let params = descriptor
            .parameters
            .iter()
            .map(|param| {
                let optional = if param.required { "" } else { "?" };
                format!("{}{optional}", param.name)
            })
            .collect::<Vec<_>>()
            .join(", ");
        prompt.push_str(&format!(
            "- {}({params}): {}\n",
            descriptor.name, descriptor.description
        ));
    }
    prompt.push('\n');

    for turn in transcript {
        prompt.push_str(turn.role.prompt_label());
        prompt.push_str(": ");
        prompt.push_str(&turn.text);
        prompt.push_str("\n\n");
    }

    prompt.push_str(DIRECTIVE_INSTRUCTIONS);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_tools_then_transcript_then_instructions() {
        let registry = ToolRegistry::with_default_tools();
        let transcript = vec![
            Turn::user("What is trending in chess?"),
            Turn::assistant("TOOL: youtube_scraper\nPARAMS: {\"niche\": \"chess\"}"),
            Turn::tool_result("{\"status\":\"success\"}"),
        ];
        let prompt = build_prompt(&registry, &transcript);

        let tools = prompt.find("- youtube_scraper(niche):").expect("tool line");
        let generator = prompt
            .find("- content_generator(prompt, trending_data?):")
            .expect("optional param marked");
        let user = prompt.find("USER: What is trending").expect("user turn");
        let result = prompt.find("TOOL_RESULT: {").expect("tool result turn");
        let instructions = prompt.rfind("If you need to use a tool").expect("instructions");
        assert!(tools < generator && generator < user && user < result && result < instructions);
        assert!(prompt.ends_with("Otherwise respond directly to the user."));
    }
}
