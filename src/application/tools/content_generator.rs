use crate::application::tooling::{ParamKind, ParamSpec, Tool, ToolFailure, decode_params};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::info;

pub struct ContentGenerator;

#[derive(Debug, Deserialize)]
struct Input {
    prompt: String,
    #[serde(default)]
    trending_data: Option<Value>,
}

const SCRIPT_TEMPLATE: &str = "INTRO:\n\
Hook viewers with a surprising stat or question\n\
Teaser of what they'll learn\n\
\n\
MAIN CONTENT:\n\
Point 1: Problem statement\n\
Point 2: Solution overview\n\
Point 3-5: Detailed steps\n\
\n\
CONCLUSION:\n\
Summary of benefits\n\
Call to action\n\
Teaser for next video";

#[async_trait]
impl Tool for ContentGenerator {
    fn name(&self) -> &str {
        "content_generator"
    }

    fn description(&self) -> &str {
        "Generates video script ideas and thumbnails based on trending topics"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("prompt", ParamKind::Text, "What the video should be about"),
            ParamSpec::optional(
                "trending_data",
                ParamKind::Object,
                "Output of youtube_scraper to ground the ideas",
            ),
        ]
    }

    async fn invoke(&self, params: Map<String, Value>) -> Result<Value, ToolFailure> {
        let Input {
            prompt,
            trending_data,
        } = decode_params(params)?;
        if prompt.trim().is_empty() {
            return Err(ToolFailure::InvalidInput("prompt cannot be empty".into()));
        }
        info!(
            prompt = %prompt,
            with_trending = trending_data.is_some(),
            "Generating content ideas"
        );

        Ok(json!({
            "video_ideas": [
                {
                    "title": "7 Incredible Ways to Master Your Craft This Year",
                    "hook": "Did you know 80% of experts use this one technique?",
                    "outline": [
                        "Introduction (0:00-1:30)",
                        "Common mistakes to avoid (1:30-4:00)",
                        "The 7 techniques, explained (4:00-12:00)",
                        "Implementation steps (12:00-15:00)",
                        "Results you can expect (15:00-17:00)",
                        "Call to action (17:00-18:00)",
                    ]
                },
                {
                    "title": "The Ultimate Beginner's Guide That Experts Don't Want You To See",
                    "hook": "This simple approach changed everything for me...",
                    "outline": [
                        "My story and struggle (0:00-2:30)",
                        "The breakthrough moment (2:30-4:00)",
                        "Step-by-step methodology (4:00-10:00)",
                        "Avoiding common pitfalls (10:00-13:00)",
                        "Advanced tips for faster results (13:00-16:00)",
                        "Next steps and resources (16:00-18:00)",
                    ]
                }
            ],
            "thumbnail_ideas": [
                "Bold text overlay with shocked face reaction and contrasting colors",
                "Before/after split screen with progress metrics clearly visible",
                "Question headline with arrow pointing to visual result",
            ],
            "script_template": SCRIPT_TEMPLATE,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trending_data_is_optional() {
        let mut params = Map::new();
        params.insert("prompt".into(), json!("budget travel vlogs"));
        let output = ContentGenerator.invoke(params).await.expect("ideas");
        assert_eq!(output["video_ideas"].as_array().map(Vec::len), Some(2));
        assert_eq!(output["thumbnail_ideas"].as_array().map(Vec::len), Some(3));
        assert!(output["script_template"].as_str().unwrap().starts_with("INTRO:\n"));
    }

    #[tokio::test]
    async fn prompt_is_required() {
        let mut params = Map::new();
        params.insert("trending_data".into(), json!({"trending_videos": []}));
        let err = ContentGenerator.invoke(params).await.expect_err("missing prompt");
        assert!(err.to_string().contains("prompt"));
    }
}
