use crate::application::tooling::{ParamKind, ParamSpec, Tool, ToolFailure, decode_params};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::info;

pub struct YoutubeScraper;

#[derive(Debug, Deserialize)]
struct Input {
    niche: String,
}

#[async_trait]
impl Tool for YoutubeScraper {
    fn name(&self) -> &str {
        "youtube_scraper"
    }

    fn description(&self) -> &str {
        "Scrapes trending videos from YouTube based on a niche keyword"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "niche",
            ParamKind::Text,
            "Niche keyword to search trending videos for",
        )]
    }

    async fn invoke(&self, params: Map<String, Value>) -> Result<Value, ToolFailure> {
        let Input { niche } = decode_params(params)?;
        let niche = niche.trim();
        if niche.is_empty() {
            return Err(ToolFailure::InvalidInput("niche cannot be empty".into()));
        }
        info!(niche, "Collecting trending videos");
        let title = capitalize(niche);

        Ok(json!({
            "trending_videos": [
                {
                    "title": format!("Top 10 {title} Tips for Beginners"),
                    "views": "1.2M",
                    "likes": "45K",
                    "channel": format!("{title} Expert"),
                    "keywords": [niche, "beginners", "tips", "tutorial"],
                    "description": format!("Learn the best {niche} tips and tricks in this comprehensive guide."),
                },
                {
                    "title": format!("Why {title} Is Changing Everything This Year"),
                    "views": "892K",
                    "likes": "32K",
                    "channel": "TrendWatcher",
                    "keywords": [niche, "trends", "industry"],
                    "description": format!("The {niche} industry is evolving rapidly. Here's what you need to know."),
                },
                {
                    "title": format!("I Tried {title} For 30 Days - Here's What Happened"),
                    "views": "2.4M",
                    "likes": "78K",
                    "channel": "LifeExperiments",
                    "keywords": [niche, "challenge", "experiment", "journey"],
                    "description": format!("My personal journey with {niche} and the surprising results after 30 days."),
                }
            ]
        }))
    }
}

/// First letter upper-cased, the rest lower-cased.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
