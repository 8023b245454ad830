//! Scripted analyses behind the HTTP endpoints.
//!
//! A playbook is an opening question plus the follow-up questions asked after
//! each tool result, run on a fresh session.

use crate::application::agent::AgentRequest;
use crate::domain::SessionId;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Playbook {
    Trending { niche: String },
    Content { prompt: String },
    Performance { video_url: String },
    Video { video_id: String, video_data: Value },
}

impl Playbook {
    pub fn session_prefix(&self) -> &'static str {
        match self {
            Playbook::Trending { .. } => "trending",
            Playbook::Content { .. } => "content",
            Playbook::Performance { .. } => "performance",
            Playbook::Video { .. } => "video",
        }
    }

    pub fn opening_prompt(&self) -> String {
        match self {
            Playbook::Trending { niche } => format!(
                "I want to analyze trending YouTube videos in the {niche} niche. What insights can you \
                 provide about current trends, and what kind of content is performing well in this area? \
                 Use the youtube_scraper tool with the parameter 'niche' (not 'keyword')."
            ),
            Playbook::Content { prompt } => format!(
                "I need help generating video content ideas for: {prompt}. Can you suggest video ideas, \
                 script outlines, and thumbnail concepts? When using the content_generator tool, use the \
                 parameter name 'prompt' for the input."
            ),
            Playbook::Performance { video_url } => format!(
                "I want to analyze the performance of this YouTube video: {video_url}.\n\
                 What insights can you provide about its performance, and how can I improve it?\n\
                 \n\
                 IMPORTANT FORMATTING INSTRUCTIONS:\n\
                 When using the performance_tracker tool, follow this EXACT format:\n\
                 TOOL: performance_tracker\n\
                 PARAMS: {{\"video_url\": \"{video_url}\"}}\n\
                 \n\
                 Do not add any extra quotes or formatting to the URL.\n"
            ),
            Playbook::Video {
                video_id,
                video_data,
            } => format!(
                "I want to analyze this YouTube video with ID {video_id} and the following data: \
                 {video_data}. What insights can you provide about this video's performance, SEO, \
                 and content quality?"
            ),
        }
    }

    pub fn follow_ups(&self) -> [String; 2] {
        match self {
            Playbook::Trending { niche } => [
                format!(
                    "Based on the trending analysis for {niche}, what specific insights can you provide \
                     about the most successful videos? What patterns do you see in titles, descriptions, \
                     and keywords?"
                ),
                format!(
                    "Based on all the data gathered about {niche} trending videos, what are your final \
                     recommendations for creating successful content in this niche?"
                ),
            ],
            Playbook::Content { prompt } => [
                format!(
                    "Based on the content ideas generated, can you provide more detailed script \
                     suggestions and SEO optimization tips for: {prompt}?"
                ),
                format!(
                    "Based on all the data and suggestions, what's the final optimized content plan for \
                     my video about: {prompt}?"
                ),
            ],
            Playbook::Performance { .. } => [
                "Based on the performance data, what specific improvements would you recommend for this \
                 video? What patterns do you see in audience retention and engagement?"
                    .to_string(),
                "Based on all the performance data analyzed, what are your final recommendations for \
                 improving this video and creating better content in the future?"
                    .to_string(),
            ],
            Playbook::Video { .. } => [
                "Based on the video analysis, what specific improvements would you recommend for this \
                 video? How can the title, description, and content be optimized?"
                    .to_string(),
                "Based on all the analysis, what are your final recommendations for improving this \
                 video and creating better content in the future?"
                    .to_string(),
            ],
        }
    }

    /// Request on a newly generated `<prefix>_<uuid>` session.
    pub fn into_request(self) -> AgentRequest {
        let session = SessionId::generate(self.session_prefix());
        AgentRequest::new(session, self.opening_prompt()).with_follow_ups(self.follow_ups())
    }
}
