//! Built-in content-strategy tools.
//!
//! Each tool returns fixed illustrative data shaped like the real upstream
//! services; only input validation is live.

mod content_analyzer;
mod content_generator;
mod performance_tracker;
mod youtube_scraper;

pub use content_analyzer::ContentAnalyzer;
pub use content_generator::ContentGenerator;
pub use performance_tracker::PerformanceTracker;
pub use youtube_scraper::YoutubeScraper;
