//! litscrape: CLI downloader for Literotica stories and series, outputting plain text.

pub mod api;
pub mod cli;
pub mod config;
pub mod model;
pub mod writer;

// Re-exports for CLI and consumers.
pub use api::{
    fetch_story_info, fetch_story_text, parse_story_url, ApiClient, ApiClientBuilder, FetchError,
};
pub use model::{SeriesItem, StoryId, StoryInfo};
pub use writer::{render_template, story_path, write_story, WriteError};
