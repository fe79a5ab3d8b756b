use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// One feed entry after normalization, before rendering.
///
/// `guid` is the entry's own id when the feed supplies one, else its link;
/// entries with neither never make it out of the parser.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub guid: String,
    pub title: String,
    pub summary: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
}

/// A fully rendered item ready to be serialized into a category document.
#[derive(Debug, Clone)]
pub struct RenderedItem {
    pub title: String,
    pub link: String,
    pub guid: String,
    pub pub_date: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub feeds_path: PathBuf,
    pub state_path: PathBuf,
    pub out_dir: PathBuf,
    pub max_items_per_feed: usize,
    pub max_seen: usize,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            feeds_path: PathBuf::from("feeds.txt"),
            state_path: PathBuf::from("state.json"),
            out_dir: PathBuf::from("public"),
            max_items_per_feed: 5,
            max_seen: 2000,
            user_agent: "rss-summarizer/0.1".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("feed parse error: {0}")]
    Parse(String),

    #[error("feed list not found: {path}")]
    FeedListMissing { path: PathBuf },

    #[error("corrupt state file {path}: {source}")]
    CorruptState {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("summarizer error: {0}")]
    Summarize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
