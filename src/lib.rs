pub mod categories;
pub mod fetcher;
pub mod language;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod state;
pub mod summarizer;
pub mod types;

pub use categories::{Category, FeedList};
pub use fetcher::{FetchFeed, Fetcher};
pub use parser::FeedParser;
pub use pipeline::{Pipeline, RunReport};
pub use state::SeenSet;
pub use summarizer::{OpenAiSummarizer, Summarize};
pub use types::*;
