use crate::types::{PipelineError, RawEntry, Result};
use feed_rs::parser;
use tracing::{debug, info};

/// Parses a fetched feed document and normalizes its entries into
/// `RawEntry` values, bounded to the first `max_items` in feed order.
pub struct FeedParser {
    max_items: usize,
}

impl FeedParser {
    pub fn new(max_items: usize) -> Self {
        Self { max_items }
    }

    pub fn parse(&self, content: &str) -> Result<Vec<RawEntry>> {
        // feed-rs backfills missing entry ids through its id generator; the
        // default one synthesizes a hash of links+title, which would hide
        // guid-less entries from the id-else-link precedence below. Supply
        // the entry's own link instead (or nothing, so the entry is dropped).
        let feed = parser::Builder::new()
            .id_generator(|links, _title, _uri| {
                links.first().map(|l| l.href.clone()).unwrap_or_default()
            })
            .build()
            .parse(content.as_bytes())
            .map_err(|e| PipelineError::Parse(format!("Failed to parse feed: {}", e)))?;

        let entries: Vec<RawEntry> = feed
            .entries
            .into_iter()
            .take(self.max_items)
            .filter_map(normalize)
            .collect();

        info!("Parsed feed with {} usable entries", entries.len());
        Ok(entries)
    }
}

/// Normalization with explicit precedence: guid is the entry id if present,
/// else the link; summary is the feed summary, else the content body.
/// An entry with neither id nor link has no stable identity and is dropped.
fn normalize(entry: feed_rs::model::Entry) -> Option<RawEntry> {
    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default();

    let guid = if !entry.id.is_empty() {
        entry.id.clone()
    } else {
        link.clone()
    };
    if guid.is_empty() {
        debug!("Skipping entry with neither id nor link");
        return None;
    }

    let title = entry
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| "(no title)".to_string());

    let summary = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();

    Some(RawEntry {
        guid,
        title,
        summary,
        link,
        published: entry.published,
    })
}
