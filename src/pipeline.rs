use crate::categories::FeedList;
use crate::fetcher::FetchFeed;
use crate::language::is_japanese;
use crate::output::{build_rss, format_rfc2822};
use crate::parser::FeedParser;
use crate::state::SeenSet;
use crate::summarizer::Summarize;
use crate::types::{RenderedItem, Result, RunConfig};
use chrono::Utc;
use std::fs;
use tracing::{info, warn};

/// Per-category outcome of a run.
#[derive(Debug)]
pub struct CategoryReport {
    pub slug: String,
    pub name: String,
    pub items: usize,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub categories: Vec<CategoryReport>,
    pub total_items: usize,
}

/// Sequences one full run: load state, parse categories, then per category
/// ingest/dedup/render/write, and persist the seen-set exactly once at the
/// end. An interrupted run leaves the state file untouched.
pub struct Pipeline {
    config: RunConfig,
    fetcher: Box<dyn FetchFeed>,
    summarizer: Box<dyn Summarize>,
    parser: FeedParser,
}

impl Pipeline {
    pub fn new(
        config: RunConfig,
        fetcher: Box<dyn FetchFeed>,
        summarizer: Box<dyn Summarize>,
    ) -> Self {
        let parser = FeedParser::new(config.max_items_per_feed);
        Self {
            config,
            fetcher,
            summarizer,
            parser,
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let mut seen = SeenSet::load(&self.config.state_path)?;
        let feed_list = FeedList::load(&self.config.feeds_path)?;
        fs::create_dir_all(&self.config.out_dir)?;

        let mut report = RunReport::default();

        for category in feed_list.categories() {
            info!(
                "Processing category: {} ({} feeds)",
                category.name,
                category.feeds.len()
            );

            let mut collected = Vec::new();
            for url in &category.feeds {
                match self.ingest_source(url, &mut seen).await {
                    Ok(items) => collected.extend(items),
                    Err(e) => warn!("Error processing {}: {}", url, e),
                }
            }

            // Oldest-of-this-run first in the document.
            collected.reverse();

            let document = build_rss(&collected, &category.name, Utc::now());
            let out_path = self.config.out_dir.join(format!("feed_{}.xml", category.slug));
            fs::write(&out_path, document)?;
            info!("Generated: {} ({} items)", out_path.display(), collected.len());

            report.total_items += collected.len();
            report.categories.push(CategoryReport {
                slug: category.slug.clone(),
                name: category.name.clone(),
                items: collected.len(),
            });
        }

        seen.save(&self.config.state_path, self.config.max_seen)?;
        info!("Total: {} items processed", report.total_items);
        Ok(report)
    }

    /// Fetch and render the new entries of one source. Errors returned here
    /// cover the whole source (fetch or parse); render failures are contained
    /// per entry and leave the guid unseen so the entry retries next run.
    async fn ingest_source(&self, url: &str, seen: &mut SeenSet) -> Result<Vec<RenderedItem>> {
        let content = self.fetcher.fetch(url).await?;
        let entries = self.parser.parse(&content)?;

        let mut rendered = Vec::new();
        for entry in entries {
            if seen.contains(&entry.guid) {
                continue;
            }

            let classified_text = format!("{} {}", entry.title, entry.summary);
            let summary = if is_japanese(&classified_text) {
                entry.summary.clone()
            } else {
                match self.summarizer.summarize(&entry.title, &entry.summary).await {
                    Ok(html) => html,
                    Err(e) => {
                        warn!("Skipping entry {}: {}", entry.guid, e);
                        continue;
                    }
                }
            };

            let pub_date = entry
                .published
                .map(format_rfc2822)
                .unwrap_or_else(|| format_rfc2822(Utc::now()));

            rendered.push(RenderedItem {
                title: format!("[要約] {}", entry.title),
                link: entry.link.clone(),
                guid: entry.guid.clone(),
                pub_date,
                description: format!(
                    "<p><a href='{}'>元記事を読む</a></p>{}",
                    entry.link, summary
                ),
            });
            seen.add(&entry.guid);
        }

        Ok(rendered)
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }
}

impl RunReport {
    pub fn category(&self, slug: &str) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.slug == slug)
    }
}
