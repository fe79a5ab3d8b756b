use async_trait::async_trait;
use rss_summarizer::{FetchFeed, Pipeline, PipelineError, RunConfig, Summarize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Serves canned feed documents by URL; unknown URLs fail like a dead server.
struct StubFetcher {
    feeds: HashMap<String, String>,
}

impl StubFetcher {
    fn new(feeds: Vec<(&str, String)>) -> Self {
        Self {
            feeds: feeds
                .into_iter()
                .map(|(url, body)| (url.to_string(), body))
                .collect(),
        }
    }
}

#[async_trait]
impl FetchFeed for StubFetcher {
    async fn fetch(&self, url: &str) -> rss_summarizer::Result<String> {
        self.feeds
            .get(url)
            .cloned()
            .ok_or_else(|| PipelineError::Fetch(format!("HTTP 500 for {}", url)))
    }
}

/// Records which titles were routed through the gateway.
struct MockSummarizer {
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockSummarizer {
    fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl Summarize for MockSummarizer {
    async fn summarize(&self, title: &str, _content: &str) -> rss_summarizer::Result<String> {
        self.calls.lock().unwrap().push(title.to_string());
        Ok(format!("<p><strong>一言で言うと:</strong> {}</p>", title))
    }
}

/// Always fails, like a gateway hitting its quota.
struct FailingSummarizer;

#[async_trait]
impl Summarize for FailingSummarizer {
    async fn summarize(&self, _title: &str, _content: &str) -> rss_summarizer::Result<String> {
        Err(PipelineError::Summarize("quota exceeded".to_string()))
    }
}

fn rss_feed(items: &[(&str, &str, &str, &str)]) -> String {
    // (guid, title, link, description)
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\"><channel>\
         <title>Stub</title><link>https://stub.example</link><description>stub</description>",
    );
    for (guid, title, link, description) in items {
        out.push_str(&format!(
            "<item><guid isPermaLink=\"false\">{guid}</guid><title>{title}</title>\
             <link>{link}</link><description>{description}</description>\
             <pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate></item>"
        ));
    }
    out.push_str("</channel></rss>");
    out
}

fn english_feed() -> String {
    rss_feed(&[(
        "abc",
        "New AI model released",
        "https://en.example/abc",
        "The model improves reasoning across benchmarks.",
    )])
}

fn japanese_feed() -> String {
    rss_feed(&[(
        "xyz",
        "日本語の記事",
        "https://jp.example/xyz",
        "これは日本語の要約です。",
    )])
}

fn test_config(dir: &Path) -> RunConfig {
    RunConfig {
        feeds_path: dir.join("feeds.txt"),
        state_path: dir.join("state.json"),
        out_dir: dir.join("public"),
        ..RunConfig::default()
    }
}

fn write_feed_list(config: &RunConfig, text: &str) {
    fs::write(&config.feeds_path, text).unwrap();
}

#[tokio::test]
async fn scenario_one_category_two_feeds() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write_feed_list(
        &config,
        "# ===== AI News =====\nhttps://en.example/rss\nhttps://jp.example/rss\n",
    );

    let fetcher = StubFetcher::new(vec![
        ("https://en.example/rss", english_feed()),
        ("https://jp.example/rss", japanese_feed()),
    ]);
    let (summarizer, calls) = MockSummarizer::new();
    let pipeline = Pipeline::new(config.clone(), Box::new(fetcher), Box::new(summarizer));

    let report = pipeline.run().await.unwrap();
    assert_eq!(report.total_items, 2);
    assert_eq!(report.category("ai_news").unwrap().items, 2);

    // The English entry went through the gateway, the Japanese one did not.
    assert_eq!(*calls.lock().unwrap(), vec!["New AI model released"]);

    let document = fs::read_to_string(config.out_dir.join("feed_ai_news.xml")).unwrap();
    assert!(document.contains("<guid isPermaLink='false'>abc</guid>"));
    assert!(document.contains("<guid isPermaLink='false'>xyz</guid>"));
    assert!(document.contains("日本語要約RSS - AI News"));
    assert!(document.contains("これは日本語の要約です。"));

    let state = fs::read_to_string(&config.state_path).unwrap();
    assert!(state.contains("abc"));
    assert!(state.contains("xyz"));
}

#[tokio::test]
async fn second_run_with_identical_upstream_yields_nothing() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write_feed_list(
        &config,
        "# ===== AI News =====\nhttps://en.example/rss\nhttps://jp.example/rss\n",
    );

    for expected in [2usize, 0] {
        let fetcher = StubFetcher::new(vec![
            ("https://en.example/rss", english_feed()),
            ("https://jp.example/rss", japanese_feed()),
        ]);
        let (summarizer, _calls) = MockSummarizer::new();
        let pipeline = Pipeline::new(config.clone(), Box::new(fetcher), Box::new(summarizer));
        let report = pipeline.run().await.unwrap();
        assert_eq!(report.total_items, expected);
    }

    let document = fs::read_to_string(config.out_dir.join("feed_ai_news.xml")).unwrap();
    assert!(!document.contains("<item>"));
}

#[tokio::test]
async fn failing_source_does_not_block_siblings_or_other_categories() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write_feed_list(
        &config,
        "# ===== News =====\nhttps://dead.example/rss\nhttps://en.example/rss\n\
         # ===== Nihongo =====\nhttps://jp.example/rss\n",
    );

    // dead.example intentionally absent from the stub.
    let fetcher = StubFetcher::new(vec![
        ("https://en.example/rss", english_feed()),
        ("https://jp.example/rss", japanese_feed()),
    ]);
    let (summarizer, _calls) = MockSummarizer::new();
    let pipeline = Pipeline::new(config.clone(), Box::new(fetcher), Box::new(summarizer));

    let report = pipeline.run().await.unwrap();
    assert_eq!(report.category("news").unwrap().items, 1);
    assert_eq!(report.category("nihongo").unwrap().items, 1);
    assert!(config.out_dir.join("feed_news.xml").exists());
    assert!(config.out_dir.join("feed_nihongo.xml").exists());
}

#[tokio::test]
async fn render_failure_skips_entry_and_leaves_it_unseen() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write_feed_list(&config, "# ===== News =====\nhttps://en.example/rss\n");

    let fetcher = StubFetcher::new(vec![("https://en.example/rss", english_feed())]);
    let pipeline = Pipeline::new(
        config.clone(),
        Box::new(fetcher),
        Box::new(FailingSummarizer),
    );
    let report = pipeline.run().await.unwrap();
    assert_eq!(report.total_items, 0);

    let state = fs::read_to_string(&config.state_path).unwrap();
    assert!(!state.contains("abc"), "failed entry must be retried next run");

    // Once the gateway recovers, the same entry renders.
    let fetcher = StubFetcher::new(vec![("https://en.example/rss", english_feed())]);
    let (summarizer, _calls) = MockSummarizer::new();
    let pipeline = Pipeline::new(config.clone(), Box::new(fetcher), Box::new(summarizer));
    let report = pipeline.run().await.unwrap();
    assert_eq!(report.total_items, 1);
}

#[tokio::test]
async fn entry_mirrored_across_sources_renders_once() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write_feed_list(
        &config,
        "# ===== News =====\nhttps://a.example/rss\nhttps://b.example/rss\n",
    );

    let fetcher = StubFetcher::new(vec![
        ("https://a.example/rss", english_feed()),
        ("https://b.example/rss", english_feed()),
    ]);
    let (summarizer, calls) = MockSummarizer::new();
    let pipeline = Pipeline::new(config.clone(), Box::new(fetcher), Box::new(summarizer));

    let report = pipeline.run().await.unwrap();
    assert_eq!(report.total_items, 1);
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn document_lists_oldest_of_run_first() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write_feed_list(&config, "# ===== News =====\nhttps://en.example/rss\n");

    // Feed order is newest-first, as sources publish it.
    let feed = rss_feed(&[
        (
            "newer",
            "Newer story",
            "https://en.example/newer",
            "Fresh news body.",
        ),
        (
            "older",
            "Older story",
            "https://en.example/older",
            "Yesterday's news body.",
        ),
    ]);
    let fetcher = StubFetcher::new(vec![("https://en.example/rss", feed)]);
    let (summarizer, _calls) = MockSummarizer::new();
    let pipeline = Pipeline::new(config.clone(), Box::new(fetcher), Box::new(summarizer));
    pipeline.run().await.unwrap();

    let document = fs::read_to_string(config.out_dir.join("feed_news.xml")).unwrap();
    let older_pos = document.find("Older story").unwrap();
    let newer_pos = document.find("Newer story").unwrap();
    assert!(older_pos < newer_pos);
}

#[tokio::test]
async fn missing_feed_list_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());

    let fetcher = StubFetcher::new(vec![]);
    let (summarizer, _calls) = MockSummarizer::new();
    let pipeline = Pipeline::new(config, Box::new(fetcher), Box::new(summarizer));

    let err = pipeline.run().await.unwrap_err();
    assert!(matches!(err, PipelineError::FeedListMissing { .. }));
}

#[tokio::test]
async fn titles_with_markup_are_escaped_in_output() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    write_feed_list(&config, "# ===== News =====\nhttps://en.example/rss\n");

    let feed = rss_feed(&[(
        "amp-1",
        "Q&amp;A: what's &lt;next&gt;",
        "https://en.example/amp?a=1&amp;b=2",
        "Body text.",
    )]);
    let fetcher = StubFetcher::new(vec![("https://en.example/rss", feed)]);
    let (summarizer, _calls) = MockSummarizer::new();
    let pipeline = Pipeline::new(config.clone(), Box::new(fetcher), Box::new(summarizer));
    pipeline.run().await.unwrap();

    let document = fs::read_to_string(config.out_dir.join("feed_news.xml")).unwrap();
    assert!(document.contains("Q&amp;A: what&apos;s &lt;next&gt;"));
    assert!(document.contains("<link>https://en.example/amp?a=1&amp;b=2</link>"));
}
