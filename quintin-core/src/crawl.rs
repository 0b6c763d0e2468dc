use indicatif::{ProgressBar, ProgressStyle};
use quintin_scanner::crawler::DEFAULT_TIMEOUT_SECS;
use quintin_scanner::{CrawlReport, Crawler, PageOutcome, ScanError};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub seed: String,
    pub max_pages: Option<usize>,
    pub max_depth: Option<usize>,
    pub timeout_secs: u64,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            max_pages: None,
            max_depth: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            show_progress_bars: false,
        }
    }

    /// Build the crawler these options describe.
    pub fn build_crawler(&self) -> Result<Crawler, ScanError> {
        let mut crawler = Crawler::with_timeout(self.timeout_secs)?;
        if let Some(depth) = self.max_depth {
            crawler = crawler.with_max_depth(depth);
        }
        if let Some(pages) = self.max_pages {
            crawler = crawler.with_max_pages(pages);
        }
        Ok(crawler)
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() { "/".to_string() } else { path }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl with the given options
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlReport, ScanError> {
    let progress_bar = if options.show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut crawler = options.build_crawler()?;

    if progress_bar.is_some() || progress_callback.is_some() {
        let pb_clone = progress_bar.clone();
        let callback_clone = progress_callback.clone();
        crawler = crawler.with_progress_callback(Arc::new(move |count: usize, url: String| {
            if let Some(ref pb) = pb_clone {
                pb.set_message(format!("Crawling... {} pages  {}", count, extract_url_path(&url)));
            }
            if let Some(ref callback) = callback_clone {
                callback(url);
            }
        }));
    }

    info!("Crawling {}", options.seed);
    let result = crawler.crawl(&options.seed).await;

    if let Some(ref pb) = progress_bar {
        match &result {
            Ok(report) => pb.finish_with_message(format!(
                "Crawl complete! {} pages visited",
                report.visited.len()
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    result
}

/// Generate a human-readable crawl summary
pub fn generate_crawl_summary(report: &CrawlReport) -> String {
    let mut summary = String::new();
    summary.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    summary.push_str(&format!("# {}\n", report.origin));
    summary.push_str(&format!("  Pages recorded: {}\n", report.pages_recorded()));
    summary.push_str(&format!("  Pages failed: {}\n", report.pages_failed()));

    let total_links: usize = report.records().map(|r| r.links_found.len()).sum();
    summary.push_str(&format!("  Total links found: {}\n", total_links));

    if report.unvisited > 0 {
        summary.push_str(&format!("  Left unvisited: {}\n", report.unvisited));
    }

    summary.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    for outcome in &report.outcomes {
        let path = extract_url_path(outcome.url());
        match outcome {
            PageOutcome::Recorded(record) => {
                summary.push_str(&format!("  {} {}  {}\n", record.status_code, path, record.title));
            }
            PageOutcome::Failed { reason, .. } => {
                summary.push_str(&format!("  ERR {}  {}\n", path, reason));
            }
        }
    }

    summary
}
