use crate::error::{Result, ScanError};
use crate::normalizer::{CanonicalUrl, Origin, canonicalize};
use crate::page::{FetchedPage, parse_page};
use crate::result::{CrawlReport, PageOutcome, PageRecord};
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Called before each fetch with the number of URLs visited so far and the URL.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// State owned by a single crawl run.
///
/// The frontier is an explicit stack. Children are pushed in reverse so
/// they pop in the order they appeared on the page, which gives the same
/// visiting order as a recursive depth-first walk. A URL enters the
/// visited set when it is popped, before it is fetched.
pub struct CrawlSession {
    origin: Origin,
    visited: HashSet<String>,
    frontier: Vec<(CanonicalUrl, usize)>,
    outcomes: Vec<PageOutcome>,
}

impl CrawlSession {
    pub fn new(seed: CanonicalUrl) -> Self {
        Self {
            origin: seed.origin().clone(),
            visited: HashSet::new(),
            frontier: vec![(seed, 0)],
            outcomes: Vec::new(),
        }
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending(&self) -> usize {
        self.frontier.len()
    }

    /// Pop the next unvisited same-origin URL and mark it visited.
    pub fn next_url(&mut self) -> Option<(CanonicalUrl, usize)> {
        while let Some((url, depth)) = self.frontier.pop() {
            if url.origin() != &self.origin {
                debug!("Skipping off-origin {}", url);
                continue;
            }
            if !self.visited.insert(url.as_str().to_string()) {
                debug!("Already visited {}", url);
                continue;
            }
            return Some((url, depth));
        }
        None
    }

    /// Queue the links found on a page. Off-origin links are dropped here
    /// and never reach the visited set.
    pub fn schedule(&mut self, links: &[CanonicalUrl], depth: usize) {
        let before = self.frontier.len();
        for link in links.iter().rev() {
            if link.origin() != &self.origin {
                debug!("  -> {} is off-origin, not following", link);
                continue;
            }
            if self.visited.contains(link.as_str()) {
                continue;
            }
            self.frontier.push((link.clone(), depth));
        }
        debug!("Scheduled {} links at depth {}", self.frontier.len() - before, depth);
    }

    pub fn record(&mut self, outcome: PageOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn finish(self) -> CrawlReport {
        let unvisited = self
            .frontier
            .iter()
            .filter(|(url, _)| !self.visited.contains(url.as_str()))
            .map(|(url, _)| url.as_str())
            .collect::<HashSet<_>>()
            .len();

        CrawlReport {
            origin: self.origin,
            outcomes: self.outcomes,
            visited: self.visited,
            unvisited,
        }
    }
}

pub struct Crawler {
    client: Client,
    max_depth: Option<usize>,
    max_pages: Option<usize>,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("quintin/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            max_depth: None,
            max_pages: None,
            progress_callback: None,
        })
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = Some(pages);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Walk every same-origin page reachable from `seed`, one fetch at a time.
    ///
    /// Only an unusable seed fails the run. Page-level errors become
    /// [`PageOutcome::Failed`] entries and the walk carries on.
    pub async fn crawl(&self, seed: &str) -> Result<CrawlReport> {
        let seed = CanonicalUrl::parse(seed)
            .ok_or_else(|| ScanError::InvalidUrl(format!("cannot crawl {}", seed)))?;

        let base = seed
            .origin()
            .root_url()
            .ok_or_else(|| ScanError::InvalidUrl(format!("no root for {}", seed.origin())))?;

        info!("Starting crawl of {}", seed);
        let mut session = CrawlSession::new(seed);

        loop {
            if let Some(cap) = self.max_pages
                && session.visited_count() >= cap
            {
                warn!(
                    "Page cap of {} reached with {} URLs still queued",
                    cap,
                    session.pending()
                );
                break;
            }

            let Some((url, depth)) = session.next_url() else {
                break;
            };

            if let Some(ref callback) = self.progress_callback {
                callback(session.visited_count(), url.to_string());
            }

            match self.fetch_record(&url, depth, &base).await {
                Ok(record) => {
                    let links = record.links_found.clone();
                    session.record(PageOutcome::Recorded(record));

                    let child_depth = depth + 1;
                    if self.max_depth.is_none_or(|max| child_depth <= max) {
                        session.schedule(&links, child_depth);
                    }
                }
                Err(e) => {
                    warn!("Crawl error for {}: {}", url, e);
                    session.record(PageOutcome::Failed {
                        url: url.into_string(),
                        depth,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let report = session.finish();
        info!(
            "Crawl complete. Recorded {} pages, {} failed",
            report.pages_recorded(),
            report.pages_failed()
        );
        Ok(report)
    }

    /// GET a URL. Any non-2xx status is an error.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;

        Ok(FetchedPage {
            url: url.to_string(),
            status_code: status.as_u16(),
            content_type,
            body,
        })
    }

    /// Fetch and parse one page into a record.
    ///
    /// Links are resolved against `base`, the crawl origin's root, not
    /// against the page they appear on.
    pub async fn fetch_record(
        &self,
        url: &CanonicalUrl,
        depth: usize,
        base: &Url,
    ) -> Result<PageRecord> {
        let page = self.fetch(url.as_str()).await?;
        let parsed = parse_page(&page.body)?;

        let links_found: Vec<CanonicalUrl> = parsed
            .links
            .iter()
            .filter_map(|href| canonicalize(href, base))
            .collect();

        Ok(PageRecord {
            title: parsed.title.unwrap_or_else(|| url.to_string()),
            url: url.to_string(),
            body: parsed.blocks,
            status_code: page.status_code,
            content_type: page.content_type,
            depth,
            links_found,
        })
    }
}
