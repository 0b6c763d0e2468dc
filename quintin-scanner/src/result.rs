use crate::normalizer::{CanonicalUrl, Origin};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A successfully fetched page. Never modified once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub body: Vec<String>,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub depth: usize,
    pub links_found: Vec<CanonicalUrl>,
}

impl PageRecord {
    /// Page text as written to the lore artifact: one block per line.
    pub fn text(&self) -> String {
        self.body.join("\n")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PageOutcome {
    Recorded(PageRecord),
    Failed {
        url: String,
        depth: usize,
        reason: String,
    },
}

impl PageOutcome {
    pub fn url(&self) -> &str {
        match self {
            PageOutcome::Recorded(record) => &record.url,
            PageOutcome::Failed { url, .. } => url,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PageOutcome::Failed { .. })
    }
}

/// Everything one crawl run produced, in discovery order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub origin: Origin,
    pub outcomes: Vec<PageOutcome>,
    pub visited: HashSet<String>,
    /// URLs still waiting when a page cap stopped the run.
    pub unvisited: usize,
}

impl CrawlReport {
    pub fn records(&self) -> impl Iterator<Item = &PageRecord> {
        self.outcomes.iter().filter_map(|o| match o {
            PageOutcome::Recorded(record) => Some(record),
            PageOutcome::Failed { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &PageOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    pub fn pages_recorded(&self) -> usize {
        self.records().count()
    }

    pub fn pages_failed(&self) -> usize {
        self.failures().count()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }
}
