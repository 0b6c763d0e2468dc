//! Keyword to URL lookup used by the barkeep to pull lore snippets on demand.

use quintin_scanner::{Crawler, ScanError, parse_page};
use rand::Rng;
use rand::seq::{IteratorRandom, SliceRandom};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Lines shorter than this are headings, menus and other chrome.
pub const MIN_PARAGRAPH_CHARS: usize = 50;
pub const SNIPPET_PARAGRAPHS: usize = 2;
pub const MAX_SNIPPET_CHARS: usize = 2000;

#[derive(Error, Debug)]
pub enum LoreError {
    #[error("No entry found for '{0}' in the lore index.")]
    UnknownTopic(String),

    #[error("Couldn't load {topic} lore: {status}")]
    Status { topic: String, status: u16 },

    #[error("Error fetching lore: {0}")]
    Fetch(#[from] ScanError),

    #[error("Failed to read lore index: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed lore index: {0}")]
    Json(#[from] serde_json::Error),
}

/// Lowercase topic keyword to source URL.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct LoreIndex {
    topics: BTreeMap<String, String>,
}

impl LoreIndex {
    pub fn load(path: &Path) -> Result<Self, LoreError> {
        let raw = fs::read_to_string(path)?;
        let index = Self::from_json(&raw)?;
        debug!("Loaded {} lore topics from {}", index.len(), path.display());
        Ok(index)
    }

    pub fn from_json(raw: &str) -> Result<Self, LoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    pub fn url_for(&self, topic: &str) -> Option<&str> {
        self.topics.get(&topic.to_lowercase()).map(String::as_str)
    }

    /// First word of `prompt` that names a topic.
    pub fn guess_topic(&self, prompt: &str) -> Option<&str> {
        prompt
            .to_lowercase()
            .split_whitespace()
            .find_map(|word| self.topics.get_key_value(word))
            .map(|(topic, _)| topic.as_str())
    }

    pub fn random_topic<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.topics().choose(rng)
    }

    /// Fetch the page for `topic` and return a short random snippet of it.
    pub async fn fetch_lore<R: Rng + ?Sized>(
        &self,
        crawler: &Crawler,
        topic: &str,
        rng: &mut R,
    ) -> Result<String, LoreError> {
        let topic = topic.to_lowercase();
        let url = self
            .topics
            .get(&topic)
            .ok_or_else(|| LoreError::UnknownTopic(topic.clone()))?;

        let page = match crawler.fetch(url).await {
            Ok(page) => page,
            Err(ScanError::HttpStatus { status, .. }) => {
                return Err(LoreError::Status { topic, status });
            }
            Err(e) => return Err(e.into()),
        };
        // Only a plain 200 counts as lore, not 204 or a partial 206.
        if page.status_code != 200 {
            return Err(LoreError::Status {
                topic,
                status: page.status_code,
            });
        }
        let parsed = parse_page(&page.body)?;

        let paragraphs = lore_paragraphs(&parsed.blocks);
        debug!("{} usable paragraphs for '{}'", paragraphs.len(), topic);
        Ok(pick_snippet(&paragraphs, rng))
    }
}

/// Text lines long enough to read as prose.
pub fn lore_paragraphs(blocks: &[String]) -> Vec<&str> {
    blocks
        .iter()
        .map(|b| b.trim())
        .filter(|b| b.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect()
}

/// Up to two random paragraphs joined by a blank line, cut to 2000 characters.
pub fn pick_snippet<R: Rng + ?Sized>(paragraphs: &[&str], rng: &mut R) -> String {
    let chosen: Vec<&str> = paragraphs
        .choose_multiple(rng, SNIPPET_PARAGRAPHS)
        .copied()
        .collect();
    chosen.join("\n\n").chars().take(MAX_SNIPPET_CHARS).collect()
}
