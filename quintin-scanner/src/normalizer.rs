//! Link canonicalization.
//!
//! Every discovered link is reduced to `scheme://host[:port]/path` before
//! the crawler looks at it, so links that only differ by query string or
//! fragment collapse onto the same visited-set key.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// The crawl boundary: a scheme and host pair.
///
/// The host keeps an explicit non-default port, the same way the URL
/// authority does. Userinfo is never part of an origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origin {
    scheme: String,
    host: String,
}

impl Origin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Origin of a parsed URL, or `None` for URLs without a host.
    pub fn of(url: &Url) -> Option<Self> {
        let host = url.host_str()?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Some(Self::new(url.scheme(), host))
    }

    /// `scheme://host/`, the base that every discovered link is resolved against.
    pub fn root_url(&self) -> Option<Url> {
        Url::parse(&format!("{}/", self)).ok()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)
    }
}

/// A link with query string, fragment and userinfo removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalUrl {
    origin: Origin,
    path: String,
    url: String,
}

impl CanonicalUrl {
    /// Canonicalize an absolute URL string.
    pub fn parse(absolute: &str) -> Option<Self> {
        let url = Url::parse(absolute).ok()?;
        Self::from_url(&url)
    }

    pub fn from_url(url: &Url) -> Option<Self> {
        if url.cannot_be_a_base() {
            return None;
        }
        let origin = Origin::of(url)?;

        // Special schemes already report "/" for an empty path; others may not.
        let path = match url.path() {
            "" => "/".to_string(),
            p => p.to_string(),
        };

        let url = format!("{}{}", origin, path);
        Some(Self { origin, path, url })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parsed form, used as the base when resolving links found on this page.
    pub fn to_url(&self) -> Option<Url> {
        Url::parse(&self.url).ok()
    }

    pub fn into_string(self) -> String {
        self.url
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

/// Resolve `link` against `base` and canonicalize the result.
///
/// Returns `None` for anything that cannot be crawled: unparseable
/// links, `mailto:`/`javascript:`/`data:` style URLs and URLs without a
/// host. Never panics.
pub fn canonicalize(link: &str, base: &Url) -> Option<CanonicalUrl> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    let resolved = base.join(link).ok()?;
    CanonicalUrl::from_url(&resolved)
}
