pub mod crawler;
pub mod error;
pub mod normalizer;
pub mod page;
pub mod result;

pub use crawler::{Crawler, CrawlSession, ProgressCallback};
pub use error::ScanError;
pub use normalizer::{CanonicalUrl, Origin, canonicalize};
pub use page::{FetchedPage, ParsedPage, parse_page};
pub use result::{CrawlReport, PageOutcome, PageRecord};
