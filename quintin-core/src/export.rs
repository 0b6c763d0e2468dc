//! The lore artifact: a flat UTF-8 text file with one `###` block per page,
//! in the order pages were discovered.

use quintin_scanner::{CanonicalUrl, CrawlReport, Crawler, PageOutcome, PageRecord};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Where exported page text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    /// Text captured while crawling.
    #[default]
    Cached,
    /// Fetch every recorded page a second time and export that.
    Refetch,
}

pub fn write_record<W: Write>(writer: &mut W, record: &PageRecord) -> io::Result<()> {
    write!(writer, "### {}\n\n{}\n\n", record.title, record.text())
}

pub fn write_failure<W: Write>(writer: &mut W, url: &str, reason: &str) -> io::Result<()> {
    write!(writer, "### ERROR {}\n\nFailed to fetch: {}\n\n", url, reason)
}

fn write_outcome<W: Write>(writer: &mut W, outcome: &PageOutcome) -> io::Result<()> {
    match outcome {
        PageOutcome::Recorded(record) => write_record(writer, record),
        PageOutcome::Failed { url, reason, .. } => write_failure(writer, url, reason),
    }
}

/// Write every outcome from cached crawl content. Returns the number of blocks.
pub fn write_artifact<W: Write>(writer: &mut W, report: &CrawlReport) -> io::Result<usize> {
    for outcome in &report.outcomes {
        write_outcome(writer, outcome)?;
    }
    Ok(report.outcomes.len())
}

/// Like [`write_artifact`], but re-fetches each recorded page first.
/// A page that fails on the second fetch becomes an `ERROR` block.
pub async fn write_artifact_refetched<W: Write>(
    writer: &mut W,
    report: &CrawlReport,
    crawler: &Crawler,
) -> io::Result<usize> {
    let base = report.origin.root_url().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no root URL for {}", report.origin),
        )
    })?;

    for outcome in &report.outcomes {
        let PageOutcome::Recorded(record) = outcome else {
            write_outcome(writer, outcome)?;
            continue;
        };

        let Some(url) = CanonicalUrl::parse(&record.url) else {
            write_failure(writer, &record.url, "not a crawlable URL")?;
            continue;
        };

        debug!("Re-fetching {} for export", url);
        match crawler.fetch_record(&url, record.depth, &base).await {
            Ok(fresh) => write_record(writer, &fresh)?,
            Err(e) => {
                warn!("Export fetch failed for {}: {}", url, e);
                write_failure(writer, &record.url, &e.to_string())?;
            }
        }
    }
    Ok(report.outcomes.len())
}

/// Render the artifact from cached content into a string.
pub fn render_artifact(report: &CrawlReport) -> io::Result<String> {
    let mut buf = Vec::new();
    write_artifact(&mut buf, report)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the artifact to `path`, replacing any existing file.
pub async fn export_to_file(
    path: &Path,
    report: &CrawlReport,
    mode: ExportMode,
    crawler: &Crawler,
) -> io::Result<usize> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let blocks = match mode {
        ExportMode::Cached => write_artifact(&mut writer, report)?,
        ExportMode::Refetch => write_artifact_refetched(&mut writer, report, crawler).await?,
    };
    writer.flush()?;

    info!("Wrote {} lore blocks to {}", blocks, path.display());
    Ok(blocks)
}
