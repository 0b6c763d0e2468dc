use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use quintin_core::crawl::{CrawlOptions, execute_crawl, generate_crawl_summary};
use quintin_core::export::{ExportMode, export_to_file};
use quintin_core::lore::LoreIndex;
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Install the log subscriber. `RUST_LOG` wins; otherwise only warnings.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Expand a leading `~` and environment variables in a user-supplied path
pub fn resolve_output_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::full(raw)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    PathBuf::from(expanded)
}

/// Build crawl options from `crawl` subcommand arguments
pub fn crawl_options_from_args(sub_matches: &ArgMatches, quiet: bool) -> Result<CrawlOptions> {
    let url = sub_matches
        .get_one::<Url>("url")
        .context("a seed URL is required")?;

    let mut options = CrawlOptions::new(url.as_str());
    options.max_pages = sub_matches.get_one::<usize>("max-pages").copied();
    options.max_depth = sub_matches.get_one::<usize>("max-depth").copied();
    if let Some(timeout) = sub_matches.get_one::<u64>("timeout") {
        options.timeout_secs = *timeout;
    }
    options.show_progress_bars = !quiet;
    Ok(options)
}

pub fn export_mode(refetch: bool) -> ExportMode {
    if refetch {
        ExportMode::Refetch
    } else {
        ExportMode::Cached
    }
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    init_tracing();

    let options = crawl_options_from_args(sub_matches, quiet)?;
    let output = sub_matches
        .get_one::<String>("output")
        .map(|raw| resolve_output_path(raw))
        .context("an output path is required")?;
    let mode = export_mode(sub_matches.get_flag("refetch"));

    if !quiet {
        println!("\n{} Crawling {}", "→".blue(), options.seed.bright_white());
        if let Some(pages) = options.max_pages {
            println!("Max pages: {}", pages);
        }
        if let Some(depth) = options.max_depth {
            println!("Max depth: {}", depth);
        }
        println!();
    }

    // Export reuses the crawl's HTTP settings.
    let export_crawler = options.build_crawler()?;

    let report = execute_crawl(options, None)
        .await
        .context("crawl failed")?;

    let blocks = export_to_file(&output, &report, mode, &export_crawler)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;

    if !quiet {
        print!("{}", generate_crawl_summary(&report));
        println!();
    }
    println!(
        "{} Crawled {} pages. Saved {} blocks to {}",
        "✓".green().bold(),
        report.pages_recorded(),
        blocks,
        output.display().to_string().bright_white()
    );
    Ok(())
}

/// Which topic the `lore` subcommand should look up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoreTarget {
    Topic(String),
    Prompt(String),
    Random,
}

impl LoreTarget {
    pub fn from_args(sub_matches: &ArgMatches) -> Option<Self> {
        if let Some(topic) = sub_matches.get_one::<String>("TOPIC") {
            Some(LoreTarget::Topic(topic.clone()))
        } else if let Some(prompt) = sub_matches.get_one::<String>("prompt") {
            Some(LoreTarget::Prompt(prompt.clone()))
        } else if sub_matches.get_flag("random") {
            Some(LoreTarget::Random)
        } else {
            None
        }
    }
}

/// Resolve a target to a topic name, or `None` when nothing matches
pub fn resolve_topic<R: Rng + ?Sized>(
    index: &LoreIndex,
    target: &LoreTarget,
    rng: &mut R,
) -> Option<String> {
    match target {
        LoreTarget::Topic(topic) => Some(topic.to_lowercase()),
        LoreTarget::Prompt(prompt) => index.guess_topic(prompt).map(str::to_string),
        LoreTarget::Random => index.random_topic(rng).map(str::to_string),
    }
}

pub fn load_index(path: &Path) -> Result<LoreIndex> {
    LoreIndex::load(path).with_context(|| format!("could not load lore index {}", path.display()))
}

pub async fn handle_lore(sub_matches: &ArgMatches) -> Result<()> {
    init_tracing();

    let index_path = sub_matches
        .get_one::<String>("index")
        .map(|raw| resolve_output_path(raw))
        .context("a lore index path is required")?;
    let index = load_index(&index_path)?;

    if sub_matches.get_flag("list") {
        for topic in index.topics() {
            println!("  {} {}", "•".yellow(), topic);
        }
        return Ok(());
    }

    let Some(target) = LoreTarget::from_args(sub_matches) else {
        bail!("give a TOPIC, --prompt or --random");
    };

    let mut rng = rand::thread_rng();
    let Some(topic) = resolve_topic(&index, &target, &mut rng) else {
        println!("{} No topic in the lore index matches that.", "ℹ".blue());
        return Ok(());
    };

    info!("Looking up lore for '{}'", topic);
    let crawler = quintin_scanner::Crawler::new()?;
    let snippet = index.fetch_lore(&crawler, &topic, &mut rng).await?;

    println!("{}", topic.bright_blue().bold());
    println!();
    println!("{}", snippet);
    Ok(())
}
