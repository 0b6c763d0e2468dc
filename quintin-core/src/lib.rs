pub mod crawl;
pub mod export;
pub mod lore;

pub use crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl, generate_crawl_summary};
pub use export::{ExportMode, export_to_file, render_artifact, write_artifact};
pub use lore::{LoreError, LoreIndex};

/// Seed of the lore site the barkeep draws on.
pub const DEFAULT_SEED: &str = "https://sordiavignti.xyz/";

/// Default name of the crawl artifact.
pub const DEFAULT_ARTIFACT: &str = "master_lore.txt";
