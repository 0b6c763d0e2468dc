pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    LoreTarget, crawl_options_from_args, export_mode, resolve_output_path, resolve_topic,
};

// Re-export crawl functionality from quintin-core
pub use quintin_core::crawl::{
    CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path, generate_crawl_summary,
};
