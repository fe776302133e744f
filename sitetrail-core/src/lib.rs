pub mod cache;
pub mod config;
pub mod crawl;
pub mod data;
pub mod error;
pub mod graph;
pub mod identity;
pub mod report;
pub mod route;
pub mod search;
pub mod service;
pub mod store;

use colored::Colorize;

pub use cache::{MemoryCache, RecordCache};
pub use crawl::{SiteCrawler, WebCrawler};
pub use error::StoreError;
pub use graph::{GraphIndex, build_index, find_seed};
pub use identity::{CacheKey, derive_cache_key, normalize_identity};
pub use route::{PathEntry, reconstruct_path};
pub use search::{
    ScoredResult, SearchReport, SearchStrategy, breadth_first_search, depth_first_search, search,
};
pub use service::SearchService;
pub use store::{JsonStore, RecordStore, StoreBackend};

const BANNER: &str = r#"
     _ _       _             _ _
 ___(_) |_ ___| |_ _ __ __ _(_) |
/ __| | __/ _ \ __| '__/ _` | | |
\__ \ | ||  __/ |_| | | (_| | | |
|___/_|\__\___|\__|_|  \__,_|_|_|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "crawl, search, and trace routes back to the seed".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
