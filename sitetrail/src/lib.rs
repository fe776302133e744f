// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use handlers::{
    InitSummary, emit, init_data_dir, parse_report_format, parse_seed, parse_strategy,
};

pub use sitetrail_core::crawl::{extract_url_path, generate_crawl_report};
