pub mod crawler;
pub mod error;
pub mod record;

pub use crawler::Crawler;
pub use error::ScanError;
pub use record::{CrawlRecord, RecordSet};
