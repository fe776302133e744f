use indicatif::{ProgressBar, ProgressStyle};
use sitetrail_scanner::record::{CrawlRecord, RecordSet};
use sitetrail_scanner::{Crawler, ScanError};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub url: String,
    pub threads: usize,
    pub max_depth: usize,
    pub timeout_secs: u64,
    pub show_progress_bars: bool,
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Produces a fresh record set for a seed.
///
/// The seed handed in is already normalized. An empty record set means the
/// site yielded nothing usable; callers treat it the same as "no data".
pub trait SiteCrawler {
    fn crawl(
        &self,
        seed_url: &str,
        max_depth: usize,
    ) -> impl Future<Output = Result<RecordSet, ScanError>> + Send;
}

/// [`SiteCrawler`] backed by the HTTP crawler.
#[derive(Clone)]
pub struct WebCrawler {
    pub threads: usize,
    pub timeout_secs: u64,
    pub show_progress_bars: bool,
    pub progress_callback: Option<CrawlProgressCallback>,
}

impl WebCrawler {
    pub fn new(threads: usize, timeout_secs: u64) -> Self {
        Self {
            threads,
            timeout_secs,
            show_progress_bars: false,
            progress_callback: None,
        }
    }

    pub fn with_progress_bars(mut self, show: bool) -> Self {
        self.show_progress_bars = show;
        self
    }

    pub fn with_progress_callback(mut self, callback: CrawlProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

impl SiteCrawler for WebCrawler {
    async fn crawl(&self, seed_url: &str, max_depth: usize) -> Result<RecordSet, ScanError> {
        let options = CrawlOptions {
            url: seed_url.to_string(),
            threads: self.threads,
            max_depth,
            timeout_secs: self.timeout_secs,
            show_progress_bars: self.show_progress_bars,
        };
        execute_crawl(options, self.progress_callback.clone()).await
    }
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl with the given options
/// Returns the crawl records in discovery order
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<RecordSet, ScanError> {
    let CrawlOptions {
        url,
        threads,
        max_depth,
        timeout_secs,
        show_progress_bars,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));

    let internal_progress_callback: sitetrail_scanner::crawler::ProgressCallback = {
        let pb_clone = progress_bar.clone();
        let count_clone = processed_count.clone();
        Arc::new(move |_worker_id: usize, _url: String| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref pb) = pb_clone {
                pb.set_message(format!("Crawling... {} URLs processed", count));
                pb.tick();
            }
        })
    };

    if let Some(ref callback) = progress_callback {
        callback(format!("Crawling {} (max depth {})", url, max_depth));
    }

    let crawler = Crawler::with_timeout(timeout_secs)?
        .with_max_depth(max_depth)
        .with_progress_callback(internal_progress_callback);

    let result = crawler.crawl(&url, threads).await;

    let total = processed_count.load(Ordering::Relaxed);
    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!("Crawl complete! {} URLs processed", total));
    }

    match result {
        Ok(records) => Ok(records),
        Err(e) => {
            if let Some(ref callback) = progress_callback {
                callback(format!("[!]  Failed to crawl {}: {}", url, e));
            }
            Err(e)
        }
    }
}

/// Generate a crawl report from records
pub fn generate_crawl_report(records: &[CrawlRecord]) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Pages crawled: {}\n", records.len()));

    let mut by_depth: BTreeMap<usize, usize> = BTreeMap::new();
    for record in records {
        *by_depth.entry(record.depth).or_default() += 1;
    }
    for (depth, count) in &by_depth {
        report.push_str(&format!("  Depth {}: {} pages\n", depth, count));
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    let mut by_host: BTreeMap<String, Vec<&CrawlRecord>> = BTreeMap::new();
    for record in records {
        if let Ok(url) = Url::parse(&record.url)
            && let Some(host) = url.host_str()
        {
            by_host.entry(host.to_string()).or_default().push(record);
        }
    }

    for (host, host_records) in by_host.iter() {
        report.push_str(&format!("## {}\n", host));
        report.push_str(&format!("  {} pages found\n\n", host_records.len()));

        for record in host_records {
            let path = extract_url_path(&record.url);
            report.push_str(&format!(
                "  \x1b[36m[{}]\x1b[0m {} \x1b[90m{}\x1b[0m\n",
                record.depth, path, record.title
            ));
        }
        report.push('\n');
    }

    report
}
