use crate::error::{Result, ScanError};
use crate::record::{CrawlRecord, DEFAULT_TITLE, RecordSet};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;
pub type ResultCallback = Arc<dyn Fn(CrawlRecord) + Send + Sync>;

/// Queued page: (url, parent url, depth)
type WorkItem = (String, Option<String>, usize);
type WorkerQueues = Arc<Vec<Mutex<VecDeque<WorkItem>>>>;

/// Breadth-first, same-domain crawler that records how each page was reached.
pub struct Crawler {
    client: Client,
    max_depth: usize,
    base_domain: Option<String>,
    progress_callback: Option<ProgressCallback>,
    result_callback: Option<ResultCallback>,
}

impl Crawler {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent("sitetrail/0.1 (https://github.com/trapdoorsec/sitetrail)")
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            max_depth: 2,
            base_domain: None,
            progress_callback: None,
            result_callback: None,
        })
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_base_domain(mut self, domain: String) -> Self {
        self.base_domain = Some(domain);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_result_callback(mut self, callback: ResultCallback) -> Self {
        self.result_callback = Some(callback);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Crawl from `start_url`, fetching pages up to and including `max_depth`
    /// links away. The seed record is the only one without a parent.
    pub async fn crawl(&self, start_url: &str, workers: usize) -> Result<RecordSet> {
        let workers = workers.max(1);
        info!("Starting crawl of {} with {} workers", start_url, workers);

        let parsed_url = Url::parse(start_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", start_url, e)))?;

        let base_domain = match &self.base_domain {
            Some(domain) => domain.clone(),
            None => {
                let host = parsed_url
                    .host_str()
                    .ok_or_else(|| ScanError::InvalidUrl(format!("{} has no host", start_url)))?;
                host.strip_prefix("www.").unwrap_or(host).to_string()
            }
        };

        let visited: Arc<Mutex<HashSet<String>>> =
            Arc::new(Mutex::new(HashSet::from([start_url.to_string()])));
        let results: Arc<Mutex<RecordSet>> = Arc::new(Mutex::new(Vec::new()));
        // Items queued or being handled. Bumped before each push and dropped
        // once an item's children are queued, so zero means the crawl is done.
        let pending = Arc::new(AtomicUsize::new(1));

        let worker_queues: WorkerQueues =
            Arc::new((0..workers).map(|_| Mutex::new(VecDeque::new())).collect());
        worker_queues[0]
            .lock()
            .await
            .push_back((start_url.to_string(), None, 0));

        let mut worker_handles = Vec::new();

        for worker_id in 0..workers {
            let client = self.client.clone();
            let base_domain = base_domain.clone();
            let progress_cb = self.progress_callback.clone();
            let result_cb = self.result_callback.clone();
            let max_depth = self.max_depth;
            let visited = visited.clone();
            let results = results.clone();
            let pending = pending.clone();
            let worker_queues = worker_queues.clone();

            let handle = tokio::spawn(async move {
                debug!("Worker {} started", worker_id);

                loop {
                    let Some((url, parent, depth)) =
                        Self::next_item(&worker_queues, worker_id).await
                    else {
                        if pending.load(Ordering::SeqCst) == 0 {
                            break;
                        }
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        continue;
                    };

                    if depth > max_depth {
                        pending.fetch_sub(1, Ordering::SeqCst);
                        continue;
                    }

                    if let Some(ref callback) = progress_cb {
                        callback(worker_id, url.clone());
                    }

                    match Self::fetch_and_parse_static(&client, &url, parent, depth, &base_domain)
                        .await
                    {
                        Ok((record, new_urls)) => {
                            if let Some(ref callback) = result_cb {
                                callback(record.clone());
                            }
                            results.lock().await.push(record);

                            if depth < max_depth {
                                let mut target_worker = worker_id;
                                for new_url in new_urls {
                                    let should_queue = visited.lock().await.insert(new_url.clone());
                                    if should_queue {
                                        debug!(
                                            "[Worker {}] Queuing {} to worker {}",
                                            worker_id, new_url, target_worker
                                        );
                                        pending.fetch_add(1, Ordering::SeqCst);
                                        worker_queues[target_worker].lock().await.push_back((
                                            new_url,
                                            Some(url.clone()),
                                            depth + 1,
                                        ));
                                        target_worker = (target_worker + 1) % worker_queues.len();
                                    }
                                }
                            }
                        }
                        Err(e) => {
                            warn!("Crawl error for {}: {}", url, e);
                        }
                    }

                    pending.fetch_sub(1, Ordering::SeqCst);
                }

                debug!("Worker {} finished", worker_id);
            });

            worker_handles.push(handle);
        }

        for handle in worker_handles {
            handle.await?;
        }

        let results = std::mem::take(&mut *results.lock().await);
        info!("Crawl complete. Visited {} pages", results.len());
        Ok(results)
    }

    /// Pop from this worker's own queue, falling back to stealing from the
    /// others so no queue is left stranded behind an idle worker.
    async fn next_item(worker_queues: &WorkerQueues, worker_id: usize) -> Option<WorkItem> {
        let count = worker_queues.len();
        for offset in 0..count {
            let queue = &worker_queues[(worker_id + offset) % count];
            if let Some(item) = queue.lock().await.pop_front() {
                return Some(item);
            }
        }
        None
    }

    async fn fetch_and_parse_static(
        client: &Client,
        url: &str,
        parent: Option<String>,
        depth: usize,
        base_domain: &str,
    ) -> Result<(CrawlRecord, Vec<String>)> {
        debug!("Fetching {} (depth {})", url, depth);

        let response = client.get(url).send().await?;
        let status = response.status().as_u16();
        if status >= 400 {
            return Err(ScanError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let is_html = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);

        let body = response.text().await?;

        if !is_html {
            let record = CrawlRecord::new(url, DEFAULT_TITLE, "", parent, depth);
            return Ok((record, Vec::new()));
        }

        let page = Self::extract_page_static(&body, url, base_domain)?;
        let record = CrawlRecord::new(url, page.title, page.text, parent, depth);
        Ok((record, page.links))
    }

    fn extract_page_static(html: &str, current_url: &str, base_domain: &str) -> Result<ExtractedPage> {
        let document = Html::parse_document(html);

        let title_selector = Self::selector("title")?;
        let title = document
            .select(&title_selector)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        // Whole-document text, so a title-only keyword also counts as a
        // content hit
        let text = collapse_whitespace(document.root_element().text());

        let link_selector = Self::selector("a[href]")?;
        let mut links = Vec::new();
        for element in document.select(&link_selector) {
            if let Some(href) = element.value().attr("href")
                && let Some(absolute_url) = Self::resolve_url_static(current_url, href)
            {
                if Self::is_same_domain_static(&absolute_url, base_domain) {
                    if !links.contains(&absolute_url) {
                        links.push(absolute_url);
                    }
                } else {
                    debug!("Skipping cross-domain link {}", absolute_url);
                }
            }
        }

        Ok(ExtractedPage { title, text, links })
    }

    fn selector(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| ScanError::ParseError(format!("{}: {:?}", css, e)))
    }

    fn resolve_url_static(base: &str, href: &str) -> Option<String> {
        if href.is_empty()
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with('#')
        {
            return None;
        }

        let base_url = Url::parse(base).ok()?;
        let mut url = base_url.join(href).ok()?;
        url.set_fragment(None);

        Some(url.to_string())
    }

    fn is_same_domain_static(url: &str, base_domain: &str) -> bool {
        if let Ok(parsed) = Url::parse(url)
            && let Some(host) = parsed.host_str()
        {
            return host == base_domain || host.ends_with(&format!(".{}", base_domain));
        }
        false
    }
}

struct ExtractedPage {
    title: String,
    text: String,
    links: Vec<String>,
}

fn collapse_whitespace<'a>(fragments: impl Iterator<Item = &'a str>) -> String {
    fragments
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
