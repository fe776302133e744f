// Tests for the load-or-crawl search service

use sitetrail_core::cache::MemoryCache;
use sitetrail_core::crawl::SiteCrawler;
use sitetrail_core::identity::derive_cache_key;
use sitetrail_core::route::PathEntry;
use sitetrail_core::search::SearchStrategy;
use sitetrail_core::service::SearchService;
use sitetrail_core::store::{JsonStore, RecordStore};
use sitetrail_scanner::ScanError;
use sitetrail_scanner::record::{CrawlRecord, RecordSet};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Hands back a fixed record set and remembers what it was asked for.
#[derive(Clone, Default)]
struct FakeCrawler {
    records: RecordSet,
    fail: bool,
    calls: Arc<AtomicUsize>,
    seeds: Arc<Mutex<Vec<String>>>,
}

impl FakeCrawler {
    fn returning(records: RecordSet) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SiteCrawler for FakeCrawler {
    async fn crawl(&self, seed_url: &str, _max_depth: usize) -> Result<RecordSet, ScanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seeds.lock().unwrap().push(seed_url.to_string());
        if self.fail {
            return Err(ScanError::Other("connection refused".to_string()));
        }
        Ok(self.records.clone())
    }
}

fn team_site() -> RecordSet {
    vec![
        CrawlRecord::seed("https://ui.ac.id", "Home", "welcome"),
        CrawlRecord::new(
            "https://ui.ac.id/about",
            "About Team",
            "our staff",
            Some("https://ui.ac.id".to_string()),
            1,
        ),
    ]
}

fn create_store() -> (TempDir, JsonStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonStore::open(temp_dir.path()).unwrap();
    (temp_dir, store)
}

// ============================================================================
// Load Order Tests
// ============================================================================

#[tokio::test]
async fn test_first_search_crawls_and_stores() {
    let (_temp_dir, store) = create_store();
    let crawler = FakeCrawler::returning(team_site());
    let service = SearchService::new(store, crawler.clone());

    let report = service
        .search("https://www.ui.ac.id/", "team", SearchStrategy::Bfs, 2)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert!((report.results[0].score - 0.9).abs() < 1e-9);
    assert_eq!(crawler.calls(), 1);
    assert_eq!(*crawler.seeds.lock().unwrap(), vec!["https://ui.ac.id"]);

    let key = derive_cache_key("ui.ac.id");
    assert!(service.store().path_for(&key).exists());
}

#[tokio::test]
async fn test_second_search_hits_memory_cache() {
    let (_temp_dir, store) = create_store();
    let crawler = FakeCrawler::returning(team_site());
    let service = SearchService::new(store, crawler.clone()).with_cache(Box::new(MemoryCache::new()));

    service.load_or_crawl("ui.ac.id").await.unwrap();
    // Deleting the file proves the second lookup never reads the store
    let key = derive_cache_key("ui.ac.id");
    fs::remove_file(service.store().path_for(&key)).unwrap();

    let records = service.load_or_crawl("https://ui.ac.id").await.unwrap();
    assert!(records.is_some());
    assert_eq!(crawler.calls(), 1);
    assert_eq!(service.cached_sets(), 1);
}

#[tokio::test]
async fn test_stored_set_loaded_without_crawling() {
    let (_temp_dir, store) = create_store();
    let identity = "https://ui.ac.id";
    store
        .save(&derive_cache_key(identity), identity, &team_site())
        .unwrap();

    let crawler = FakeCrawler::returning(Vec::new());
    let service = SearchService::new(store, crawler.clone());

    let records = service.load_or_crawl("www.ui.ac.id").await.unwrap().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(crawler.calls(), 0);
}

#[tokio::test]
async fn test_corrupt_file_is_replaced_by_recrawl() {
    let (_temp_dir, store) = create_store();
    let key = derive_cache_key("ui.ac.id");
    fs::write(store.path_for(&key), "{{{").unwrap();

    let crawler = FakeCrawler::returning(team_site());
    let service = SearchService::new(store, crawler.clone());

    let records = service.load_or_crawl("ui.ac.id").await.unwrap().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(crawler.calls(), 1);
    assert_eq!(service.store().load(&key).unwrap(), Some(team_site()));
}

// ============================================================================
// No Data Tests
// ============================================================================

#[tokio::test]
async fn test_empty_crawl_yields_none() {
    let (_temp_dir, store) = create_store();
    let service = SearchService::new(store, FakeCrawler::returning(Vec::new()));

    let report = service
        .search("ui.ac.id", "team", SearchStrategy::Bfs, 2)
        .await
        .unwrap();
    assert!(report.is_none());

    let key = derive_cache_key("ui.ac.id");
    assert!(!service.store().path_for(&key).exists());
    assert_eq!(service.cached_sets(), 0);
}

#[tokio::test]
async fn test_failed_crawl_yields_none() {
    let (_temp_dir, store) = create_store();
    let service = SearchService::new(store, FakeCrawler::failing());

    let records = service.load_or_crawl("ui.ac.id").await.unwrap();
    assert!(records.is_none());
}

#[tokio::test]
async fn test_blank_seed_yields_none() {
    let (_temp_dir, store) = create_store();
    let crawler = FakeCrawler::returning(team_site());
    let service = SearchService::new(store, crawler.clone());

    assert!(service.load_or_crawl("   ").await.unwrap().is_none());
    assert_eq!(crawler.calls(), 0);
}

#[tokio::test]
async fn test_blank_keyword_returns_empty_report_without_crawling() {
    let (_temp_dir, store) = create_store();
    let crawler = FakeCrawler::returning(team_site());
    let service = SearchService::new(store, crawler.clone());

    let report = service
        .search("ui.ac.id", "  ", SearchStrategy::Dfs, 2)
        .await
        .unwrap()
        .unwrap();

    assert!(report.results.is_empty());
    assert_eq!(crawler.calls(), 0);
}

// ============================================================================
// Route And Listing Tests
// ============================================================================

#[tokio::test]
async fn test_route_through_service() {
    let (_temp_dir, store) = create_store();
    let service = SearchService::new(store, FakeCrawler::returning(team_site()));

    let path = service
        .route("ui.ac.id", "https://ui.ac.id/about")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        path,
        vec![
            PathEntry::new("Home", "https://ui.ac.id"),
            PathEntry::new("About Team", "https://ui.ac.id/about"),
        ]
    );
}

#[tokio::test]
async fn test_known_identities_after_crawl() {
    let (_temp_dir, store) = create_store();
    let service = SearchService::new(store, FakeCrawler::returning(team_site()));

    service.load_or_crawl("www.ui.ac.id/").await.unwrap();
    assert_eq!(service.known_identities().unwrap(), vec!["https://ui.ac.id"]);
}
