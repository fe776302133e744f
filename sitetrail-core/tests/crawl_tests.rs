// Tests for crawl helpers

use sitetrail_core::crawl::{extract_url_path, generate_crawl_report};
use sitetrail_scanner::record::CrawlRecord;

// ============================================================================
// URL Path Extraction Tests
// ============================================================================

#[test]
fn test_extract_url_path_root() {
    assert_eq!(extract_url_path("http://example.com/"), "/");
}

#[test]
fn test_extract_url_path_empty_path() {
    assert_eq!(extract_url_path("http://example.com"), "/");
}

#[test]
fn test_extract_url_path_nested() {
    assert_eq!(
        extract_url_path("http://example.com/api/v1/users"),
        "/api/v1/users"
    );
}

#[test]
fn test_extract_url_path_drops_query_and_fragment() {
    assert_eq!(extract_url_path("http://example.com/api?key=value#top"), "/api");
}

#[test]
fn test_extract_url_path_with_port() {
    assert_eq!(extract_url_path("http://localhost:8080/admin"), "/admin");
}

#[test]
fn test_extract_url_path_invalid_url() {
    assert_eq!(extract_url_path("not a url"), "not a url");
}

// ============================================================================
// Crawl Report Tests
// ============================================================================

#[test]
fn test_crawl_report_counts() {
    let records = vec![
        CrawlRecord::seed("https://s.test", "Home", ""),
        CrawlRecord::new(
            "https://s.test/a",
            "A",
            "",
            Some("https://s.test".to_string()),
            1,
        ),
        CrawlRecord::new(
            "https://s.test/b",
            "B",
            "",
            Some("https://s.test".to_string()),
            1,
        ),
    ];
    let report = generate_crawl_report(&records);

    assert!(report.contains("Pages crawled: 3"));
    assert!(report.contains("Depth 0: 1 pages"));
    assert!(report.contains("Depth 1: 2 pages"));
    assert!(report.contains("## s.test"));
    assert!(report.contains("3 pages found"));
    assert!(report.contains("/a"));
}

#[test]
fn test_crawl_report_empty() {
    let report = generate_crawl_report(&[]);
    assert!(report.contains("Pages crawled: 0"));
    assert!(!report.contains("Depth"));
}
