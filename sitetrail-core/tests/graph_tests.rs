// Tests for record indexing and seed resolution

use sitetrail_core::graph::{build_index, find_seed};
use sitetrail_scanner::record::CrawlRecord;

fn child(url: &str, title: &str, parent: &str, depth: usize) -> CrawlRecord {
    CrawlRecord::new(url, title, "", Some(parent.to_string()), depth)
}

// ============================================================================
// Index Tests
// ============================================================================

#[test]
fn test_index_parent_and_children() {
    let records = vec![
        CrawlRecord::seed("https://s.test", "Home", ""),
        child("https://s.test/a", "A", "https://s.test", 1),
        child("https://s.test/b", "B", "https://s.test", 1),
    ];
    let index = build_index(&records);

    assert_eq!(index.len(), 3);
    assert_eq!(index.parent_of("https://s.test/a"), Some("https://s.test"));
    assert_eq!(index.parent_of("https://s.test"), None);
    assert_eq!(
        index.children_of("https://s.test"),
        &["https://s.test/a", "https://s.test/b"]
    );
    assert!(index.children_of("https://s.test/a").is_empty());
}

#[test]
fn test_index_children_keep_record_order() {
    let records = vec![
        CrawlRecord::seed("https://s.test", "Home", ""),
        child("https://s.test/z", "Z", "https://s.test", 1),
        child("https://s.test/a", "A", "https://s.test", 1),
    ];
    let index = build_index(&records);
    assert_eq!(
        index.children_of("https://s.test"),
        &["https://s.test/z", "https://s.test/a"]
    );
}

#[test]
fn test_index_tolerates_dangling_parent() {
    let records = vec![
        CrawlRecord::seed("https://s.test", "Home", ""),
        child("https://s.test/orphan", "Orphan", "https://gone.test", 1),
    ];
    let index = build_index(&records);

    assert!(index.contains("https://s.test/orphan"));
    assert!(!index.contains("https://gone.test"));
    assert_eq!(
        index.parent_of("https://s.test/orphan"),
        Some("https://gone.test")
    );
}

#[test]
fn test_index_skips_records_without_url() {
    let records = vec![
        CrawlRecord::seed("https://s.test", "Home", ""),
        CrawlRecord::new("", "Broken", "", Some("https://s.test".to_string()), 1),
    ];
    let index = build_index(&records);

    assert_eq!(index.len(), 1);
    assert!(index.children_of("https://s.test").is_empty());
}

#[test]
fn test_index_empty_parent_is_not_an_edge() {
    let records = vec![CrawlRecord::new(
        "https://s.test",
        "Home",
        "",
        Some(String::new()),
        0,
    )];
    let index = build_index(&records);

    assert_eq!(index.parent_of("https://s.test"), None);
    assert!(index.children_of("").is_empty());
}

#[test]
fn test_index_duplicate_url_keeps_last() {
    let records = vec![
        CrawlRecord::seed("https://s.test", "First", ""),
        CrawlRecord::seed("https://s.test", "Second", ""),
    ];
    let index = build_index(&records);

    assert_eq!(index.len(), 1);
    assert_eq!(
        index.record("https://s.test").map(|r| r.title.as_str()),
        Some("Second")
    );
}

#[test]
fn test_index_empty_records() {
    let records: Vec<CrawlRecord> = Vec::new();
    let index = build_index(&records);
    assert!(index.is_empty());
}

// ============================================================================
// Seed Tests
// ============================================================================

#[test]
fn test_find_seed_first_parentless_record() {
    let records = vec![
        child("https://s.test/a", "A", "https://s.test", 1),
        CrawlRecord::seed("https://s.test", "Home", ""),
        CrawlRecord::seed("https://other.test", "Other", ""),
    ];
    assert_eq!(find_seed(&records), Some("https://s.test"));
}

#[test]
fn test_find_seed_treats_empty_parent_as_seed() {
    let records = vec![CrawlRecord::new(
        "https://s.test",
        "Home",
        "",
        Some(String::new()),
        0,
    )];
    assert_eq!(find_seed(&records), Some("https://s.test"));
}

#[test]
fn test_find_seed_none_without_roots() {
    let records = vec![child("https://s.test/a", "A", "https://s.test", 1)];
    assert_eq!(find_seed(&records), None);
}

#[test]
fn test_find_seed_empty() {
    assert_eq!(find_seed(&[]), None);
}
