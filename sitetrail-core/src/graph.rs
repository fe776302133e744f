// Crawl graph built from a flat record set

use sitetrail_scanner::record::CrawlRecord;
use std::collections::HashMap;

/// Lookup structures over one record set.
///
/// Borrows from the records it was built from and is never mutated after
/// construction, so any number of searches can run over the same record set
/// concurrently, each with its own index.
#[derive(Debug, Default)]
pub struct GraphIndex<'a> {
    by_url: HashMap<&'a str, &'a CrawlRecord>,
    parent_of: HashMap<&'a str, &'a str>,
    children_of: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> GraphIndex<'a> {
    pub fn record(&self, url: &str) -> Option<&'a CrawlRecord> {
        self.by_url.get(url).copied()
    }

    pub fn parent_of(&self, url: &str) -> Option<&'a str> {
        self.parent_of.get(url).copied()
    }

    /// Children in record-set order; empty when `url` links nowhere.
    pub fn children_of(&self, url: &str) -> &[&'a str] {
        self.children_of.get(url).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.by_url.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }
}

/// Index `records` in a single pass.
///
/// Duplicate URLs keep the last record. Records without a URL are skipped and
/// empty parents are not indexed as edges. Dangling parents still get a
/// `children_of` entry, which is harmless since traversal starts at the seed.
pub fn build_index(records: &[CrawlRecord]) -> GraphIndex<'_> {
    let mut index = GraphIndex::default();

    for record in records.iter().filter(|r| r.is_indexable()) {
        let url = record.url.as_str();
        index.by_url.insert(url, record);

        if let Some(parent) = record.parent_url() {
            index.children_of.entry(parent).or_default().push(url);
            index.parent_of.insert(url, parent);
        }
    }

    index
}

/// URL of the first record without a parent, if any.
pub fn find_seed(records: &[CrawlRecord]) -> Option<&str> {
    records
        .iter()
        .find(|r| r.is_indexable() && r.is_seed())
        .map(|r| r.url.as_str())
}
