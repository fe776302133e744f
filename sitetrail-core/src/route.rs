// Route reconstruction from a page back to the crawl seed

use crate::graph::{GraphIndex, build_index};
use serde::{Deserialize, Serialize};
use sitetrail_scanner::record::CrawlRecord;
use std::collections::HashSet;
use tracing::warn;

/// Label for route steps that are not in the record set.
pub const UNKNOWN_TITLE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    pub title: String,
    pub url: String,
}

impl PathEntry {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Seed-first list of pages leading to `target_url`.
///
/// Unknown URLs still appear, labelled [`UNKNOWN_TITLE`], so a target missing
/// from the record set yields a single-entry route.
pub fn reconstruct_path(target_url: &str, records: &[CrawlRecord]) -> Vec<PathEntry> {
    let index = build_index(records);
    reconstruct_path_in(target_url, &index)
}

/// Same as [`reconstruct_path`] over an index that already exists.
///
/// Stops at the first repeated URL, so corrupted records whose parents form a
/// cycle still produce a finite route.
pub fn reconstruct_path_in(target_url: &str, index: &GraphIndex<'_>) -> Vec<PathEntry> {
    let mut path = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(target_url);

    while let Some(url) = current {
        if !seen.insert(url) {
            warn!("Parent chain for {} loops back to {}", target_url, url);
            break;
        }

        let title = index
            .record(url)
            .map(|record| record.title.as_str())
            .unwrap_or(UNKNOWN_TITLE);
        path.push(PathEntry::new(title, url));

        current = index.parent_of(url);
    }

    path.reverse();
    path
}
