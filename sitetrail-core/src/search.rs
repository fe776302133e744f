// Depth-limited keyword search over the crawl graph

use crate::graph::{GraphIndex, build_index, find_seed};
use serde::{Deserialize, Serialize};
use sitetrail_scanner::record::CrawlRecord;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use tracing::{debug, warn};

pub const DEFAULT_MAX_DEPTH: usize = 2;

const TITLE_WEIGHT: f64 = 1.0;
const CONTENT_WEIGHT: f64 = 0.8;
const DEPTH_PENALTY: f64 = 0.1;
const MIN_DEPTH_MULTIPLIER: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Breadth-first, first-in-first-out fringe
    #[default]
    Bfs,
    /// Depth-first, stack fringe
    Dfs,
}

impl SearchStrategy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bfs" | "depth_limited_bfs" => Some(SearchStrategy::Bfs),
            "dfs" | "dfs_limited" => Some(SearchStrategy::Dfs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStrategy::Bfs => "bfs",
            SearchStrategy::Dfs => "dfs",
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub record: CrawlRecord,
    pub score: f64,
    /// Hops from the seed in this traversal, the depth the score decays by.
    pub depth: usize,
}

/// Outcome of one search. `seed_url` is `None` when the record set has no
/// parentless record, in which case `results` is always empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub keyword: String,
    pub strategy: SearchStrategy,
    pub max_depth: usize,
    pub seed_url: Option<String>,
    pub results: Vec<ScoredResult>,
}

impl SearchReport {
    pub fn empty(keyword: &str, strategy: SearchStrategy, max_depth: usize) -> Self {
        Self {
            keyword: keyword.to_string(),
            strategy,
            max_depth,
            seed_url: None,
            results: Vec::new(),
        }
    }

    pub fn has_seed(&self) -> bool {
        self.seed_url.is_some()
    }
}

/// Linear depth decay, floored so deep matches keep some weight.
pub fn depth_multiplier(depth: usize) -> f64 {
    (1.0 - depth as f64 * DEPTH_PENALTY).max(MIN_DEPTH_MULTIPLIER)
}

/// Keyword score before depth decay: 1.0 for a title hit plus 0.8 for a
/// content hit. `keyword` must already be lowercase.
pub fn raw_score(record: &CrawlRecord, keyword: &str) -> f64 {
    let mut score = 0.0;
    if record.title.to_lowercase().contains(keyword) {
        score += TITLE_WEIGHT;
    }
    if record.content.to_lowercase().contains(keyword) {
        score += CONTENT_WEIGHT;
    }
    score
}

/// Breadth-first search from the seed, visiting nodes up to `max_depth`.
pub fn breadth_first_search(keyword: &str, records: &[CrawlRecord], max_depth: usize) -> Vec<ScoredResult> {
    search(keyword, records, SearchStrategy::Bfs, max_depth).results
}

/// Depth-first search from the seed, visiting nodes up to `max_depth`.
pub fn depth_first_search(keyword: &str, records: &[CrawlRecord], max_depth: usize) -> Vec<ScoredResult> {
    search(keyword, records, SearchStrategy::Dfs, max_depth).results
}

/// Score every record reachable from the seed within `max_depth` and rank the
/// matches, highest score first. Ties keep discovery order.
///
/// An empty keyword matches every visited record.
pub fn search(
    keyword: &str,
    records: &[CrawlRecord],
    strategy: SearchStrategy,
    max_depth: usize,
) -> SearchReport {
    let mut report = SearchReport::empty(keyword, strategy, max_depth);

    let Some(seed_url) = find_seed(records) else {
        warn!("No seed URL found in {} records", records.len());
        return report;
    };

    debug!(
        "[{}] Starting search from {} with max_depth={}",
        strategy, seed_url, max_depth
    );

    let index = build_index(records);
    report.results = traverse(&index, seed_url, &keyword.to_lowercase(), strategy, max_depth);
    report.results.sort_by(|a, b| b.score.total_cmp(&a.score));
    report.seed_url = Some(seed_url.to_string());
    report
}

/// Pending nodes. Only the pop end differs between the strategies.
enum Fringe<'a> {
    Queue(VecDeque<(&'a str, usize)>),
    Stack(Vec<(&'a str, usize)>),
}

impl<'a> Fringe<'a> {
    fn new(strategy: SearchStrategy, seed: &'a str) -> Self {
        match strategy {
            SearchStrategy::Bfs => Fringe::Queue(VecDeque::from([(seed, 0)])),
            SearchStrategy::Dfs => Fringe::Stack(vec![(seed, 0)]),
        }
    }

    fn pop(&mut self) -> Option<(&'a str, usize)> {
        match self {
            Fringe::Queue(queue) => queue.pop_front(),
            Fringe::Stack(stack) => stack.pop(),
        }
    }

    /// Children go on in reverse for the stack so the first child pops first.
    fn push_children(&mut self, children: &[&'a str], depth: usize, visited: &HashSet<&str>) {
        let unvisited = |child: &&&'a str| !visited.contains(**child);
        match self {
            Fringe::Queue(queue) => queue.extend(
                children
                    .iter()
                    .filter(unvisited)
                    .map(|child| (*child, depth)),
            ),
            Fringe::Stack(stack) => stack.extend(
                children
                    .iter()
                    .rev()
                    .filter(unvisited)
                    .map(|child| (*child, depth)),
            ),
        }
    }
}

fn traverse<'a>(
    index: &GraphIndex<'a>,
    seed_url: &'a str,
    keyword: &str,
    strategy: SearchStrategy,
    max_depth: usize,
) -> Vec<ScoredResult> {
    let mut results = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut fringe = Fringe::new(strategy, seed_url);

    while let Some((url, depth)) = fringe.pop() {
        if depth > max_depth || !visited.insert(url) {
            continue;
        }

        let Some(record) = index.record(url) else {
            continue;
        };

        let score = raw_score(record, keyword);
        if score > 0.0 {
            debug!("[{}] Found match (depth {}): {}", strategy, depth, record.title);
            results.push(ScoredResult {
                record: record.clone(),
                score: score * depth_multiplier(depth),
                depth,
            });
        }

        fringe.push_children(index.children_of(url), depth + 1, &visited);
    }

    results
}
