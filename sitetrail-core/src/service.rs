// Load-or-crawl orchestration in front of the search functions

use crate::cache::{MemoryCache, RecordCache};
use crate::crawl::SiteCrawler;
use crate::error::{Result, StoreError};
use crate::identity::{CacheKey, normalize_identity};
use crate::route::{PathEntry, reconstruct_path};
use crate::search::{DEFAULT_MAX_DEPTH, SearchReport, SearchStrategy, search};
use crate::store::RecordStore;
use sitetrail_scanner::record::RecordSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Answers searches and route lookups for any seed, crawling it on first use.
pub struct SearchService<S, C> {
    store: S,
    crawler: C,
    cache: Box<dyn RecordCache>,
    crawl_depth: usize,
}

impl<S: RecordStore, C: SiteCrawler> SearchService<S, C> {
    pub fn new(store: S, crawler: C) -> Self {
        Self {
            store,
            crawler,
            cache: Box::new(MemoryCache::new()),
            crawl_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_cache(mut self, cache: Box<dyn RecordCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_crawl_depth(mut self, depth: usize) -> Self {
        self.crawl_depth = depth;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record set for `raw_seed`: from the cache, then the store, then a fresh
    /// crawl. `Ok(None)` means no data could be obtained; only store failures
    /// are errors.
    pub async fn load_or_crawl(&self, raw_seed: &str) -> Result<Option<Arc<RecordSet>>> {
        let raw_seed = raw_seed.trim();
        if raw_seed.is_empty() {
            return Ok(None);
        }

        let identity = normalize_identity(raw_seed);
        let key = CacheKey::from_identity(&identity);

        if let Some(records) = self.cache.get(&key) {
            info!("[CACHE] Data for {} found in memory", identity);
            return Ok(Some(records));
        }

        match self.store.load(&key) {
            Ok(Some(records)) => return Ok(Some(self.remember(key, records))),
            Ok(None) => {}
            Err(StoreError::Corrupt { path, reason }) => {
                error!("Discarding corrupt cache file {}: {}", path.display(), reason);
                self.store.remove(&key)?;
            }
            Err(e) => return Err(e),
        }

        info!("No cached data for {}. Starting new crawl.", identity);
        let records = match self.crawler.crawl(&identity, self.crawl_depth).await {
            Ok(records) => records,
            Err(e) => {
                error!("Crawling failed for {}: {}", identity, e);
                return Ok(None);
            }
        };

        if records.is_empty() {
            warn!("No pages crawled for {}. Nothing stored.", identity);
            self.store.remove(&key)?;
            return Ok(None);
        }

        self.store.save(&key, &identity, &records)?;
        Ok(Some(self.remember(key, records)))
    }

    /// Run a keyword search against `raw_seed`'s record set.
    ///
    /// A blank keyword short-circuits to an empty report without touching the
    /// store. `Ok(None)` means no data was available for the seed.
    pub async fn search(
        &self,
        raw_seed: &str,
        keyword: &str,
        strategy: SearchStrategy,
        max_depth: usize,
    ) -> Result<Option<SearchReport>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Some(SearchReport::empty(keyword, strategy, max_depth)));
        }

        let Some(records) = self.load_or_crawl(raw_seed).await? else {
            return Ok(None);
        };

        let report = search(keyword, &records, strategy, max_depth);
        info!(
            "Found {} results for '{}' using {}",
            report.results.len(),
            keyword,
            strategy
        );
        Ok(Some(report))
    }

    /// Seed-first route to `target_url` within `raw_seed`'s record set.
    pub async fn route(&self, raw_seed: &str, target_url: &str) -> Result<Option<Vec<PathEntry>>> {
        let Some(records) = self.load_or_crawl(raw_seed).await? else {
            return Ok(None);
        };
        Ok(Some(reconstruct_path(target_url.trim(), &records)))
    }

    pub fn known_identities(&self) -> Result<Vec<String>> {
        self.store.list_known_identities()
    }

    /// Number of record sets held in memory.
    pub fn cached_sets(&self) -> usize {
        self.cache.len()
    }

    fn remember(&self, key: CacheKey, records: RecordSet) -> Arc<RecordSet> {
        let records = Arc::new(records);
        self.cache.put(key, records.clone());
        records
    }
}
