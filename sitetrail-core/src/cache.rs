// In-process memoization of loaded record sets

use crate::identity::CacheKey;
use sitetrail_scanner::record::RecordSet;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Memo of record sets already loaded in this process. Owned and injected by
/// whoever drives the searches; the search functions never see it.
pub trait RecordCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Arc<RecordSet>>;
    fn put(&self, key: CacheKey, records: Arc<RecordSet>);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    sets: RwLock<HashMap<CacheKey, Arc<RecordSet>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<Arc<RecordSet>> {
        let sets = self.sets.read().unwrap_or_else(|e| e.into_inner());
        sets.get(key).cloned()
    }

    fn put(&self, key: CacheKey, records: Arc<RecordSet>) {
        let mut sets = self.sets.write().unwrap_or_else(|e| e.into_inner());
        sets.insert(key, records);
    }

    fn len(&self) -> usize {
        self.sets.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}
