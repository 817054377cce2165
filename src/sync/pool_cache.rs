/// Pool address -> mint mapping shared with the live trade classifier
///
/// Written by the reconciliation engine (and the start-up warm-up), read
/// concurrently by the classifier. Entries are never evicted here.
use crate::logger::{self, LogTag};
use crate::tokens::types::PoolLink;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

#[derive(Default)]
pub struct PoolMintCache {
    entries: DashMap<String, String>,
}

impl PoolMintCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, pool_id: &str, mint: &str) {
        if let Some(previous) = self.entries.insert(pool_id.to_string(), mint.to_string()) {
            if previous != mint {
                logger::warning(
                    LogTag::Cache,
                    &format!(
                        "Pool {} remapped from {} to {}",
                        pool_id, previous, mint
                    ),
                );
            }
        }
    }

    pub fn get(&self, pool_id: &str) -> Option<String> {
        self.entries.get(pool_id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, pool_id: &str) -> bool {
        self.entries.contains_key(pool_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load persisted links; returns how many were inserted
    pub fn warm(&self, links: &[PoolLink]) -> usize {
        for link in links {
            self.entries.insert(link.pool_id.clone(), link.mint.clone());
        }
        logger::info(
            LogTag::Cache,
            &format!("Pool cache warmed with {} links ({} total)", links.len(), self.len()),
        );
        links.len()
    }
}

static GLOBAL_POOL_CACHE: Lazy<Arc<PoolMintCache>> = Lazy::new(|| Arc::new(PoolMintCache::new()));

/// Process-wide cache handed to the trade classifier
pub fn global_pool_cache() -> Arc<PoolMintCache> {
    GLOBAL_POOL_CACHE.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get() {
        let cache = PoolMintCache::new();
        assert!(cache.get("Pool1").is_none());
        cache.put("Pool1", "MintB");
        cache.put("Pool1", "MintB");
        assert_eq!(cache.get("Pool1").as_deref(), Some("MintB"));
        assert!(cache.contains("Pool1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_warm_from_links() {
        let cache = PoolMintCache::new();
        let links = vec![
            PoolLink { pool_id: "P1".into(), mint: "M1".into() },
            PoolLink { pool_id: "P2".into(), mint: "M2".into() },
        ];
        assert_eq!(cache.warm(&links), 2);
        assert_eq!(cache.get("P2").as_deref(), Some("M2"));
    }

    #[test]
    fn test_global_cache_is_shared() {
        let a = global_pool_cache();
        let b = global_pool_cache();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
