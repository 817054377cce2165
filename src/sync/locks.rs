/// Keyed async mutexes guarding token rows and creators
///
/// Writers for the same key are serialized; distinct keys never contend.
/// `lock_all` acquires in sorted, de-duplicated order so two sweeps that
/// overlap on several mints cannot deadlock.
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        self.entry(key).lock_owned().await
    }

    pub async fn lock_all(&self, keys: &[String]) -> Vec<OwnedMutexGuard<()>> {
        let mut sorted: Vec<&String> = keys.iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len());
        for key in sorted {
            guards.push(self.lock(key).await);
        }
        guards
    }

    /// Drop entries nobody holds or waits on
    pub fn prune(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_serializes() {
        let locks = Arc::new(KeyedLocks::new());
        let guard = locks.lock("MintA").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock("MintA").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        // Other keys stay available
        let _other = tokio::time::timeout(Duration::from_millis(50), locks.lock("MintB"))
            .await
            .expect("independent key");

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("contender acquired")
            .unwrap();
    }

    #[tokio::test]
    async fn test_lock_all_dedups_and_prune_releases() {
        let locks = KeyedLocks::new();
        let keys = vec!["B".to_string(), "A".to_string(), "B".to_string()];
        let guards = locks.lock_all(&keys).await;
        assert_eq!(guards.len(), 2);
        assert_eq!(locks.len(), 2);

        locks.prune();
        assert_eq!(locks.len(), 2);

        drop(guards);
        locks.prune();
        assert!(locks.is_empty());
    }
}
