use crate::domain_model::AccountId;
use crate::domain_port::*;
use dashmap::DashMap;
use std::time::{Duration, Instant};

struct CachedList {
    stored_at: Instant,
    value: String,
}

pub struct MemoryListCache {
    entries: DashMap<ListKey, CachedList>,
    ttl: Duration,
}

impl MemoryListCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }
}

#[async_trait::async_trait]
impl ListCache for MemoryListCache {
    async fn get(&self, key: ListKey) -> Result<Option<String>, CacheError> {
        if let Some(entry) = self.entries.get(&key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Ok(Some(entry.value.clone()));
            }
        }
        self.entries
            .remove_if(&key, |_, entry| entry.stored_at.elapsed() >= self.ttl);
        Ok(None)
    }

    async fn put(&self, key: ListKey, value: String) -> Result<(), CacheError> {
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        self.entries.insert(
            key,
            CachedList {
                stored_at: Instant::now(),
                value,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, account: AccountId) -> Result<(), CacheError> {
        for kind in ListKind::ALL {
            self.entries.remove(&ListKey::new(account, kind));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalidate_drops_every_kind_for_the_account() {
        let cache = MemoryListCache::new(Duration::from_secs(60));
        let me = AccountId(1);
        let other = AccountId(2);

        cache
            .put(ListKey::new(me, ListKind::Friends), "[1]".into())
            .await
            .unwrap();
        cache
            .put(ListKey::new(me, ListKind::Pending), "[2]".into())
            .await
            .unwrap();
        cache
            .put(ListKey::new(other, ListKind::Friends), "[3]".into())
            .await
            .unwrap();

        cache.invalidate(me).await.unwrap();

        assert_eq!(cache.get(ListKey::new(me, ListKind::Friends)).await.unwrap(), None);
        assert_eq!(cache.get(ListKey::new(me, ListKind::Pending)).await.unwrap(), None);
        assert_eq!(
            cache
                .get(ListKey::new(other, ListKind::Friends))
                .await
                .unwrap()
                .as_deref(),
            Some("[3]")
        );
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = MemoryListCache::new(Duration::ZERO);
        let key = ListKey::new(AccountId(1), ListKind::Friends);
        cache.put(key, "[]".into()).await.unwrap();
        assert_eq!(cache.get(key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_sweeps_expired_entries_of_other_keys() {
        let cache = MemoryListCache::new(Duration::ZERO);
        for n in 1..=5 {
            cache
                .put(ListKey::new(AccountId(n), ListKind::Friends), "[]".into())
                .await
                .unwrap();
        }
        assert_eq!(cache.entries.len(), 1);
    }
}
