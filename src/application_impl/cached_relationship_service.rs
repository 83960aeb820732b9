use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{CacheError, ListCache, ListKey, ListKind};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Read-through cache for the per-account lists. Every successful mutation
/// drops the cached lists of both accounts involved.
///
/// Cache failures never fail a command: reads fall back to the inner service
/// and failed writes or invalidations are logged. A list read that races a
/// mutation can repopulate a stale entry, which then lives until its TTL.
pub struct CachedRelationshipService {
    inner: Arc<dyn RelationshipService>,
    cache: Arc<dyn ListCache>,
}

impl CachedRelationshipService {
    pub fn new(inner: Arc<dyn RelationshipService>, cache: Arc<dyn ListCache>) -> Self {
        Self { inner, cache }
    }

    async fn cached<T, F>(&self, key: ListKey, load: F) -> Result<Vec<T>, RelationError>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<Vec<T>, RelationError>>,
    {
        match self.read(key).await {
            Ok(Some(hit)) => return Ok(hit),
            Ok(None) => {}
            Err(e) => tracing::warn!(%key, error = %e, "list cache read failed"),
        }

        let fresh = load.await?;
        if let Err(e) = self.write(key, &fresh).await {
            tracing::warn!(%key, error = %e, "list cache write failed");
        }
        Ok(fresh)
    }

    async fn read<T: DeserializeOwned>(&self, key: ListKey) -> Result<Option<Vec<T>>, CacheError> {
        match self.cache.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize>(&self, key: ListKey, value: &[T]) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value)?;
        self.cache.put(key, raw).await
    }

    async fn invalidate(&self, accounts: [AccountId; 2]) {
        for account in accounts {
            if let Err(e) = self.cache.invalidate(account).await {
                tracing::warn!(%account, error = %e, "list cache invalidation failed");
            }
        }
    }
}

#[async_trait::async_trait]
impl RelationshipService for CachedRelationshipService {
    async fn send_request(
        &self,
        sender: AccountId,
        recipient: AccountId,
    ) -> Result<FriendRequestId, RelationError> {
        let id = self.inner.send_request(sender, recipient).await?;
        self.invalidate([sender, recipient]).await;
        Ok(id)
    }

    async fn accept_request(
        &self,
        request: FriendRequestId,
        actor: AccountId,
    ) -> Result<FriendRequest, RelationError> {
        let accepted = self.inner.accept_request(request, actor).await?;
        self.invalidate([accepted.sent_by, accepted.sent_to]).await;
        Ok(accepted)
    }

    async fn reject_request(
        &self,
        request: FriendRequestId,
        actor: AccountId,
    ) -> Result<FriendRequest, RelationError> {
        let removed = self.inner.reject_request(request, actor).await?;
        self.invalidate([removed.sent_by, removed.sent_to]).await;
        Ok(removed)
    }

    async fn block_user(
        &self,
        blocker: AccountId,
        target: AccountId,
    ) -> Result<(), RelationError> {
        self.inner.block_user(blocker, target).await?;
        self.invalidate([blocker, target]).await;
        Ok(())
    }

    async fn unblock_user(
        &self,
        blocker: AccountId,
        target: AccountId,
    ) -> Result<(), RelationError> {
        self.inner.unblock_user(blocker, target).await?;
        self.invalidate([blocker, target]).await;
        Ok(())
    }

    async fn list_friends(
        &self,
        account: AccountId,
    ) -> Result<Vec<FriendshipRecord>, RelationError> {
        let key = ListKey::new(account, ListKind::Friends);
        self.cached(key, self.inner.list_friends(account)).await
    }

    async fn list_pending(&self, account: AccountId) -> Result<Vec<PendingRecord>, RelationError> {
        let key = ListKey::new(account, ListKind::Pending);
        self.cached(key, self.inner.list_pending(account)).await
    }

    async fn get_pending(
        &self,
        actor: AccountId,
        request: FriendRequestId,
    ) -> Result<PendingRecord, RelationError> {
        self.inner.get_pending(actor, request).await
    }

    async fn get_friendship(
        &self,
        actor: AccountId,
        request: FriendRequestId,
    ) -> Result<FriendshipRecord, RelationError> {
        self.inner.get_friendship(actor, request).await
    }

    async fn list_blocked(&self, account: AccountId) -> Result<Vec<BlockEdge>, RelationError> {
        let key = ListKey::new(account, ListKind::Blocked);
        self.cached(key, self.inner.list_blocked(account)).await
    }

    async fn block_status(
        &self,
        viewer: AccountId,
        subject: AccountId,
    ) -> Result<BlockStatus, RelationError> {
        self.inner.block_status(viewer, subject).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{RealRelationshipService, RelationshipConfig};
    use crate::domain_port::{AccountRepo, SystemTimeSource};
    use crate::infra_memory::{MemoryListCache, MemoryRelationshipStore};
    use chrono::Utc;
    use std::time::Duration;

    async fn service() -> (CachedRelationshipService, Arc<MemoryListCache>, Vec<AccountId>) {
        let store = Arc::new(MemoryRelationshipStore::new());
        let mut ids = Vec::new();
        for name in ["ann", "bob"] {
            let account = store
                .insert_account(&format!("{name}@example.com"), name, Role::Write, Utc::now())
                .await
                .unwrap();
            ids.push(account.id);
        }
        let inner = Arc::new(RealRelationshipService::new(
            store.clone(),
            store.clone(),
            store,
            Arc::new(SystemTimeSource),
            RelationshipConfig::default(),
        ));
        let cache = Arc::new(MemoryListCache::new(Duration::from_secs(60)));
        (
            CachedRelationshipService::new(inner, cache.clone()),
            cache,
            ids,
        )
    }

    #[tokio::test]
    async fn list_reads_populate_the_cache() {
        let (service, cache, ids) = service().await;
        let key = ListKey::new(ids[1], ListKind::Pending);

        service.list_pending(ids[1]).await.unwrap();
        assert_eq!(cache.get(key).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn mutations_invalidate_both_participants() {
        let (service, _cache, ids) = service().await;
        let (ann, bob) = (ids[0], ids[1]);

        assert!(service.list_pending(bob).await.unwrap().is_empty());
        assert!(service.list_friends(ann).await.unwrap().is_empty());

        let id = service.send_request(ann, bob).await.unwrap();
        assert_eq!(service.list_pending(bob).await.unwrap().len(), 1);

        service.accept_request(id, bob).await.unwrap();
        assert!(service.list_pending(bob).await.unwrap().is_empty());
        assert_eq!(service.list_friends(ann).await.unwrap().len(), 1);

        service.reject_request(id, bob).await.unwrap();
        assert!(service.list_friends(ann).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blocked_list_follows_block_and_unblock() {
        let (service, _cache, ids) = service().await;
        let (ann, bob) = (ids[0], ids[1]);

        assert!(service.list_blocked(ann).await.unwrap().is_empty());
        service.block_user(ann, bob).await.unwrap();
        assert_eq!(service.list_blocked(ann).await.unwrap().len(), 1);
        service.unblock_user(ann, bob).await.unwrap();
        assert!(service.list_blocked(ann).await.unwrap().is_empty());
    }
}
