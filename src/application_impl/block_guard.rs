use crate::application_port::RelationError;
use crate::domain_model::*;
use crate::domain_port::{BlockRepo, TimeSource};
use std::sync::Arc;

pub struct BlockGuard {
    blocks: Arc<dyn BlockRepo>,
    time: Arc<dyn TimeSource>,
}

impl BlockGuard {
    pub fn new(blocks: Arc<dyn BlockRepo>, time: Arc<dyn TimeSource>) -> Self {
        Self { blocks, time }
    }

    /// Whether `a` blocked `b`.
    pub async fn is_blocked(&self, a: AccountId, b: AccountId) -> Result<bool, RelationError> {
        Ok(self.blocks.get_block_edge(a, b).await?.is_some())
    }

    pub async fn is_either_blocked(
        &self,
        a: AccountId,
        b: AccountId,
    ) -> Result<bool, RelationError> {
        Ok(self.is_blocked(a, b).await? || self.is_blocked(b, a).await?)
    }

    pub async fn status(
        &self,
        viewer: AccountId,
        subject: AccountId,
    ) -> Result<BlockStatus, RelationError> {
        Ok(BlockStatus {
            is_blocked: self.is_blocked(viewer, subject).await?,
            blocked_by_user: self.is_blocked(subject, viewer).await?,
        })
    }

    /// Callers hold the pair lock for `(blocked_by, blocked_user)`.
    pub async fn block(
        &self,
        blocked_by: AccountId,
        blocked_user: AccountId,
    ) -> Result<BlockEdge, RelationError> {
        if blocked_by == blocked_user {
            return Err(RelationError::SelfBlock);
        }
        if self.is_blocked(blocked_by, blocked_user).await? {
            return Err(RelationError::AlreadyBlocked);
        }
        self.blocks
            .insert_block(blocked_by, blocked_user, self.time.now())
            .await
    }

    /// Callers hold the pair lock for `(blocked_by, blocked_user)`.
    pub async fn unblock(
        &self,
        blocked_by: AccountId,
        blocked_user: AccountId,
    ) -> Result<(), RelationError> {
        if !self.blocks.delete_block(blocked_by, blocked_user).await? {
            return Err(RelationError::NotBlocked);
        }
        Ok(())
    }

    pub async fn list(&self, blocked_by: AccountId) -> Result<Vec<BlockEdge>, RelationError> {
        self.blocks.list_blocked(blocked_by).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_port::SystemTimeSource;
    use crate::infra_memory::MemoryRelationshipStore;

    fn guard() -> BlockGuard {
        BlockGuard::new(
            Arc::new(MemoryRelationshipStore::new()),
            Arc::new(SystemTimeSource),
        )
    }

    #[tokio::test]
    async fn blocking_is_directed_but_either_sees_both() {
        let guard = guard();
        let (a, b) = (AccountId(1), AccountId(2));

        guard.block(a, b).await.unwrap();

        assert!(guard.is_blocked(a, b).await.unwrap());
        assert!(!guard.is_blocked(b, a).await.unwrap());
        assert!(guard.is_either_blocked(a, b).await.unwrap());
        assert!(guard.is_either_blocked(b, a).await.unwrap());

        let seen_by_b = guard.status(b, a).await.unwrap();
        assert!(!seen_by_b.is_blocked);
        assert!(seen_by_b.blocked_by_user);
    }

    #[tokio::test]
    async fn block_rejects_self_and_duplicates() {
        let guard = guard();
        let (a, b) = (AccountId(1), AccountId(2));

        assert_eq!(guard.block(a, a).await.unwrap_err(), RelationError::SelfBlock);
        guard.block(a, b).await.unwrap();
        assert_eq!(guard.block(a, b).await.unwrap_err(), RelationError::AlreadyBlocked);

        // the reverse edge is independent
        guard.block(b, a).await.unwrap();
        assert_eq!(guard.list(a).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unblock_requires_an_edge() {
        let guard = guard();
        let (a, b) = (AccountId(1), AccountId(2));

        assert_eq!(guard.unblock(a, b).await.unwrap_err(), RelationError::NotBlocked);
        guard.block(a, b).await.unwrap();
        // only the blocker's edge can be lifted by the blocker
        assert_eq!(guard.unblock(b, a).await.unwrap_err(), RelationError::NotBlocked);
        guard.unblock(a, b).await.unwrap();
        assert!(!guard.is_either_blocked(a, b).await.unwrap());
    }
}
