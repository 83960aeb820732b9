use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait BlockRepo: Send + Sync {
    async fn get_block_edge(
        &self,
        blocked_by: AccountId,
        blocked_user: AccountId,
    ) -> Result<Option<BlockEdge>, RelationError>;

    /// Fails with `StoreConflict` when the edge already exists.
    async fn insert_block(
        &self,
        blocked_by: AccountId,
        blocked_user: AccountId,
        at: DateTime<Utc>,
    ) -> Result<BlockEdge, RelationError>;

    /// Returns whether an edge was removed.
    async fn delete_block(
        &self,
        blocked_by: AccountId,
        blocked_user: AccountId,
    ) -> Result<bool, RelationError>;

    /// Edges created by `blocked_by`, newest first.
    async fn list_blocked(&self, blocked_by: AccountId) -> Result<Vec<BlockEdge>, RelationError>;
}
