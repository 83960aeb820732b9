use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

/// Persistence of friend requests. Every call is atomic on its own; callers
/// that need read-validate-write atomicity serialize on the account pair.
#[async_trait::async_trait]
pub trait FriendRequestRepo: Send + Sync {
    /// Pending request from `sent_by` to `sent_to`, direction-sensitive.
    async fn get_pending_request(
        &self,
        sent_by: AccountId,
        sent_to: AccountId,
    ) -> Result<Option<FriendRequest>, RelationError>;

    async fn get_request(&self, id: FriendRequestId)
    -> Result<Option<FriendRequest>, RelationError>;

    /// Inserts a pending request. A second pending request for the same
    /// ordered pair fails with `StoreConflict`.
    async fn insert_request(
        &self,
        sent_by: AccountId,
        sent_to: AccountId,
        at: DateTime<Utc>,
    ) -> Result<FriendRequest, RelationError>;

    /// Moves `id` from `expected` to `status`. Fails with `NotFound` when the
    /// row is gone and `StoreConflict` when its status is no longer `expected`.
    async fn update_status(
        &self,
        id: FriendRequestId,
        expected: FriendRequestStatus,
        status: FriendRequestStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RelationError>;

    async fn delete_request(&self, id: FriendRequestId) -> Result<(), RelationError>;

    /// Requests created by `sender` at or after `since`, any recipient and
    /// any status.
    async fn count_requests_since(
        &self,
        sender: AccountId,
        since: DateTime<Utc>,
    ) -> Result<u32, RelationError>;

    /// Accepted requests touching `account`, most recently accepted first.
    async fn list_accepted(&self, account: AccountId) -> Result<Vec<FriendRequest>, RelationError>;

    /// Pending requests addressed to `account`, newest first.
    async fn list_pending_incoming(
        &self,
        account: AccountId,
    ) -> Result<Vec<FriendRequest>, RelationError>;
}
