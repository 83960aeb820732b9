use crate::domain_model::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelationError {
    #[error("cannot send a friend request to yourself")]
    SelfRequest,
    #[error("account not found")]
    AccountNotFound,
    #[error("friend request already pending for this account")]
    DuplicatePending,
    #[error("this account already sent you a pending request, accept or reject it")]
    ReciprocalPending,
    #[error("at most {max_requests} requests may be sent per {window_secs}s")]
    RateLimited { max_requests: u32, window_secs: i64 },
    #[error("interaction blocked between these accounts")]
    Blocked,
    #[error("friend request not found")]
    NotFound,
    #[error("only the recipient may act on this request")]
    Forbidden,
    #[error("friend request already accepted")]
    AlreadyAccepted,
    #[error("cannot block yourself")]
    SelfBlock,
    #[error("account already blocked")]
    AlreadyBlocked,
    #[error("account is not blocked")]
    NotBlocked,
    #[error("role {required} required")]
    InsufficientRole { required: Role },
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("store conflict: {0}")]
    StoreConflict(String),
}

impl RelationError {
    /// Stable identifier for client-side handling.
    pub fn code(&self) -> &'static str {
        match self {
            RelationError::SelfRequest => "self_request",
            RelationError::AccountNotFound => "account_not_found",
            RelationError::DuplicatePending => "duplicate_pending",
            RelationError::ReciprocalPending => "reciprocal_pending",
            RelationError::RateLimited { .. } => "rate_limited",
            RelationError::Blocked => "blocked",
            RelationError::NotFound => "not_found",
            RelationError::Forbidden => "forbidden",
            RelationError::AlreadyAccepted => "already_accepted",
            RelationError::SelfBlock => "self_block",
            RelationError::AlreadyBlocked => "already_blocked",
            RelationError::NotBlocked => "not_blocked",
            RelationError::InsufficientRole { .. } => "insufficient_role",
            RelationError::StoreUnavailable(_) => "store_unavailable",
            RelationError::StoreConflict(_) => "store_conflict",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RelationError::StoreUnavailable(_) | RelationError::StoreConflict(_)
        )
    }
}

/// Command surface of the relationship ledger. Every command names its actor
/// explicitly; the implementation trusts these ids.
#[async_trait::async_trait]
pub trait RelationshipService: Send + Sync {
    async fn send_request(
        &self,
        sender: AccountId,
        recipient: AccountId,
    ) -> Result<FriendRequestId, RelationError>;
    /// Returns the request as it was persisted after acceptance.
    async fn accept_request(
        &self,
        request: FriendRequestId,
        actor: AccountId,
    ) -> Result<FriendRequest, RelationError>;
    /// Returns the request that was deleted.
    async fn reject_request(
        &self,
        request: FriendRequestId,
        actor: AccountId,
    ) -> Result<FriendRequest, RelationError>;
    async fn block_user(&self, blocker: AccountId, target: AccountId)
    -> Result<(), RelationError>;
    async fn unblock_user(
        &self,
        blocker: AccountId,
        target: AccountId,
    ) -> Result<(), RelationError>;
    async fn list_friends(&self, account: AccountId)
    -> Result<Vec<FriendshipRecord>, RelationError>;
    async fn list_pending(&self, account: AccountId) -> Result<Vec<PendingRecord>, RelationError>;
    async fn get_pending(
        &self,
        actor: AccountId,
        request: FriendRequestId,
    ) -> Result<PendingRecord, RelationError>;
    async fn get_friendship(
        &self,
        actor: AccountId,
        request: FriendRequestId,
    ) -> Result<FriendshipRecord, RelationError>;
    async fn list_blocked(&self, account: AccountId) -> Result<Vec<BlockEdge>, RelationError>;
    async fn block_status(
        &self,
        viewer: AccountId,
        subject: AccountId,
    ) -> Result<BlockStatus, RelationError>;
}
