use crate::application_impl::{BlockGuard, PairLocks, RateLimiter};
use crate::application_port::RelationError;
use crate::domain_model::*;
use crate::domain_port::{AccountRepo, FriendRequestRepo, TimeSource};
use std::sync::Arc;

/// Pending -> Accepted transitions of a friend request, plus deletion on
/// rejection. Every transition holds the pair lock across its
/// read-validate-write sequence.
pub struct FriendRequestMachine {
    requests: Arc<dyn FriendRequestRepo>,
    accounts: Arc<dyn AccountRepo>,
    blocks: Arc<BlockGuard>,
    limiter: RateLimiter,
    locks: Arc<PairLocks>,
    time: Arc<dyn TimeSource>,
}

impl FriendRequestMachine {
    pub fn new(
        requests: Arc<dyn FriendRequestRepo>,
        accounts: Arc<dyn AccountRepo>,
        blocks: Arc<BlockGuard>,
        limiter: RateLimiter,
        locks: Arc<PairLocks>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            requests,
            accounts,
            blocks,
            limiter,
            locks,
            time,
        }
    }

    pub async fn send(
        &self,
        sender: AccountId,
        recipient: AccountId,
    ) -> Result<FriendRequestId, RelationError> {
        if sender == recipient {
            return Err(RelationError::SelfRequest);
        }
        if self.accounts.get_account(recipient).await?.is_none() {
            return Err(RelationError::AccountNotFound);
        }

        let _sender_guard = self.locks.lock_sender(sender).await?;
        let _pair_guard = self.locks.lock_pair(sender, recipient).await?;

        if self
            .requests
            .get_pending_request(sender, recipient)
            .await?
            .is_some()
        {
            return Err(RelationError::DuplicatePending);
        }
        if self
            .requests
            .get_pending_request(recipient, sender)
            .await?
            .is_some()
        {
            return Err(RelationError::ReciprocalPending);
        }
        self.limiter.check(sender).await?;
        if self.blocks.is_either_blocked(sender, recipient).await? {
            return Err(RelationError::Blocked);
        }

        let request = self
            .requests
            .insert_request(sender, recipient, self.time.now())
            .await?;
        tracing::info!(
            request_id = %request.id,
            sent_by = %sender,
            sent_to = %recipient,
            "friend request sent"
        );
        Ok(request.id)
    }

    pub async fn accept(
        &self,
        id: FriendRequestId,
        actor: AccountId,
    ) -> Result<FriendRequest, RelationError> {
        let request = self.load(id).await?;
        let _guard = self.locks.lock_pair(request.sent_by, request.sent_to).await?;

        // re-read under the lock, a concurrent reject may have removed it
        let request = self.load(id).await?;
        if request.sent_to != actor {
            return Err(RelationError::Forbidden);
        }
        if !request.is_pending() {
            return Err(RelationError::AlreadyAccepted);
        }

        let now = self.time.now();
        self.requests
            .update_status(
                id,
                FriendRequestStatus::Pending,
                FriendRequestStatus::Accepted,
                now,
            )
            .await?;
        tracing::info!(request_id = %id, accepted_by = %actor, "friend request accepted");

        Ok(FriendRequest {
            status: FriendRequestStatus::Accepted,
            updated_at: now,
            ..request
        })
    }

    /// Deletes the request whatever its status, so the recipient can also
    /// dissolve an accepted friendship.
    pub async fn reject(
        &self,
        id: FriendRequestId,
        actor: AccountId,
    ) -> Result<FriendRequest, RelationError> {
        let request = self.load(id).await?;
        let _guard = self.locks.lock_pair(request.sent_by, request.sent_to).await?;

        let request = self.load(id).await?;
        if request.sent_to != actor {
            return Err(RelationError::Forbidden);
        }

        self.requests.delete_request(id).await?;
        tracing::info!(
            request_id = %id,
            rejected_by = %actor,
            status = request.status.as_str(),
            "friend request rejected"
        );
        Ok(request)
    }

    async fn load(&self, id: FriendRequestId) -> Result<FriendRequest, RelationError> {
        self.requests
            .get_request(id)
            .await?
            .ok_or(RelationError::NotFound)
    }
}
