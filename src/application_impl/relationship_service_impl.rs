use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RelationshipConfig {
    pub rate_limit: RateLimitConfig,
    /// Upper bound on waiting for another transition on the same pair.
    pub lock_timeout: Duration,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            lock_timeout: Duration::from_secs(2),
        }
    }
}

pub struct RealRelationshipService {
    machine: FriendRequestMachine,
    view: FriendshipView,
    blocks: Arc<BlockGuard>,
    accounts: Arc<dyn AccountRepo>,
    locks: Arc<PairLocks>,
}

impl RealRelationshipService {
    pub fn new(
        requests: Arc<dyn FriendRequestRepo>,
        blocks: Arc<dyn BlockRepo>,
        accounts: Arc<dyn AccountRepo>,
        time: Arc<dyn TimeSource>,
        config: RelationshipConfig,
    ) -> Self {
        let locks = Arc::new(PairLocks::new(config.lock_timeout));
        let blocks = Arc::new(BlockGuard::new(blocks, time.clone()));
        let limiter = RateLimiter::new(requests.clone(), time.clone(), config.rate_limit);
        let machine = FriendRequestMachine::new(
            requests.clone(),
            accounts.clone(),
            blocks.clone(),
            limiter,
            locks.clone(),
            time,
        );
        let view = FriendshipView::new(requests, accounts.clone());
        Self {
            machine,
            view,
            blocks,
            accounts,
            locks,
        }
    }
}

#[async_trait::async_trait]
impl RelationshipService for RealRelationshipService {
    async fn send_request(
        &self,
        sender: AccountId,
        recipient: AccountId,
    ) -> Result<FriendRequestId, RelationError> {
        self.machine.send(sender, recipient).await
    }

    async fn accept_request(
        &self,
        request: FriendRequestId,
        actor: AccountId,
    ) -> Result<FriendRequest, RelationError> {
        self.machine.accept(request, actor).await
    }

    async fn reject_request(
        &self,
        request: FriendRequestId,
        actor: AccountId,
    ) -> Result<FriendRequest, RelationError> {
        self.machine.reject(request, actor).await
    }

    async fn block_user(
        &self,
        blocker: AccountId,
        target: AccountId,
    ) -> Result<(), RelationError> {
        if blocker == target {
            return Err(RelationError::SelfBlock);
        }
        if self.accounts.get_account(target).await?.is_none() {
            return Err(RelationError::AccountNotFound);
        }
        let _guard = self.locks.lock_pair(blocker, target).await?;
        self.blocks.block(blocker, target).await?;
        tracing::info!(blocked_by = %blocker, blocked_user = %target, "account blocked");
        Ok(())
    }

    async fn unblock_user(
        &self,
        blocker: AccountId,
        target: AccountId,
    ) -> Result<(), RelationError> {
        let _guard = self.locks.lock_pair(blocker, target).await?;
        self.blocks.unblock(blocker, target).await?;
        tracing::info!(blocked_by = %blocker, blocked_user = %target, "account unblocked");
        Ok(())
    }

    async fn list_friends(
        &self,
        account: AccountId,
    ) -> Result<Vec<FriendshipRecord>, RelationError> {
        self.view.list_friends(account).await
    }

    async fn list_pending(&self, account: AccountId) -> Result<Vec<PendingRecord>, RelationError> {
        self.view.list_pending(account).await
    }

    async fn get_pending(
        &self,
        actor: AccountId,
        request: FriendRequestId,
    ) -> Result<PendingRecord, RelationError> {
        self.view.pending(actor, request).await
    }

    async fn get_friendship(
        &self,
        actor: AccountId,
        request: FriendRequestId,
    ) -> Result<FriendshipRecord, RelationError> {
        self.view.friendship(actor, request).await
    }

    async fn list_blocked(&self, account: AccountId) -> Result<Vec<BlockEdge>, RelationError> {
        self.blocks.list(account).await
    }

    async fn block_status(
        &self,
        viewer: AccountId,
        subject: AccountId,
    ) -> Result<BlockStatus, RelationError> {
        self.blocks.status(viewer, subject).await
    }
}
