use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug)]
struct State {
    accounts: BTreeMap<AccountId, Account>,
    requests: BTreeMap<FriendRequestId, FriendRequest>,
    blocks: BTreeMap<(AccountId, AccountId), BlockEdge>,
    next_account: i64,
    next_request: i64,
}

/// Single-process backend holding accounts, requests and block edges behind
/// one lock. Enforces the same uniqueness rules the MySQL schema does.
#[derive(Debug)]
pub struct MemoryRelationshipStore {
    state: RwLock<State>,
}

impl Default for MemoryRelationshipStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRelationshipStore {
    pub fn new() -> Self {
        Self::with_first_ids(1, 1)
    }

    /// Starts id sequences at the given values instead of 1.
    pub fn with_first_ids(first_account: i64, first_request: i64) -> Self {
        Self {
            state: RwLock::new(State {
                accounts: BTreeMap::new(),
                requests: BTreeMap::new(),
                blocks: BTreeMap::new(),
                next_account: first_account,
                next_request: first_request,
            }),
        }
    }
}

#[async_trait::async_trait]
impl FriendRequestRepo for MemoryRelationshipStore {
    async fn get_pending_request(
        &self,
        sent_by: AccountId,
        sent_to: AccountId,
    ) -> Result<Option<FriendRequest>, RelationError> {
        let state = self.state.read().await;
        Ok(state
            .requests
            .values()
            .find(|r| r.sent_by == sent_by && r.sent_to == sent_to && r.is_pending())
            .cloned())
    }

    async fn get_request(
        &self,
        id: FriendRequestId,
    ) -> Result<Option<FriendRequest>, RelationError> {
        Ok(self.state.read().await.requests.get(&id).cloned())
    }

    async fn insert_request(
        &self,
        sent_by: AccountId,
        sent_to: AccountId,
        at: DateTime<Utc>,
    ) -> Result<FriendRequest, RelationError> {
        let mut state = self.state.write().await;
        if state
            .requests
            .values()
            .any(|r| r.sent_by == sent_by && r.sent_to == sent_to && r.is_pending())
        {
            return Err(RelationError::StoreConflict(format!(
                "pending request {sent_by} -> {sent_to} already stored"
            )));
        }

        let id = FriendRequestId(state.next_request);
        state.next_request += 1;
        let request = FriendRequest {
            id,
            sent_by,
            sent_to,
            status: FriendRequestStatus::Pending,
            created_at: at,
            updated_at: at,
        };
        state.requests.insert(id, request.clone());
        Ok(request)
    }

    async fn update_status(
        &self,
        id: FriendRequestId,
        expected: FriendRequestStatus,
        status: FriendRequestStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RelationError> {
        let mut state = self.state.write().await;
        let request = state.requests.get_mut(&id).ok_or(RelationError::NotFound)?;
        if request.status != expected {
            return Err(RelationError::StoreConflict(format!(
                "request {id} is {}, expected {}",
                request.status.as_str(),
                expected.as_str()
            )));
        }
        request.status = status;
        request.updated_at = at;
        Ok(())
    }

    async fn delete_request(&self, id: FriendRequestId) -> Result<(), RelationError> {
        let mut state = self.state.write().await;
        state
            .requests
            .remove(&id)
            .map(|_| ())
            .ok_or(RelationError::NotFound)
    }

    async fn count_requests_since(
        &self,
        sender: AccountId,
        since: DateTime<Utc>,
    ) -> Result<u32, RelationError> {
        let state = self.state.read().await;
        let count = state
            .requests
            .values()
            .filter(|r| r.sent_by == sender && r.created_at >= since)
            .count();
        Ok(count as u32)
    }

    async fn list_accepted(&self, account: AccountId) -> Result<Vec<FriendRequest>, RelationError> {
        let state = self.state.read().await;
        let mut accepted: Vec<FriendRequest> = state
            .requests
            .values()
            .filter(|r| r.status == FriendRequestStatus::Accepted && r.involves(account))
            .cloned()
            .collect();
        accepted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(accepted)
    }

    async fn list_pending_incoming(
        &self,
        account: AccountId,
    ) -> Result<Vec<FriendRequest>, RelationError> {
        let state = self.state.read().await;
        let mut pending: Vec<FriendRequest> = state
            .requests
            .values()
            .filter(|r| r.is_pending() && r.sent_to == account)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(pending)
    }
}

#[async_trait::async_trait]
impl BlockRepo for MemoryRelationshipStore {
    async fn get_block_edge(
        &self,
        blocked_by: AccountId,
        blocked_user: AccountId,
    ) -> Result<Option<BlockEdge>, RelationError> {
        let state = self.state.read().await;
        Ok(state.blocks.get(&(blocked_by, blocked_user)).cloned())
    }

    async fn insert_block(
        &self,
        blocked_by: AccountId,
        blocked_user: AccountId,
        at: DateTime<Utc>,
    ) -> Result<BlockEdge, RelationError> {
        let mut state = self.state.write().await;
        if state.blocks.contains_key(&(blocked_by, blocked_user)) {
            return Err(RelationError::StoreConflict(format!(
                "block {blocked_by} -> {blocked_user} already stored"
            )));
        }
        let edge = BlockEdge {
            blocked_by,
            blocked_user,
            blocked_on: at,
        };
        state.blocks.insert((blocked_by, blocked_user), edge.clone());
        Ok(edge)
    }

    async fn delete_block(
        &self,
        blocked_by: AccountId,
        blocked_user: AccountId,
    ) -> Result<bool, RelationError> {
        let mut state = self.state.write().await;
        Ok(state.blocks.remove(&(blocked_by, blocked_user)).is_some())
    }

    async fn list_blocked(&self, blocked_by: AccountId) -> Result<Vec<BlockEdge>, RelationError> {
        let state = self.state.read().await;
        let mut edges: Vec<BlockEdge> = state
            .blocks
            .values()
            .filter(|e| e.blocked_by == blocked_by)
            .cloned()
            .collect();
        edges.sort_by(|a, b| {
            b.blocked_on
                .cmp(&a.blocked_on)
                .then(b.blocked_user.cmp(&a.blocked_user))
        });
        Ok(edges)
    }
}

#[async_trait::async_trait]
impl AccountRepo for MemoryRelationshipStore {
    async fn insert_account(
        &self,
        email: &str,
        name: &str,
        role: Role,
        at: DateTime<Utc>,
    ) -> Result<Account, AccountError> {
        let email = email.to_lowercase();
        let mut state = self.state.write().await;
        if state.accounts.values().any(|a| a.email == email) {
            return Err(AccountError::EmailTaken);
        }

        let id = AccountId(state.next_account);
        state.next_account += 1;
        let account = Account {
            id,
            email,
            name: name.to_owned(),
            role,
            created_on: at,
        };
        state.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, AccountError> {
        Ok(self.state.read().await.accounts.get(&id).cloned())
    }

    async fn get_accounts(
        &self,
        ids: &[AccountId],
    ) -> Result<HashMap<AccountId, Account>, AccountError> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.accounts.get(id).map(|a| (*id, a.clone())))
            .collect())
    }

    async fn search(
        &self,
        exclude: AccountId,
        query: Option<&str>,
    ) -> Result<Vec<Account>, AccountError> {
        let query = query.map(str::to_lowercase);
        let state = self.state.read().await;
        Ok(state
            .accounts
            .values()
            .filter(|a| a.id != exclude)
            .filter(|a| match &query {
                Some(q) => a.name.to_lowercase().contains(q) || a.email == *q,
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn update_role(&self, id: AccountId, role: Role) -> Result<bool, AccountError> {
        let mut state = self.state.write().await;
        match state.accounts.get_mut(&id) {
            Some(account) => {
                account.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
