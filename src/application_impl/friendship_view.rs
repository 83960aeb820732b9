use crate::application_port::RelationError;
use crate::domain_model::*;
use crate::domain_port::{AccountRepo, FriendRequestRepo};
use std::collections::HashMap;
use std::sync::Arc;

/// Read-side projections of friend requests into per-account records.
pub struct FriendshipView {
    requests: Arc<dyn FriendRequestRepo>,
    accounts: Arc<dyn AccountRepo>,
}

fn friendship_record(
    request: &FriendRequest,
    me: AccountId,
    accounts: &HashMap<AccountId, Account>,
) -> Option<FriendshipRecord> {
    let friend = accounts.get(&request.other_participant(me)?)?;
    Some(FriendshipRecord {
        request_id: request.id,
        friend_id: friend.id,
        friend_name: friend.name.clone(),
        friend_email: friend.email.clone(),
        friends_since: request.updated_at,
    })
}

fn pending_record(
    request: &FriendRequest,
    accounts: &HashMap<AccountId, Account>,
) -> Option<PendingRecord> {
    let sender = accounts.get(&request.sent_by)?;
    Some(PendingRecord {
        request_id: request.id,
        sender_id: sender.id,
        sender_name: sender.name.clone(),
        sender_email: sender.email.clone(),
        sent_on: request.created_at,
    })
}

impl FriendshipView {
    pub fn new(requests: Arc<dyn FriendRequestRepo>, accounts: Arc<dyn AccountRepo>) -> Self {
        Self { requests, accounts }
    }

    pub async fn list_friends(
        &self,
        account: AccountId,
    ) -> Result<Vec<FriendshipRecord>, RelationError> {
        let accepted = self.requests.list_accepted(account).await?;
        let ids: Vec<AccountId> = accepted
            .iter()
            .filter_map(|r| r.other_participant(account))
            .collect();
        let accounts = self.accounts.get_accounts(&ids).await?;

        Ok(accepted
            .iter()
            .filter_map(|r| {
                let record = friendship_record(r, account, &accounts);
                if record.is_none() {
                    tracing::warn!(request_id = %r.id, "friend account missing, skipped");
                }
                record
            })
            .collect())
    }

    pub async fn list_pending(
        &self,
        account: AccountId,
    ) -> Result<Vec<PendingRecord>, RelationError> {
        let pending = self.requests.list_pending_incoming(account).await?;
        let ids: Vec<AccountId> = pending.iter().map(|r| r.sent_by).collect();
        let accounts = self.accounts.get_accounts(&ids).await?;

        Ok(pending
            .iter()
            .filter_map(|r| {
                let record = pending_record(r, &accounts);
                if record.is_none() {
                    tracing::warn!(request_id = %r.id, "sender account missing, skipped");
                }
                record
            })
            .collect())
    }

    /// A pending request addressed to `actor`.
    pub async fn pending(
        &self,
        actor: AccountId,
        id: FriendRequestId,
    ) -> Result<PendingRecord, RelationError> {
        let request = self.load(id).await?;
        if request.sent_to != actor {
            return Err(RelationError::Forbidden);
        }
        if !request.is_pending() {
            return Err(RelationError::NotFound);
        }
        let accounts = self.accounts.get_accounts(&[request.sent_by]).await?;
        pending_record(&request, &accounts).ok_or(RelationError::AccountNotFound)
    }

    /// An accepted request `actor` took part in, from either side.
    pub async fn friendship(
        &self,
        actor: AccountId,
        id: FriendRequestId,
    ) -> Result<FriendshipRecord, RelationError> {
        let request = self.load(id).await?;
        let Some(friend) = request.other_participant(actor) else {
            return Err(RelationError::Forbidden);
        };
        if request.is_pending() {
            return Err(RelationError::NotFound);
        }
        let accounts = self.accounts.get_accounts(&[friend]).await?;
        friendship_record(&request, actor, &accounts).ok_or(RelationError::AccountNotFound)
    }

    async fn load(&self, id: FriendRequestId) -> Result<FriendRequest, RelationError> {
        self.requests
            .get_request(id)
            .await?
            .ok_or(RelationError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::MemoryRelationshipStore;
    use chrono::{DateTime, TimeDelta, Utc};

    async fn seeded() -> (Arc<MemoryRelationshipStore>, FriendshipView, Vec<AccountId>) {
        let store = Arc::new(MemoryRelationshipStore::new());
        let at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let mut ids = Vec::new();
        for name in ["ann", "bob", "cid", "dee"] {
            let account = store
                .insert_account(&format!("{name}@example.com"), name, Role::Write, at)
                .await
                .unwrap();
            ids.push(account.id);
        }
        let view = FriendshipView::new(store.clone(), store.clone());
        (store, view, ids)
    }

    fn t(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + TimeDelta::seconds(secs)
    }

    #[tokio::test]
    async fn friends_are_seen_from_both_sides_most_recent_first() {
        let (store, view, ids) = seeded().await;
        let (ann, bob, cid) = (ids[0], ids[1], ids[2]);

        let r1 = store.insert_request(ann, bob, t(0)).await.unwrap();
        let r2 = store.insert_request(cid, ann, t(1)).await.unwrap();
        store
            .update_status(r1.id, FriendRequestStatus::Pending, FriendRequestStatus::Accepted, t(10))
            .await
            .unwrap();
        store
            .update_status(r2.id, FriendRequestStatus::Pending, FriendRequestStatus::Accepted, t(20))
            .await
            .unwrap();

        let friends = view.list_friends(ann).await.unwrap();
        let names: Vec<&str> = friends.iter().map(|f| f.friend_name.as_str()).collect();
        assert_eq!(names, ["cid", "bob"]);
        assert_eq!(friends[1].friends_since, t(10));

        let bobs = view.list_friends(bob).await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].friend_id, ann);
    }

    #[tokio::test]
    async fn pending_lists_only_incoming_newest_first() {
        let (store, view, ids) = seeded().await;
        let (ann, bob, cid, dee) = (ids[0], ids[1], ids[2], ids[3]);

        store.insert_request(bob, ann, t(0)).await.unwrap();
        store.insert_request(cid, ann, t(5)).await.unwrap();
        store.insert_request(ann, dee, t(9)).await.unwrap();

        let pending = view.list_pending(ann).await.unwrap();
        let senders: Vec<AccountId> = pending.iter().map(|p| p.sender_id).collect();
        assert_eq!(senders, [cid, bob]);
        assert_eq!(pending[0].sent_on, t(5));
    }

    #[tokio::test]
    async fn single_lookups_respect_participants_and_status() {
        let (store, view, ids) = seeded().await;
        let (ann, bob, cid) = (ids[0], ids[1], ids[2]);

        let request = store.insert_request(ann, bob, t(0)).await.unwrap();

        assert_eq!(view.pending(bob, request.id).await.unwrap().sender_id, ann);
        assert_eq!(view.pending(ann, request.id).await.unwrap_err(), RelationError::Forbidden);
        assert_eq!(view.friendship(ann, request.id).await.unwrap_err(), RelationError::NotFound);

        store
            .update_status(
                request.id,
                FriendRequestStatus::Pending,
                FriendRequestStatus::Accepted,
                t(3),
            )
            .await
            .unwrap();

        assert_eq!(view.pending(bob, request.id).await.unwrap_err(), RelationError::NotFound);
        assert_eq!(view.friendship(ann, request.id).await.unwrap().friend_id, bob);
        assert_eq!(view.friendship(bob, request.id).await.unwrap().friend_id, ann);
        assert_eq!(view.friendship(cid, request.id).await.unwrap_err(), RelationError::Forbidden);
    }
}
