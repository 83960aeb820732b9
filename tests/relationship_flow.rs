use amity::application_impl::{RealRelationshipService, RelationshipConfig};
use amity::application_port::{RelationError, RelationshipService};
use amity::domain_model::*;
use amity::domain_port::{AccountRepo, ManualTimeSource, TimeSource};
use amity::infra_memory::MemoryRelationshipStore;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;

struct Ledger {
    service: RealRelationshipService,
    clock: Arc<ManualTimeSource>,
}

fn start() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_717_000_000, 0).unwrap()
}

/// Accounts 1..=n, request ids starting at `first_request`.
async fn ledger(accounts: usize, first_request: i64) -> Ledger {
    let store = Arc::new(MemoryRelationshipStore::with_first_ids(1, first_request));
    for n in 1..=accounts {
        store
            .insert_account(
                &format!("user{n}@example.com"),
                &format!("User {n}"),
                Role::Write,
                start(),
            )
            .await
            .unwrap();
    }
    let clock = Arc::new(ManualTimeSource::new(start()));
    let service = RealRelationshipService::new(
        store.clone(),
        store.clone(),
        store,
        clock.clone(),
        RelationshipConfig::default(),
    );
    Ledger { service, clock }
}

const A: AccountId = AccountId(1);
const B: AccountId = AccountId(2);

#[tokio::test]
async fn repeated_send_is_a_duplicate() {
    let l = ledger(2, 1).await;
    l.service.send_request(A, B).await.unwrap();
    assert_eq!(
        l.service.send_request(A, B).await.unwrap_err(),
        RelationError::DuplicatePending
    );
}

#[tokio::test]
async fn reverse_send_is_reciprocal() {
    let l = ledger(2, 1).await;
    l.service.send_request(A, B).await.unwrap();
    assert_eq!(
        l.service.send_request(B, A).await.unwrap_err(),
        RelationError::ReciprocalPending
    );
}

#[tokio::test]
async fn fourth_send_within_a_minute_is_rate_limited() {
    let l = ledger(5, 1).await;
    for to in 2..=4 {
        l.service.send_request(A, AccountId(to)).await.unwrap();
        l.clock.advance(TimeDelta::seconds(15));
    }
    assert!(matches!(
        l.service.send_request(A, AccountId(5)).await.unwrap_err(),
        RelationError::RateLimited { .. }
    ));

    // the first request leaves the window 60s after it was sent
    l.clock.set(start() + TimeDelta::seconds(61));
    l.service.send_request(A, AccountId(5)).await.unwrap();
}

#[tokio::test]
async fn accept_is_for_the_recipient_and_happens_once() {
    let l = ledger(3, 1).await;
    let id = l.service.send_request(A, B).await.unwrap();

    assert_eq!(
        l.service.accept_request(id, A).await.unwrap_err(),
        RelationError::Forbidden
    );
    assert_eq!(
        l.service.accept_request(id, AccountId(3)).await.unwrap_err(),
        RelationError::Forbidden
    );
    l.service.accept_request(id, B).await.unwrap();
    assert_eq!(
        l.service.accept_request(id, B).await.unwrap_err(),
        RelationError::AlreadyAccepted
    );
}

#[tokio::test]
async fn block_refuses_sends_both_ways() {
    let l = ledger(2, 1).await;
    l.service.block_user(A, B).await.unwrap();

    assert_eq!(l.service.send_request(A, B).await.unwrap_err(), RelationError::Blocked);
    assert_eq!(l.service.send_request(B, A).await.unwrap_err(), RelationError::Blocked);
}

#[tokio::test]
async fn rejected_pair_can_send_again() {
    let l = ledger(2, 1).await;
    let id = l.service.send_request(A, B).await.unwrap();
    l.service.reject_request(id, B).await.unwrap();

    let again = l.service.send_request(A, B).await.unwrap();
    assert_ne!(again, id);
    assert_eq!(l.service.list_pending(B).await.unwrap().len(), 1);
}

#[tokio::test]
async fn friendship_is_listed_symmetrically() {
    let l = ledger(2, 1).await;
    let id = l.service.send_request(A, B).await.unwrap();
    l.service.accept_request(id, B).await.unwrap();

    let of_a = l.service.list_friends(A).await.unwrap();
    let of_b = l.service.list_friends(B).await.unwrap();
    assert_eq!(of_a.len(), 1);
    assert_eq!(of_b.len(), 1);
    assert_eq!(of_a[0].friend_id, B);
    assert_eq!(of_b[0].friend_id, A);
    assert_eq!(of_a[0].request_id, of_b[0].request_id);
}

#[tokio::test]
async fn accepted_request_keeps_its_id_and_dates_the_friendship() {
    let l = ledger(2, 100).await;

    let id = l.service.send_request(A, B).await.unwrap();
    assert_eq!(id, FriendRequestId(100));
    let pending = l.service.get_pending(B, id).await.unwrap();
    assert_eq!(pending.sender_id, A);

    l.clock.advance(TimeDelta::minutes(5));
    let t = l.clock.now();
    let accepted = l.service.accept_request(id, B).await.unwrap();
    assert_eq!(accepted.id, FriendRequestId(100));
    assert_eq!(accepted.status, FriendRequestStatus::Accepted);
    assert_eq!(accepted.updated_at, t);

    for (me, friend) in [(A, B), (B, A)] {
        let friends = l.service.list_friends(me).await.unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].friend_id, friend);
        assert_eq!(friends[0].friends_since, t);
    }
}

#[tokio::test]
async fn unblocking_reopens_sends() {
    let l = ledger(4, 1).await;
    let (three, four) = (AccountId(3), AccountId(4));

    l.service.block_user(three, four).await.unwrap();
    assert_eq!(
        l.service.send_request(four, three).await.unwrap_err(),
        RelationError::Blocked
    );

    let status = l.service.block_status(four, three).await.unwrap();
    assert!(status.blocked_by_user);
    assert!(!status.is_blocked);

    l.service.unblock_user(three, four).await.unwrap();
    l.service.send_request(four, three).await.unwrap();
}

#[tokio::test]
async fn blocking_leaves_existing_friendships_alone() {
    let l = ledger(2, 1).await;
    let id = l.service.send_request(A, B).await.unwrap();
    l.service.accept_request(id, B).await.unwrap();

    l.service.block_user(B, A).await.unwrap();

    assert_eq!(l.service.list_friends(A).await.unwrap().len(), 1);
    assert_eq!(l.service.list_blocked(B).await.unwrap()[0].blocked_user, A);
}

#[tokio::test]
async fn recipient_can_end_a_friendship_by_rejecting() {
    let l = ledger(2, 1).await;
    let id = l.service.send_request(A, B).await.unwrap();
    l.service.accept_request(id, B).await.unwrap();

    // the sender never gets to reject
    assert_eq!(
        l.service.reject_request(id, A).await.unwrap_err(),
        RelationError::Forbidden
    );
    l.service.reject_request(id, B).await.unwrap();
    assert!(l.service.list_friends(A).await.unwrap().is_empty());
    assert_eq!(
        l.service.get_friendship(A, id).await.unwrap_err(),
        RelationError::NotFound
    );
}

#[tokio::test]
async fn unknown_recipient_and_self_are_refused() {
    let l = ledger(1, 1).await;
    assert_eq!(
        l.service.send_request(A, A).await.unwrap_err(),
        RelationError::SelfRequest
    );
    assert_eq!(
        l.service.send_request(A, AccountId(77)).await.unwrap_err(),
        RelationError::AccountNotFound
    );
    assert_eq!(l.service.block_user(A, A).await.unwrap_err(), RelationError::SelfBlock);
}

#[tokio::test]
async fn blocking_an_unknown_account_is_refused() {
    let l = ledger(2, 1).await;
    assert_eq!(
        l.service.block_user(A, AccountId(999)).await.unwrap_err(),
        RelationError::AccountNotFound
    );
    assert!(l.service.list_blocked(A).await.unwrap().is_empty());
}
