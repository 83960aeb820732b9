//! Walks the ledger through a few friend-request and block scenarios on the
//! in-memory backend with a manual clock.
//!
//! $ cargo run --bin ledger_demo

use amity::application_impl::*;
use amity::application_port::*;
use amity::domain_model::*;
use amity::domain_port::*;
use amity::infra_memory::*;
use amity::logger::*;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    logger.reload_from_config(&LogConfig {
        filter: "debug".to_string(),
    })?;

    let start = DateTime::<Utc>::from_timestamp(1_717_000_000, 0)
        .ok_or_else(|| anyhow::anyhow!("bad start time"))?;
    let clock = Arc::new(ManualTimeSource::new(start));
    let store = Arc::new(MemoryRelationshipStore::with_first_ids(1, 100));
    for name in ["ann", "bob", "cid", "dee", "eve"] {
        store
            .insert_account(&format!("{name}@example.com"), name, Role::Write, start)
            .await?;
    }

    let service = RealRelationshipService::new(
        store.clone(),
        store.clone(),
        store,
        clock.clone(),
        RelationshipConfig::default(),
    );
    let (ann, bob, cid, dee, eve) = (
        AccountId(1),
        AccountId(2),
        AccountId(3),
        AccountId(4),
        AccountId(5),
    );

    // request, accept, list from both sides
    let id = service.send_request(ann, bob).await?;
    info!(%id, "ann -> bob");
    clock.advance(TimeDelta::seconds(30));
    let accepted = service.accept_request(id, bob).await?;
    info!(status = accepted.status.as_str(), at = %accepted.updated_at, "bob accepted");
    for who in [ann, bob] {
        for friend in service.list_friends(who).await? {
            info!(%who, friend = %friend.friend_name, since = %friend.friends_since, "friend");
        }
    }

    // duplicate and reciprocal sends
    service.send_request(cid, dee).await?;
    report("cid -> dee again", service.send_request(cid, dee).await);
    report("dee -> cid", service.send_request(dee, cid).await);

    // block, refused send, unblock
    service.block_user(cid, eve).await?;
    report("eve -> cid while blocked", service.send_request(eve, cid).await);
    service.unblock_user(cid, eve).await?;
    report("eve -> cid after unblock", service.send_request(eve, cid).await);

    // sliding window: ann already sent one request 30s ago
    report("ann -> cid", service.send_request(ann, cid).await);
    report("ann -> dee", service.send_request(ann, dee).await);
    report("ann -> eve", service.send_request(ann, eve).await);
    clock.advance(TimeDelta::seconds(31));
    report("ann -> eve after the first left the window", service.send_request(ann, eve).await);

    Ok(())
}

fn report(what: &str, result: Result<FriendRequestId, RelationError>) {
    match result {
        Ok(id) => info!(%id, "{what}: sent"),
        Err(e) => warn!(code = e.code(), "{what}: {e}"),
    }
}
