use crate::application_port::RelationError;
use crate::domain_model::AccountId;
use crate::domain_port::{FriendRequestRepo, TimeSource};
use chrono::TimeDelta;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: TimeDelta,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 3,
            window: TimeDelta::seconds(60),
        }
    }
}

/// Sliding-window limit on friend requests per sender.
///
/// Holds no counters of its own: the window is recounted from the persisted
/// requests on every check, so it survives restarts and cannot drift from the
/// request log.
pub struct RateLimiter {
    requests: Arc<dyn FriendRequestRepo>,
    time: Arc<dyn TimeSource>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(
        requests: Arc<dyn FriendRequestRepo>,
        time: Arc<dyn TimeSource>,
        config: RateLimitConfig,
    ) -> Self {
        Self {
            requests,
            time,
            config,
        }
    }

    pub async fn check(&self, sender: AccountId) -> Result<(), RelationError> {
        let since = self.time.now() - self.config.window;
        let recent = self.requests.count_requests_since(sender, since).await?;
        if recent >= self.config.max_requests {
            return Err(RelationError::RateLimited {
                max_requests: self.config.max_requests,
                window_secs: self.config.window.num_seconds(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_port::ManualTimeSource;
    use crate::infra_memory::MemoryRelationshipStore;
    use chrono::{DateTime, Utc};

    fn setup() -> (Arc<MemoryRelationshipStore>, Arc<ManualTimeSource>, RateLimiter) {
        let store = Arc::new(MemoryRelationshipStore::new());
        let start = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let clock = Arc::new(ManualTimeSource::new(start));
        let limiter = RateLimiter::new(store.clone(), clock.clone(), RateLimitConfig::default());
        (store, clock, limiter)
    }

    #[tokio::test]
    async fn third_request_in_window_is_the_last_allowed() {
        let (store, clock, limiter) = setup();
        let sender = AccountId(1);

        for recipient in 2..=4 {
            limiter.check(sender).await.unwrap();
            store
                .insert_request(sender, AccountId(recipient), clock.now())
                .await
                .unwrap();
            clock.advance(TimeDelta::seconds(10));
        }

        let err = limiter.check(sender).await.unwrap_err();
        assert_eq!(
            err,
            RelationError::RateLimited {
                max_requests: 3,
                window_secs: 60
            }
        );
    }

    #[tokio::test]
    async fn window_slides_with_the_oldest_request() {
        let (store, clock, limiter) = setup();
        let sender = AccountId(1);
        let first_at = clock.now();

        for recipient in 2..=4 {
            store
                .insert_request(sender, AccountId(recipient), clock.now())
                .await
                .unwrap();
            clock.advance(TimeDelta::seconds(20));
        }
        // now = first + 60s: the first request is still inside the window
        assert_eq!(clock.now(), first_at + TimeDelta::seconds(60));
        assert!(limiter.check(sender).await.is_err());

        clock.advance(TimeDelta::seconds(1));
        limiter.check(sender).await.unwrap();
    }

    #[tokio::test]
    async fn other_senders_are_unaffected() {
        let (store, clock, limiter) = setup();
        for recipient in 2..=4 {
            store
                .insert_request(AccountId(1), AccountId(recipient), clock.now())
                .await
                .unwrap();
        }
        limiter.check(AccountId(2)).await.unwrap();
    }
}
