use crate::application_port::RelationError;
use crate::domain_model::{AccountId, AccountPair};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
enum LockKey {
    Pair(AccountPair),
    Sender(AccountId),
}

/// Keyed async mutexes serializing transitions that touch the same accounts.
///
/// Lock order is fixed: a sender lock, when taken, is always acquired before
/// the pair lock, and nothing acquires a sender lock while holding a pair lock.
pub struct PairLocks {
    locks: DashMap<LockKey, Arc<Mutex<()>>>,
    timeout: Duration,
}

pub struct PairGuard<'a> {
    key: LockKey,
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a DashMap<LockKey, Arc<Mutex<()>>>,
}

impl Drop for PairGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // only the map itself still references an idle mutex
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl PairLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: DashMap::new(),
            timeout,
        }
    }

    /// Serializes every transition on the unordered pair `{a, b}`.
    pub async fn lock_pair(
        &self,
        a: AccountId,
        b: AccountId,
    ) -> Result<PairGuard<'_>, RelationError> {
        self.acquire(LockKey::Pair(AccountPair::new(a, b))).await
    }

    /// Serializes sends by one account, so its rate-limit window is counted
    /// and consumed without interleaving.
    pub async fn lock_sender(&self, sender: AccountId) -> Result<PairGuard<'_>, RelationError> {
        self.acquire(LockKey::Sender(sender)).await
    }

    async fn acquire(&self, key: LockKey) -> Result<PairGuard<'_>, RelationError> {
        let mutex = self.locks.entry(key).or_default().clone();
        let acquired = tokio::time::timeout(self.timeout, mutex.lock_owned()).await;
        match acquired {
            Ok(guard) => Ok(PairGuard {
                key,
                guard: Some(guard),
                locks: &self.locks,
            }),
            Err(_) => {
                self.locks
                    .remove_if(&key, |_, mutex| Arc::strong_count(mutex) == 1);
                Err(RelationError::StoreConflict(format!(
                    "timed out waiting for {key:?}"
                )))
            }
        }
    }

    #[cfg(test)]
    fn held(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pair_lock_ignores_direction() {
        let locks = PairLocks::new(Duration::from_millis(20));
        let _guard = locks.lock_pair(AccountId(1), AccountId(2)).await.unwrap();

        let err = locks.lock_pair(AccountId(2), AccountId(1)).await.err();
        assert!(matches!(err, Some(RelationError::StoreConflict(_))));
    }

    #[tokio::test]
    async fn unrelated_keys_do_not_contend() {
        let locks = PairLocks::new(Duration::from_millis(20));
        let _a = locks.lock_pair(AccountId(1), AccountId(2)).await.unwrap();
        let _b = locks.lock_pair(AccountId(1), AccountId(3)).await.unwrap();
        let _c = locks.lock_sender(AccountId(1)).await.unwrap();
    }

    #[tokio::test]
    async fn released_locks_are_evicted() {
        let locks = PairLocks::new(Duration::from_millis(20));
        {
            let _guard = locks.lock_pair(AccountId(1), AccountId(2)).await.unwrap();
            assert_eq!(locks.held(), 1);
        }
        assert_eq!(locks.held(), 0);

        let _again = locks.lock_pair(AccountId(1), AccountId(2)).await.unwrap();
    }

    #[tokio::test]
    async fn timed_out_waiter_does_not_pin_the_lock() {
        let locks = PairLocks::new(Duration::from_millis(20));
        let holder = locks.lock_sender(AccountId(9)).await.unwrap();
        assert!(locks.lock_sender(AccountId(9)).await.is_err());

        drop(holder);
        assert_eq!(locks.held(), 0);
    }
}
