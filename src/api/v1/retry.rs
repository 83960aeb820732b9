use crate::application_port::RelationError;
use std::time::Duration;

/// Retries transient store failures around one service call. Unavailable
/// stores get up to `attempts` tries in total; a conflict is retried once.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, RelationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RelationError>>,
    {
        let mut tries = 0;
        let mut conflicts = 0;
        loop {
            tries += 1;
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let again = err.is_retryable()
                && match &err {
                    RelationError::StoreConflict(_) => {
                        conflicts += 1;
                        conflicts == 1 && tries < self.attempts.max(2)
                    }
                    _ => tries < self.attempts,
                };
            if !again {
                return Err(err);
            }
            tracing::warn!(tries, error = %err, "retrying after store error");
            tokio::time::sleep(self.backoff * tries).await;
        }
    }
}
