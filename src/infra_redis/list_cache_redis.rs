use crate::domain_model::AccountId;
use crate::domain_port::*;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Lists stored as JSON strings under `{prefix}:{account}:{kind}` with a TTL.
pub struct RedisListCache {
    conn: ConnectionManager,
    prefix: String,
    ttl_secs: u64,
}

impl RedisListCache {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>, ttl_secs: u64) -> Self {
        RedisListCache {
            conn,
            prefix: prefix.into(),
            ttl_secs,
        }
    }

    fn key(&self, key: ListKey) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

#[async_trait::async_trait]
impl ListCache for RedisListCache {
    async fn get(&self, key: ListKey) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get(self.key(key))
            .await
            .map_err(|e| CacheError::Store(e.to_string()))
    }

    async fn put(&self, key: ListKey, value: String) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(self.key(key), value, self.ttl_secs)
            .await
            .map_err(|e| CacheError::Store(e.to_string()))?;
        Ok(())
    }

    async fn invalidate(&self, account: AccountId) -> Result<(), CacheError> {
        let keys: Vec<String> = ListKind::ALL
            .into_iter()
            .map(|kind| self.key(ListKey::new(account, kind)))
            .collect();
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(keys)
            .await
            .map_err(|e| CacheError::Store(e.to_string()))?;
        Ok(())
    }
}
