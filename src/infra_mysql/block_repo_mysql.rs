use super::util::{bounded, decode_err};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use std::time::Duration;

pub struct MySqlBlockRepo {
    pool: MySqlPool,
    timeout: Duration,
}

impl MySqlBlockRepo {
    pub fn new(pool: MySqlPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait::async_trait]
impl BlockRepo for MySqlBlockRepo {
    async fn get_block_edge(
        &self,
        blocked_by: AccountId,
        blocked_user: AccountId,
    ) -> Result<Option<BlockEdge>, RelationError> {
        let row = bounded(
            self.timeout,
            "block select",
            sqlx::query(
                "SELECT blocked_on FROM blocked_user WHERE blocked_by = ? AND blocked_user = ?",
            )
            .bind(blocked_by)
            .bind(blocked_user)
            .fetch_optional(&self.pool),
        )
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(BlockEdge {
            blocked_by,
            blocked_user,
            blocked_on: row
                .try_get("blocked_on")
                .map_err(|e| decode_err("blocked_on decode", e))?,
        }))
    }

    async fn insert_block(
        &self,
        blocked_by: AccountId,
        blocked_user: AccountId,
        at: DateTime<Utc>,
    ) -> Result<BlockEdge, RelationError> {
        bounded(
            self.timeout,
            "block insert",
            sqlx::query(
                "INSERT INTO blocked_user (blocked_by, blocked_user, blocked_on) VALUES (?, ?, ?)",
            )
            .bind(blocked_by)
            .bind(blocked_user)
            .bind(at)
            .execute(&self.pool),
        )
        .await?;

        Ok(BlockEdge {
            blocked_by,
            blocked_user,
            blocked_on: at,
        })
    }

    async fn delete_block(
        &self,
        blocked_by: AccountId,
        blocked_user: AccountId,
    ) -> Result<bool, RelationError> {
        let res = bounded(
            self.timeout,
            "block delete",
            sqlx::query("DELETE FROM blocked_user WHERE blocked_by = ? AND blocked_user = ?")
                .bind(blocked_by)
                .bind(blocked_user)
                .execute(&self.pool),
        )
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_blocked(&self, blocked_by: AccountId) -> Result<Vec<BlockEdge>, RelationError> {
        let rows = bounded(
            self.timeout,
            "block list",
            sqlx::query(
                r#"
SELECT blocked_user, blocked_on FROM blocked_user
WHERE blocked_by = ?
ORDER BY blocked_on DESC, blocked_user DESC
"#,
            )
            .bind(blocked_by)
            .fetch_all(&self.pool),
        )
        .await?;

        let mut edges = Vec::with_capacity(rows.len());
        for row in rows {
            edges.push(BlockEdge {
                blocked_by,
                blocked_user: row
                    .try_get("blocked_user")
                    .map_err(|e| decode_err("blocked_user decode", e))?,
                blocked_on: row
                    .try_get("blocked_on")
                    .map_err(|e| decode_err("blocked_on decode", e))?,
            });
        }
        Ok(edges)
    }
}
