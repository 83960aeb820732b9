use super::util::{SqlFailure, bounded, decode_err};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::time::Duration;

const REQUEST_COLUMNS: &str = "id, sent_by, sent_to, status, created_at, updated_at";

pub struct MySqlFriendRequestRepo {
    pool: MySqlPool,
    timeout: Duration,
}

impl MySqlFriendRequestRepo {
    pub fn new(pool: MySqlPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn fetch_one_where(
        &self,
        what: &str,
        clause: &str,
        binds: &[i64],
    ) -> Result<Option<FriendRequest>, RelationError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM friend_request WHERE {clause} LIMIT 1");
        let mut query = sqlx::query(&sql);
        for b in binds {
            query = query.bind(*b);
        }
        let row = bounded(self.timeout, what, query.fetch_optional(&self.pool)).await?;
        Ok(row.map(|r| to_request(&r)).transpose()?)
    }

    async fn fetch_all_where(
        &self,
        what: &str,
        clause: &str,
        binds: &[i64],
    ) -> Result<Vec<FriendRequest>, RelationError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM friend_request WHERE {clause}");
        let mut query = sqlx::query(&sql);
        for b in binds {
            query = query.bind(*b);
        }
        let rows = bounded(self.timeout, what, query.fetch_all(&self.pool)).await?;
        Ok(rows
            .iter()
            .map(to_request)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

fn to_request(row: &MySqlRow) -> Result<FriendRequest, SqlFailure> {
    let status: String = row
        .try_get("status")
        .map_err(|e| decode_err("status decode", e))?;
    Ok(FriendRequest {
        id: row.try_get("id").map_err(|e| decode_err("id decode", e))?,
        sent_by: row
            .try_get("sent_by")
            .map_err(|e| decode_err("sent_by decode", e))?,
        sent_to: row
            .try_get("sent_to")
            .map_err(|e| decode_err("sent_to decode", e))?,
        status: status
            .parse()
            .map_err(|e| decode_err("status decode", e))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| decode_err("created_at decode", e))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| decode_err("updated_at decode", e))?,
    })
}

#[async_trait::async_trait]
impl FriendRequestRepo for MySqlFriendRequestRepo {
    async fn get_pending_request(
        &self,
        sent_by: AccountId,
        sent_to: AccountId,
    ) -> Result<Option<FriendRequest>, RelationError> {
        self.fetch_one_where(
            "pending select",
            "sent_by = ? AND sent_to = ? AND status = 'pending'",
            &[sent_by.0, sent_to.0],
        )
        .await
    }

    async fn get_request(
        &self,
        id: FriendRequestId,
    ) -> Result<Option<FriendRequest>, RelationError> {
        self.fetch_one_where("request select", "id = ?", &[id.0]).await
    }

    async fn insert_request(
        &self,
        sent_by: AccountId,
        sent_to: AccountId,
        at: DateTime<Utc>,
    ) -> Result<FriendRequest, RelationError> {
        let res = bounded(
            self.timeout,
            "request insert",
            sqlx::query(
                r#"
INSERT INTO friend_request (sent_by, sent_to, status, created_at, updated_at)
VALUES (?, ?, 'pending', ?, ?)
"#,
            )
            .bind(sent_by)
            .bind(sent_to)
            .bind(at)
            .bind(at)
            .execute(&self.pool),
        )
        .await?;

        let id = i64::try_from(res.last_insert_id())
            .map_err(|e| RelationError::StoreUnavailable(format!("request id: {e}")))?;
        Ok(FriendRequest {
            id: FriendRequestId(id),
            sent_by,
            sent_to,
            status: FriendRequestStatus::Pending,
            created_at: at,
            updated_at: at,
        })
    }

    async fn update_status(
        &self,
        id: FriendRequestId,
        expected: FriendRequestStatus,
        status: FriendRequestStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RelationError> {
        let res = bounded(
            self.timeout,
            "status update",
            sqlx::query(
                r#"
UPDATE friend_request SET status = ?, updated_at = ?
WHERE id = ? AND status = ?
"#,
            )
            .bind(status.as_str())
            .bind(at)
            .bind(id)
            .bind(expected.as_str())
            .execute(&self.pool),
        )
        .await?;

        if res.rows_affected() == 1 {
            return Ok(());
        }
        match self.get_request(id).await? {
            None => Err(RelationError::NotFound),
            Some(current) => Err(RelationError::StoreConflict(format!(
                "request {id} is {}, expected {}",
                current.status.as_str(),
                expected.as_str()
            ))),
        }
    }

    async fn delete_request(&self, id: FriendRequestId) -> Result<(), RelationError> {
        let res = bounded(
            self.timeout,
            "request delete",
            sqlx::query("DELETE FROM friend_request WHERE id = ?")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        if res.rows_affected() == 0 {
            return Err(RelationError::NotFound);
        }
        Ok(())
    }

    async fn count_requests_since(
        &self,
        sender: AccountId,
        since: DateTime<Utc>,
    ) -> Result<u32, RelationError> {
        let row = bounded(
            self.timeout,
            "request count",
            sqlx::query(
                "SELECT COUNT(*) AS n FROM friend_request WHERE sent_by = ? AND created_at >= ?",
            )
            .bind(sender)
            .bind(since)
            .fetch_one(&self.pool),
        )
        .await?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| decode_err("count decode", e))?;
        Ok(u32::try_from(n).unwrap_or(u32::MAX))
    }

    async fn list_accepted(&self, account: AccountId) -> Result<Vec<FriendRequest>, RelationError> {
        self.fetch_all_where(
            "accepted list",
            "status = 'accepted' AND (sent_by = ? OR sent_to = ?) ORDER BY updated_at DESC, id DESC",
            &[account.0, account.0],
        )
        .await
    }

    async fn list_pending_incoming(
        &self,
        account: AccountId,
    ) -> Result<Vec<FriendRequest>, RelationError> {
        self.fetch_all_where(
            "pending list",
            "sent_to = ? AND status = 'pending' ORDER BY created_at DESC, id DESC",
            &[account.0],
        )
        .await
    }
}
