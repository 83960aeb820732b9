use super::util::{SqlFailure, bounded, decode_err};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, QueryBuilder, Row};
use std::collections::HashMap;
use std::time::Duration;

pub struct MySqlAccountRepo {
    pool: MySqlPool,
    timeout: Duration,
}

impl MySqlAccountRepo {
    pub fn new(pool: MySqlPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

fn to_account(row: &MySqlRow) -> Result<Account, SqlFailure> {
    let role: String = row
        .try_get("role")
        .map_err(|e| decode_err("role decode", e))?;
    Ok(Account {
        id: row.try_get("id").map_err(|e| decode_err("id decode", e))?,
        email: row
            .try_get("email")
            .map_err(|e| decode_err("email decode", e))?,
        name: row
            .try_get("name")
            .map_err(|e| decode_err("name decode", e))?,
        role: role.parse().map_err(|e| decode_err("role decode", e))?,
        created_on: row
            .try_get("created_on")
            .map_err(|e| decode_err("created_on decode", e))?,
    })
}

/// Escapes LIKE wildcards so the term only ever matches literally.
fn like_literal(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[async_trait::async_trait]
impl AccountRepo for MySqlAccountRepo {
    async fn insert_account(
        &self,
        email: &str,
        name: &str,
        role: Role,
        at: DateTime<Utc>,
    ) -> Result<Account, AccountError> {
        let email = email.to_lowercase();
        let res = bounded(
            self.timeout,
            "account insert",
            sqlx::query("INSERT INTO account (email, name, role, created_on) VALUES (?, ?, ?, ?)")
                .bind(&email)
                .bind(name)
                .bind(role.as_str())
                .bind(at)
                .execute(&self.pool),
        )
        .await?;

        let id = i64::try_from(res.last_insert_id())
            .map_err(|e| AccountError::Store(format!("account id: {e}")))?;
        Ok(Account {
            id: AccountId(id),
            email,
            name: name.to_owned(),
            role,
            created_on: at,
        })
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, AccountError> {
        let row = bounded(
            self.timeout,
            "account select",
            sqlx::query("SELECT id, email, name, role, created_on FROM account WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?;
        Ok(row.map(|r| to_account(&r)).transpose()?)
    }

    async fn get_accounts(
        &self,
        ids: &[AccountId],
    ) -> Result<HashMap<AccountId, Account>, AccountError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut qb: QueryBuilder<MySql> =
            QueryBuilder::new("SELECT id, email, name, role, created_on FROM account WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows = bounded(
            self.timeout,
            "account batch select",
            qb.build().fetch_all(&self.pool),
        )
        .await?;
        let mut accounts = HashMap::with_capacity(rows.len());
        for row in &rows {
            let account = to_account(row)?;
            accounts.insert(account.id, account);
        }
        Ok(accounts)
    }

    async fn search(
        &self,
        exclude: AccountId,
        query: Option<&str>,
    ) -> Result<Vec<Account>, AccountError> {
        let mut qb: QueryBuilder<MySql> =
            QueryBuilder::new("SELECT id, email, name, role, created_on FROM account WHERE id <> ");
        qb.push_bind(exclude);
        if let Some(term) = query {
            qb.push(" AND (LOWER(name) LIKE LOWER(");
            qb.push_bind(like_literal(term));
            qb.push(") OR email = LOWER(");
            qb.push_bind(term.to_owned());
            qb.push("))");
        }
        qb.push(" ORDER BY id");

        let rows = bounded(self.timeout, "account search", qb.build().fetch_all(&self.pool)).await?;
        rows.iter()
            .map(|r| to_account(r).map_err(AccountError::from))
            .collect()
    }

    async fn update_role(&self, id: AccountId, role: Role) -> Result<bool, AccountError> {
        let res = bounded(
            self.timeout,
            "role update",
            sqlx::query("UPDATE account SET role = ? WHERE id = ?")
                .bind(role.as_str())
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        if res.rows_affected() > 0 {
            return Ok(true);
        }
        // an unchanged row reports zero affected rows
        Ok(self.get_account(id).await?.is_some())
    }
}
