use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Read access to the identity collaborator's account directory, plus the
/// few writes this service is allowed to make (seeding and role changes).
#[async_trait::async_trait]
pub trait AccountRepo: Send + Sync {
    async fn insert_account(
        &self,
        email: &str,
        name: &str,
        role: Role,
        at: DateTime<Utc>,
    ) -> Result<Account, AccountError>;

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, AccountError>;

    /// Missing ids are absent from the returned map.
    async fn get_accounts(
        &self,
        ids: &[AccountId],
    ) -> Result<HashMap<AccountId, Account>, AccountError>;

    /// All accounts except `exclude`. With a query, keeps accounts whose name
    /// contains it or whose email equals it, both case-insensitively.
    async fn search(
        &self,
        exclude: AccountId,
        query: Option<&str>,
    ) -> Result<Vec<Account>, AccountError>;

    /// Returns whether the account existed.
    async fn update_role(&self, id: AccountId, role: Role) -> Result<bool, AccountError>;
}
