use crate::application_port::{Identity, RelationError};
use crate::domain_model::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("account not found")]
    NotFound,
    #[error("email already registered")]
    EmailTaken,
    #[error("role {required} required")]
    InsufficientRole { required: Role },
    #[error("store error: {0}")]
    Store(String),
}

impl From<AccountError> for RelationError {
    fn from(error: AccountError) -> Self {
        match error {
            AccountError::NotFound => RelationError::AccountNotFound,
            AccountError::InsufficientRole { required } => {
                RelationError::InsufficientRole { required }
            }
            AccountError::EmailTaken => RelationError::StoreConflict(error.to_string()),
            AccountError::Store(e) => RelationError::StoreUnavailable(e),
        }
    }
}

#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Every account except the caller, optionally narrowed by a search term
    /// matched against the name (substring) or the email (exact).
    async fn find_users(
        &self,
        actor: &Identity,
        search: Option<&str>,
    ) -> Result<Vec<Account>, AccountError>;
    async fn change_role(
        &self,
        actor: &Identity,
        target: AccountId,
        role: Role,
    ) -> Result<Account, AccountError>;
}
