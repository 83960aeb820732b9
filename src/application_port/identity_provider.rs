use crate::domain_model::{AccountId, Role};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("token invalid")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("role {required} required")]
    InsufficientRole { required: Role },
}

/// Authenticated caller, as vouched for by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub account_id: AccountId,
    pub role: Role,
}

impl Identity {
    pub fn require(&self, required: Role) -> Result<(), IdentityError> {
        if self.role.meets(required) {
            Ok(())
        } else {
            Err(IdentityError::InsufficientRole { required })
        }
    }
}

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityError>;
}
