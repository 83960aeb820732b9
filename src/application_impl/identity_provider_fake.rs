use crate::application_port::*;
use crate::domain_model::*;

/// Accepts `fake-access-token:<account id>[:<role>]`, role defaulting to
/// `Write`.
#[derive(Debug, Default)]
pub struct FakeIdentityProvider;

impl FakeIdentityProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn token_for(account: AccountId, role: Role) -> String {
        format!("fake-access-token:{account}:{role}")
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityError> {
        let rest = token
            .strip_prefix("fake-access-token:")
            .ok_or(IdentityError::TokenInvalid)?;
        let (id, role) = match rest.split_once(':') {
            Some((id, role)) => (id, role.parse().map_err(|_| IdentityError::TokenInvalid)?),
            None => (rest, Role::Write),
        };
        let account_id = id.parse().map_err(|_| IdentityError::TokenInvalid)?;
        Ok(Identity { account_id, role })
    }
}
