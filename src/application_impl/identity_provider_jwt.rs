use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub signing_key: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String, // account id
    #[serde(default)]
    role: Role,
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
}

/// Verifies HS256 access tokens minted by the identity collaborator.
pub struct JwtIdentityProvider {
    cfg: JwtConfig,
}

impl JwtIdentityProvider {
    pub fn new(cfg: JwtConfig) -> Self {
        Self { cfg }
    }

    /// Mints a token the way the identity collaborator does. Used by the
    /// demo binary and tests.
    pub fn issue(
        &self,
        account: AccountId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, IdentityError> {
        let ttl = chrono::Duration::from_std(self.cfg.access_ttl)
            .map_err(|_| IdentityError::TokenInvalid)?;
        let claims = AccessClaims {
            sub: account.to_string(),
            role,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.cfg.signing_key),
        )
        .map_err(|_| IdentityError::TokenInvalid)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityError> {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = true;
        v.leeway = 0;
        v.set_audience(&[self.cfg.audience.clone()]);
        v.set_issuer(&[self.cfg.issuer.clone()]);
        let data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(&self.cfg.signing_key),
            &v,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => IdentityError::TokenExpired,
            _ => IdentityError::TokenInvalid,
        })?;

        let account_id = data
            .claims
            .sub
            .parse()
            .map_err(|_| IdentityError::TokenInvalid)?;
        Ok(Identity {
            account_id,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(key: &[u8]) -> JwtIdentityProvider {
        JwtIdentityProvider::new(JwtConfig {
            issuer: "amity".into(),
            audience: "amity-api".into(),
            access_ttl: Duration::from_secs(900),
            signing_key: key.to_vec(),
        })
    }

    #[tokio::test]
    async fn issued_token_verifies_with_role() {
        let jwt = provider(b"secret");
        let token = jwt.issue(AccountId(42), Role::Admin, Utc::now()).unwrap();

        let identity = jwt.verify_token(&token).await.unwrap();
        assert_eq!(identity.account_id, AccountId(42));
        assert_eq!(identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn expired_and_foreign_tokens_are_refused() {
        let jwt = provider(b"secret");
        let long_ago = Utc::now() - chrono::Duration::hours(2);
        let expired = jwt.issue(AccountId(1), Role::Write, long_ago).unwrap();
        assert_eq!(
            jwt.verify_token(&expired).await.unwrap_err(),
            IdentityError::TokenExpired
        );

        let foreign = provider(b"other").issue(AccountId(1), Role::Write, Utc::now()).unwrap();
        assert_eq!(
            jwt.verify_token(&foreign).await.unwrap_err(),
            IdentityError::TokenInvalid
        );
        assert_eq!(
            jwt.verify_token("not-a-jwt").await.unwrap_err(),
            IdentityError::TokenInvalid
        );
    }
}
