use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::AccountRepo;
use std::sync::Arc;

pub struct RealAccountService {
    accounts: Arc<dyn AccountRepo>,
}

impl RealAccountService {
    pub fn new(accounts: Arc<dyn AccountRepo>) -> Self {
        Self { accounts }
    }
}

fn require(actor: &Identity, role: Role) -> Result<(), AccountError> {
    actor
        .require(role)
        .map_err(|_| AccountError::InsufficientRole { required: role })
}

#[async_trait::async_trait]
impl AccountService for RealAccountService {
    async fn find_users(
        &self,
        actor: &Identity,
        search: Option<&str>,
    ) -> Result<Vec<Account>, AccountError> {
        require(actor, Role::Read)?;
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.accounts.search(actor.account_id, search).await
    }

    async fn change_role(
        &self,
        actor: &Identity,
        target: AccountId,
        role: Role,
    ) -> Result<Account, AccountError> {
        require(actor, Role::Admin)?;
        if !self.accounts.update_role(target, role).await? {
            return Err(AccountError::NotFound);
        }
        tracing::info!(account = %target, role = %role, changed_by = %actor.account_id, "role changed");
        self.accounts
            .get_account(target)
            .await?
            .ok_or(AccountError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::MemoryRelationshipStore;
    use chrono::Utc;

    async fn setup() -> (RealAccountService, Vec<Account>) {
        let store = Arc::new(MemoryRelationshipStore::new());
        let mut accounts = Vec::new();
        for (email, name, role) in [
            ("ann@example.com", "Ann Lee", Role::Admin),
            ("bob@example.com", "Bob Annan", Role::Write),
            ("cid@example.com", "Cid", Role::Read),
        ] {
            accounts.push(
                store
                    .insert_account(email, name, role, Utc::now())
                    .await
                    .unwrap(),
            );
        }
        (RealAccountService::new(store), accounts)
    }

    fn identity(account: &Account) -> Identity {
        Identity {
            account_id: account.id,
            role: account.role,
        }
    }

    #[tokio::test]
    async fn find_users_excludes_caller_and_matches_name_or_email() {
        let (service, accounts) = setup().await;
        let ann = identity(&accounts[0]);

        let all = service.find_users(&ann, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|a| a.id != ann.account_id));

        let by_name = service.find_users(&ann, Some("ANN")).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Bob Annan");

        let by_email = service.find_users(&ann, Some("CID@example.com")).await.unwrap();
        assert_eq!(by_email.len(), 1);

        // partial emails do not match
        assert!(service.find_users(&ann, Some("cid@exa")).await.unwrap().is_empty());
        assert_eq!(service.find_users(&ann, Some("  ")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn change_role_requires_admin() {
        let (service, accounts) = setup().await;
        let bob = identity(&accounts[1]);
        let cid = accounts[2].id;

        assert_eq!(
            service.change_role(&bob, cid, Role::Write).await.unwrap_err(),
            AccountError::InsufficientRole {
                required: Role::Admin
            }
        );

        let ann = identity(&accounts[0]);
        let updated = service.change_role(&ann, cid, Role::Write).await.unwrap();
        assert_eq!(updated.role, Role::Write);
        assert_eq!(
            service
                .change_role(&ann, AccountId(404), Role::Read)
                .await
                .unwrap_err(),
            AccountError::NotFound
        );
    }
}
