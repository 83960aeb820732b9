use crate::api::v1::RetryPolicy;
use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::{SeedAccount, Settings};
use chrono::TimeDelta;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use std::time::Duration;

const SCHEMA: &str = include_str!("../../migrations/0001_relationships.sql");

pub struct Server {
    pub relationship_service: Arc<dyn RelationshipService>,
    pub account_service: Arc<dyn AccountService>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub retry: Arc<RetryPolicy>,
    pool: Option<Pool<MySql>>,
}

struct Stores {
    requests: Arc<dyn FriendRequestRepo>,
    blocks: Arc<dyn BlockRepo>,
    accounts: Arc<dyn AccountRepo>,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let stores = match settings.store.backend.as_str() {
            "memory" => {
                let store = Arc::new(MemoryRelationshipStore::new());
                Stores {
                    requests: store.clone(),
                    blocks: store.clone(),
                    accounts: store,
                    pool: None,
                }
            }
            "mysql" => {
                let dsn = settings
                    .store
                    .mysql_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("store.mysql_dsn is required for mysql"))?;
                let timeout = Duration::from_millis(settings.store.timeout_ms);
                let pool = MySqlPoolOptions::new()
                    .max_connections(settings.store.max_connections)
                    .acquire_timeout(timeout)
                    .connect(dsn)
                    .await?;
                if settings.store.apply_schema {
                    sqlx::raw_sql(SCHEMA).execute(&pool).await?;
                    info!("schema applied");
                }
                Stores {
                    requests: Arc::new(MySqlFriendRequestRepo::new(pool.clone(), timeout)),
                    blocks: Arc::new(MySqlBlockRepo::new(pool.clone(), timeout)),
                    accounts: Arc::new(MySqlAccountRepo::new(pool.clone(), timeout)),
                    pool: Some(pool),
                }
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        seed_accounts(stores.accounts.as_ref(), &settings.seed).await?;

        let cache: Option<Arc<dyn ListCache>> = match settings.cache.backend.as_str() {
            "none" => None,
            "memory" => Some(Arc::new(MemoryListCache::new(Duration::from_secs(
                settings.cache.ttl_secs,
            )))),
            "redis" => {
                let dsn = settings
                    .cache
                    .redis_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("cache.redis_dsn is required for redis"))?;
                let redis_client = redis::Client::open(dsn)?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Some(Arc::new(RedisListCache::new(
                    redis_manager,
                    settings.cache.prefix.clone(),
                    settings.cache.ttl_secs,
                )))
            }
            other => return Err(anyhow::anyhow!("Unknown cache backend: {}", other)),
        };

        let identity_provider: Arc<dyn IdentityProvider> =
            match settings.identity.backend.as_str() {
                "fake" => Arc::new(FakeIdentityProvider::new()),
                "jwt" => {
                    let key = std::env::var(&settings.identity.signing_key_env).map_err(|_| {
                        anyhow::anyhow!("{} is not set", settings.identity.signing_key_env)
                    })?;
                    Arc::new(JwtIdentityProvider::new(JwtConfig {
                        issuer: settings.identity.issuer.clone(),
                        audience: settings.identity.audience.clone(),
                        access_ttl: Duration::from_secs(settings.identity.access_ttl_secs),
                        signing_key: key.into_bytes(),
                    }))
                }
                other => return Err(anyhow::anyhow!("Unknown identity backend: {}", other)),
            };

        let config = RelationshipConfig {
            rate_limit: RateLimitConfig {
                max_requests: settings.rate_limit.max_requests,
                window: TimeDelta::seconds(settings.rate_limit.window_secs),
            },
            lock_timeout: Duration::from_millis(settings.store.lock_timeout_ms),
        };
        let retry = RetryPolicy {
            attempts: settings.retry.attempts.max(1),
            backoff: Duration::from_millis(settings.retry.backoff_ms),
        };

        let server = Self::assemble(
            stores,
            Arc::new(SystemTimeSource),
            config,
            cache,
            identity_provider,
            retry,
        );
        info!(
            store = %settings.store.backend,
            cache = %settings.cache.backend,
            identity = %settings.identity.backend,
            "server started"
        );
        Ok(server)
    }

    /// Memory-backed server with fake identities and no list cache.
    pub fn in_memory(
        store: Arc<MemoryRelationshipStore>,
        time: Arc<dyn TimeSource>,
        config: RelationshipConfig,
    ) -> Self {
        let stores = Stores {
            requests: store.clone(),
            blocks: store.clone(),
            accounts: store,
            pool: None,
        };
        Self::assemble(
            stores,
            time,
            config,
            None,
            Arc::new(FakeIdentityProvider::new()),
            RetryPolicy::default(),
        )
    }

    fn assemble(
        stores: Stores,
        time: Arc<dyn TimeSource>,
        config: RelationshipConfig,
        cache: Option<Arc<dyn ListCache>>,
        identity_provider: Arc<dyn IdentityProvider>,
        retry: RetryPolicy,
    ) -> Self {
        let real: Arc<dyn RelationshipService> = Arc::new(RealRelationshipService::new(
            stores.requests,
            stores.blocks,
            stores.accounts.clone(),
            time,
            config,
        ));
        let relationship_service: Arc<dyn RelationshipService> = match cache {
            Some(cache) => Arc::new(CachedRelationshipService::new(real, cache)),
            None => real,
        };
        let account_service: Arc<dyn AccountService> =
            Arc::new(RealAccountService::new(stores.accounts));

        Self {
            relationship_service,
            account_service,
            identity_provider,
            retry: Arc::new(retry),
            pool: stores.pool,
        }
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

async fn seed_accounts(accounts: &dyn AccountRepo, seeds: &[SeedAccount]) -> anyhow::Result<()> {
    for seed in seeds {
        match accounts
            .insert_account(&seed.email, &seed.name, seed.role, chrono::Utc::now())
            .await
        {
            Ok(account) => info!(id = %account.id, email = %account.email, "seeded account"),
            Err(AccountError::EmailTaken) => debug!(email = %seed.email, "seed account exists"),
            Err(e) => return Err(anyhow::anyhow!("seeding {}: {}", seed.email, e)),
        }
    }
    Ok(())
}
