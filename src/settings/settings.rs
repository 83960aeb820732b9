use crate::domain_model::Role;
use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub store: Store,
    #[serde(default)]
    pub cache: Cache,
    pub identity: Identity,
    #[serde(default)]
    pub rate_limit: RateLimit,
    #[serde(default)]
    pub retry: Retry,
    #[serde(default)]
    pub seed: Vec<SeedAccount>,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    // plain HTTP unless both are set
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "mysql"
    pub mysql_dsn: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    #[serde(default)]
    pub apply_schema: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Cache {
    pub backend: String, // "none", "memory" or "redis"
    pub redis_dsn: Option<String>,
    pub prefix: String,
    pub ttl_secs: u64,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            backend: "none".into(),
            redis_dsn: None,
            prefix: "amity:lists".into(),
            ttl_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Identity {
    pub backend: String, // "fake" or "jwt"
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub audience: String,
    /// Name of the environment variable holding the HS256 key.
    #[serde(default = "default_signing_key_env")]
    pub signing_key_env: String,
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RateLimit {
    pub max_requests: u32,
    pub window_secs: i64,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_requests: 3,
            window_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Retry {
    pub attempts: u32,
    pub backoff_ms: u64,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_ms: 50,
        }
    }
}

/// Account created at startup when its email is not registered yet.
#[derive(Debug, Deserialize)]
pub struct SeedAccount {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

fn default_max_connections() -> u32 {
    10
}

fn default_timeout_ms() -> u64 {
    2_000
}

fn default_lock_timeout_ms() -> u64 {
    2_000
}

fn default_signing_key_env() -> String {
    "AMITY_JWT_SIGNING_KEY".into()
}

fn default_access_ttl_secs() -> u64 {
    15 * 60
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Loads the TOML file at `path` (or the build's default), then applies
/// `AMITY__SECTION__KEY` environment overrides.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::with_prefix("AMITY").prefix_separator("__").separator("__"))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
