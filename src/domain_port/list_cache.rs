use crate::domain_model::AccountId;
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ListKind {
    Friends,
    Pending,
    Blocked,
}

impl ListKind {
    pub const ALL: [ListKind; 3] = [ListKind::Friends, ListKind::Pending, ListKind::Blocked];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Friends => "friends",
            ListKind::Pending => "pending",
            ListKind::Blocked => "blocked",
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct ListKey {
    pub account: AccountId,
    pub kind: ListKind,
}

impl ListKey {
    pub fn new(account: AccountId, kind: ListKind) -> Self {
        Self { account, kind }
    }
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.account, self.kind.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache store error: {0}")]
    Store(String),
    #[error("cache codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Serialized list responses keyed by (account, list kind).
#[async_trait::async_trait]
pub trait ListCache: Send + Sync {
    async fn get(&self, key: ListKey) -> Result<Option<String>, CacheError>;
    async fn put(&self, key: ListKey, value: String) -> Result<(), CacheError>;
    /// Drops every list kind cached for `account`.
    async fn invalidate(&self, account: AccountId) -> Result<(), CacheError>;
}
