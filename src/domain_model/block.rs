use crate::domain_model::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Directed edge: `blocked_by` refuses interaction initiated toward or from
/// `blocked_user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEdge {
    pub blocked_by: AccountId,
    pub blocked_user: AccountId,
    pub blocked_on: DateTime<Utc>,
}

/// Block state between a viewer and a profile they look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStatus {
    /// The viewer blocked the subject.
    pub is_blocked: bool,
    /// The subject blocked the viewer.
    pub blocked_by_user: bool,
}
