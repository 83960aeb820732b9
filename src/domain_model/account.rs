use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(AccountId)
    }
}

/// Permission tier. Variants are declared in ascending order, so the derived
/// `Ord` doubles as the "superset of rights" relation.
#[derive(
    Debug, Clone, Copy, Default, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize,
)]
pub enum Role {
    #[default]
    Read,
    Write,
    Admin,
}

impl Role {
    pub fn meets(self, required: Role) -> bool {
        self >= required
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Read => "Read",
            Role::Write => "Write",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Read" => Ok(Role::Read),
            "Write" => Ok(Role::Write),
            "Admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_on: DateTime<Utc>,
}

/// Unordered pair of accounts, normalized so that `(a, b)` and `(b, a)`
/// produce the same value.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct AccountPair(AccountId, AccountId);

impl AccountPair {
    pub fn new(a: AccountId, b: AccountId) -> Self {
        if a < b { Self(a, b) } else { Self(b, a) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_hierarchy_is_ordered() {
        assert!(Role::Admin.meets(Role::Read));
        assert!(Role::Admin.meets(Role::Write));
        assert!(Role::Write.meets(Role::Read));
        assert!(Role::Read.meets(Role::Read));
        assert!(!Role::Read.meets(Role::Write));
        assert!(!Role::Write.meets(Role::Admin));
    }

    #[test]
    fn role_parses_its_own_name() {
        for role in [Role::Read, Role::Write, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn account_pair_ignores_direction() {
        let a = AccountId(7);
        let b = AccountId(3);
        assert_eq!(AccountPair::new(a, b), AccountPair::new(b, a));
        assert_ne!(AccountPair::new(a, b), AccountPair::new(a, AccountId(4)));
    }
}
