use crate::application_port::{AccountError, RelationError};
use sqlx::mysql::MySqlDatabaseError;
use std::time::Duration;

const ER_DUP_ENTRY: u16 = 1062;
const ER_NO_REFERENCED_ROW_2: u16 = 1452;

fn mysql_error_number(err: &sqlx::Error) -> Option<u16> {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return Some(mysql_err.number());
        }
    }

    None
}

/// A failed statement, reduced to what the service layers can act on.
#[derive(Debug)]
pub enum SqlFailure {
    DupKey(String),
    /// A foreign key named a row that does not exist.
    MissingRef(String),
    Unavailable(String),
}

impl SqlFailure {
    fn from_sqlx(what: &str, err: sqlx::Error) -> Self {
        Self::classify(mysql_error_number(&err), format!("{what}: {err}"))
    }

    fn classify(number: Option<u16>, detail: String) -> Self {
        match number {
            Some(ER_DUP_ENTRY) => SqlFailure::DupKey(detail),
            Some(ER_NO_REFERENCED_ROW_2) => SqlFailure::MissingRef(detail),
            _ => SqlFailure::Unavailable(detail),
        }
    }
}

impl From<SqlFailure> for RelationError {
    fn from(failure: SqlFailure) -> Self {
        match failure {
            SqlFailure::DupKey(e) => RelationError::StoreConflict(e),
            SqlFailure::MissingRef(e) => {
                tracing::debug!(detail = %e, "foreign key miss");
                RelationError::AccountNotFound
            }
            SqlFailure::Unavailable(e) => RelationError::StoreUnavailable(e),
        }
    }
}

impl From<SqlFailure> for AccountError {
    fn from(failure: SqlFailure) -> Self {
        match failure {
            SqlFailure::DupKey(_) => AccountError::EmailTaken,
            SqlFailure::MissingRef(_) => AccountError::NotFound,
            SqlFailure::Unavailable(e) => AccountError::Store(e),
        }
    }
}

/// Runs one statement under `timeout`.
pub async fn bounded<T, F>(timeout: Duration, what: &str, fut: F) -> Result<T, SqlFailure>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(res) => res.map_err(|e| SqlFailure::from_sqlx(what, e)),
        Err(_) => Err(SqlFailure::Unavailable(format!(
            "{what}: timed out after {timeout:?}"
        ))),
    }
}

pub fn decode_err(what: &str, err: impl std::fmt::Display) -> SqlFailure {
    SqlFailure::Unavailable(format!("{what}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_foreign_row_is_not_retryable() {
        let failure = SqlFailure::classify(Some(1452), "block insert".into());
        let error = RelationError::from(failure);
        assert_eq!(error, RelationError::AccountNotFound);
        assert!(!error.is_retryable());
    }

    #[test]
    fn duplicate_and_unknown_errors_keep_their_kinds() {
        assert!(matches!(
            RelationError::from(SqlFailure::classify(Some(1062), "dup".into())),
            RelationError::StoreConflict(_)
        ));
        assert!(matches!(
            RelationError::from(SqlFailure::classify(None, "io".into())),
            RelationError::StoreUnavailable(_)
        ));
        assert!(matches!(
            AccountError::from(SqlFailure::classify(Some(1452), "fk".into())),
            AccountError::NotFound
        ));
    }
}
