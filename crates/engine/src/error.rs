//! The module contains the error the engine can throw.
//!
//! Every rejected operation fails before any mutation becomes visible, so
//! none of these errors can leave a partial balance change behind.
//! [`Conflict`] is the one class a caller may retry blindly: it means the
//! database could not serialize the operation and nothing happened.
//!
//! [`Conflict`]: EngineError::Conflict
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid note: {0}")]
    InvalidNote(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Recipient not found: {0}")]
    RecipientNotFound(String),
    #[error("Cannot transfer to yourself: {0}")]
    SelfTransfer(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error("Conflict, retry the operation: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for EngineError {
    /// Lock and serialization failures become [`EngineError::Conflict`] so
    /// callers can tell "safe to retry, nothing happened" apart from real
    /// infrastructure errors. The match is on the driver message because
    /// sqlx reports busy/deadlock conditions that way for both sqlite and
    /// postgres.
    fn from(err: DbErr) -> Self {
        let message = err.to_string();
        if message.contains("database is locked")
            || message.contains("database table is locked")
            || message.contains("deadlock detected")
            || message.contains("could not serialize access")
        {
            EngineError::Conflict(message)
        } else {
            EngineError::Database(err)
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidNote(a), Self::InvalidNote(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::RecipientNotFound(a), Self::RecipientNotFound(b)) => a == b,
            (Self::SelfTransfer(a), Self::SelfTransfer(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_database_becomes_conflict() {
        let err = DbErr::Query(sea_orm::RuntimeErr::Internal(
            "error returned from database: database is locked".to_string(),
        ));
        assert!(matches!(EngineError::from(err), EngineError::Conflict(_)));
    }

    #[test]
    fn other_db_errors_stay_database() {
        let err = DbErr::Query(sea_orm::RuntimeErr::Internal(
            "no such table: accounts".to_string(),
        ));
        assert!(matches!(EngineError::from(err), EngineError::Database(_)));
    }
}
