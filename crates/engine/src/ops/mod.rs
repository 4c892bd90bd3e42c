use sea_orm::DatabaseConnection;

use crate::{EngineError, MAX_NOTE_LEN, ResultEngine};

mod accounts;
mod history;
mod stats;
mod transfers;

pub use accounts::{CreateAccountCmd, STARTING_BALANCE_MINOR, STARTING_REPUTATION};
pub use stats::LedgerStats;
pub use transfers::{TopUpCmd, TransferCmd};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The ledger engine.
///
/// Stateless: balances live in the database and every mutating operation is
/// one DB transaction. Cloning the connection is cheap, so callers share a
/// single `Engine` behind an `Arc`.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_username(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount(
            "username must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn normalize_note(value: Option<&str>) -> ResultEngine<String> {
    let trimmed = value.unwrap_or_default().trim();
    if trimmed.chars().count() > MAX_NOTE_LEN {
        return Err(EngineError::InvalidNote(format!(
            "note must not exceed {MAX_NOTE_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
