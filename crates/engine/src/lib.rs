//! Girata ledger engine.
//!
//! The engine owns the rules that govern how balances change and how
//! transaction records are written: accounts hold a non-negative balance in
//! minor units, top-ups mint value from the system, transfers move value
//! between two accounts, and every accepted operation leaves exactly one
//! immutable record in the ledger.
//!
//! The engine is stateless: it holds the injected [`sea_orm::DatabaseConnection`]
//! and runs every balance-changing operation inside a single database
//! transaction.

pub use accounts::Account;
pub use currency::Currency;
pub use error::EngineError;
pub use money::Money;
pub use ops::{
    CreateAccountCmd, Engine, EngineBuilder, LedgerStats, STARTING_BALANCE_MINOR,
    STARTING_REPUTATION, TopUpCmd, TransferCmd,
};
pub use transactions::{
    MAX_NOTE_LEN, Perspective, SYSTEM_SENDER, Transaction, TransactionKind, TransactionStatus,
};

mod accounts;
mod currency;
mod error;
mod money;
mod ops;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;
