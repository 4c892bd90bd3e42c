//! Whole-ledger aggregates.
//!
//! Used by the admin CLI and by the conservation tests: across any sequence
//! of operations, `total_balance_minor` may only grow by top-up amounts.

use sea_orm::{ConnectionTrait, Statement, Value};

use crate::{ResultEngine, TransactionKind};

use super::Engine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerStats {
    /// Sum of all account balances.
    pub total_balance_minor: i64,
    /// Sum of all top-up amounts ever recorded.
    pub total_topped_up_minor: i64,
    pub transfer_count: i64,
}

impl Engine {
    pub async fn statistics(&self) -> ResultEngine<LedgerStats> {
        let backend = self.database.get_database_backend();

        let total_balance_minor: i64 = {
            let stmt = Statement::from_string(
                backend,
                "SELECT COALESCE(SUM(balance_minor), 0) AS sum FROM accounts",
            );
            let row = self.database.query_one(stmt).await?;
            row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0)
        };

        let total_topped_up_minor: i64 = {
            let stmt = Statement::from_sql_and_values(
                backend,
                "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
                 FROM transactions \
                 WHERE kind = ?",
                vec![Value::from(TransactionKind::TopUp.as_str())],
            );
            let row = self.database.query_one(stmt).await?;
            row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0)
        };

        let transfer_count: i64 = {
            let stmt = Statement::from_sql_and_values(
                backend,
                "SELECT COUNT(*) AS cnt FROM transactions WHERE kind = ?",
                vec![Value::from(TransactionKind::Transfer.as_str())],
            );
            let row = self.database.query_one(stmt).await?;
            row.and_then(|r| r.try_get("", "cnt").ok()).unwrap_or(0)
        };

        Ok(LedgerStats {
            total_balance_minor,
            total_topped_up_minor,
            transfer_count,
        })
    }
}
