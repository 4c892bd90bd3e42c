//! Per-account transaction history.

use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    EngineError, Perspective, ResultEngine, Transaction, accounts, transactions,
};

use super::Engine;

impl Engine {
    /// All records where the account is sender or recipient, most recent
    /// first (ties broken by reversed insertion order), each tagged with the
    /// account's perspective on it.
    ///
    /// The sequence is recomputed per call: absent new activity, repeated
    /// calls return identical results.
    pub async fn history(&self, account_id: &str) -> ResultEngine<Vec<(Transaction, Perspective)>> {
        if accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .is_none()
        {
            return Err(EngineError::KeyNotFound("account not exists".to_string()));
        }

        let models = transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::SenderId.eq(account_id))
                    .add(transactions::Column::RecipientId.eq(account_id)),
            )
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let tx = Transaction::try_from(model)?;
            let perspective = tx.perspective(account_id);
            out.push((tx, perspective));
        }
        Ok(out)
    }
}
