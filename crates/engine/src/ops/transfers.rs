//! Transfer engine: the two balance-changing operations.
//!
//! Each operation is a single database transaction: either the balance
//! adjustments and the ledger record all become visible together, or none
//! do. Validation failures abort before any mutation.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, EntityTrait, TransactionTrait};

use crate::{
    EngineError, ResultEngine, SYSTEM_SENDER, accounts,
    transactions::{self, TransactionKind, TransactionStatus},
};

use super::{Engine, accounts::find_by_username, normalize_note, with_tx};

/// Note recorded on every top-up.
const TOP_UP_NOTE: &str = "Wallet top-up";

/// Credit an account from outside the ledger (no debited party).
#[derive(Clone, Debug)]
pub struct TopUpCmd {
    pub account_id: String,
    pub amount_minor: i64,
}

/// Move value from the sender to the account owning `recipient_username`.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub sender_id: String,
    pub recipient_username: String,
    pub amount_minor: i64,
    pub note: Option<String>,
}

impl Engine {
    /// Top up an account and return its new balance.
    pub async fn top_up(&self, cmd: TopUpCmd) -> ResultEngine<i64> {
        if cmd.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let new_balance = self
                .adjust_balance(&db_tx, &cmd.account_id, cmd.amount_minor)
                .await?;

            let record = transactions::ActiveModel {
                id: ActiveValue::NotSet,
                sender_id: ActiveValue::Set(SYSTEM_SENDER.to_string()),
                recipient_id: ActiveValue::Set(cmd.account_id.clone()),
                amount_minor: ActiveValue::Set(cmd.amount_minor),
                note: ActiveValue::Set(TOP_UP_NOTE.to_string()),
                kind: ActiveValue::Set(TransactionKind::TopUp.as_str().to_string()),
                status: ActiveValue::Set(TransactionStatus::Completed.as_str().to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            };
            record.insert(&db_tx).await?;

            Ok(new_balance)
        })
    }

    /// Transfer to another account by username and return the sender's new
    /// balance.
    ///
    /// Checks are ordered so callers observe a fixed error precedence:
    /// amount validity, then recipient existence, then self-transfer, then
    /// balance sufficiency. The two balance adjustments are applied in
    /// ascending account-id order so two opposite transfers between the same
    /// pair cannot deadlock.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<i64> {
        if cmd.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        let note = normalize_note(cmd.note.as_deref())?;

        with_tx!(self, |db_tx| {
            let recipient = find_by_username(&db_tx, &cmd.recipient_username)
                .await?
                .ok_or_else(|| EngineError::RecipientNotFound(cmd.recipient_username.clone()))?;

            if recipient.id == cmd.sender_id {
                return Err(EngineError::SelfTransfer(recipient.username));
            }

            let sender = accounts::Entity::find_by_id(cmd.sender_id.clone())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
            if sender.balance_minor < cmd.amount_minor {
                return Err(EngineError::InsufficientFunds(format!(
                    "balance {} cannot absorb {}",
                    sender.balance_minor, -cmd.amount_minor
                )));
            }

            let sender_new_balance = if cmd.sender_id < recipient.id {
                let debited = self
                    .adjust_balance(&db_tx, &cmd.sender_id, -cmd.amount_minor)
                    .await?;
                self.adjust_balance(&db_tx, &recipient.id, cmd.amount_minor)
                    .await?;
                debited
            } else {
                self.adjust_balance(&db_tx, &recipient.id, cmd.amount_minor)
                    .await?;
                self.adjust_balance(&db_tx, &cmd.sender_id, -cmd.amount_minor)
                    .await?
            };

            let record = transactions::ActiveModel {
                id: ActiveValue::NotSet,
                sender_id: ActiveValue::Set(cmd.sender_id.clone()),
                recipient_id: ActiveValue::Set(recipient.id),
                amount_minor: ActiveValue::Set(cmd.amount_minor),
                note: ActiveValue::Set(note),
                kind: ActiveValue::Set(TransactionKind::Transfer.as_str().to_string()),
                status: ActiveValue::Set(TransactionStatus::Completed.as_str().to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            };
            record.insert(&db_tx).await?;

            Ok(sender_new_balance)
        })
    }
}
