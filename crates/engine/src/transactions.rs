//! Transaction record primitives.
//!
//! A `Transaction` is one immutable ledger row: it references exactly two
//! parties (sender and recipient) and a positive amount. Records are never
//! updated or deleted once written; the auto-increment id makes creation
//! order recoverable.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Reserved sender identity for top-ups: the value is minted, not moved, so
/// no real account is debited.
pub const SYSTEM_SENDER: &str = "system";

/// Upper bound on the free-text note attached to a transfer.
pub const MAX_NOTE_LEN: usize = 280;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    TopUp,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopUp => "top_up",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "top_up" => Ok(Self::TopUp),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// Settlement status of a record.
///
/// This engine only ever writes `Completed`; `Pending` and `Failed` are
/// reserved for asynchronous settlement and kept in the schema so old
/// readers will not choke on them later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

/// Classification of a record relative to a viewing account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    Sent,
    Received,
    ToppedUp,
}

impl Perspective {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Received => "received",
            Self::ToppedUp => "topped_up",
        }
    }
}

/// One immutable ledger record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Monotonically assigned id; creation order is recoverable from it.
    pub id: i64,
    /// Account id of the debited party, or [`SYSTEM_SENDER`] for top-ups.
    pub sender_id: String,
    pub recipient_id: String,
    pub amount_minor: i64,
    pub note: String,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// How `viewer_id` relates to this record.
    ///
    /// A top-up viewed by its own recipient is `ToppedUp`, never `Received`:
    /// the money came from outside, not from a peer.
    pub fn perspective(&self, viewer_id: &str) -> Perspective {
        if self.kind == TransactionKind::TopUp && self.recipient_id == viewer_id {
            return Perspective::ToppedUp;
        }
        if self.sender_id == viewer_id {
            return Perspective::Sent;
        }
        Perspective::Received
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub sender_id: String,
    pub recipient_id: String,
    pub amount_minor: i64,
    pub note: String,
    pub kind: String,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            sender_id: model.sender_id,
            recipient_id: model.recipient_id,
            amount_minor: model.amount_minor,
            note: model.note,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            status: TransactionStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(kind: TransactionKind, sender: &str, recipient: &str) -> Transaction {
        Transaction {
            id: 1,
            sender_id: sender.to_string(),
            recipient_id: recipient.to_string(),
            amount_minor: 500,
            note: String::new(),
            kind,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn transfer_perspectives() {
        let tx = record(TransactionKind::Transfer, "a", "b");
        assert_eq!(tx.perspective("a"), Perspective::Sent);
        assert_eq!(tx.perspective("b"), Perspective::Received);
    }

    #[test]
    fn own_top_up_is_topped_up_not_received() {
        let tx = record(TransactionKind::TopUp, SYSTEM_SENDER, "a");
        assert_eq!(tx.perspective("a"), Perspective::ToppedUp);
    }
}
