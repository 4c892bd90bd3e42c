use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usdc,
}

pub mod account {
    use super::*;

    /// Request body for provisioning a new account.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterNew {
        pub username: String,
        pub display_name: String,
        pub password: String,
    }

    /// The authenticated caller's own profile.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileView {
        pub id: String,
        pub username: String,
        pub display_name: String,
        pub balance_minor: i64,
        pub currency: Currency,
        pub reputation: i64,
        pub created_at: DateTime<Utc>,
    }

    /// What any authenticated caller may see about another account.
    ///
    /// No balance: balances are private to their holder.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PublicProfileView {
        pub username: String,
        pub display_name: String,
        pub reputation: i64,
        pub created_at: DateTime<Utc>,
    }
}

pub mod wallet {
    use super::*;

    /// Request body for crediting the caller's own wallet.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TopUpNew {
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub balance_minor: i64,
        pub currency: Currency,
    }

    /// Response after a balance-changing operation.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct NewBalance {
        pub balance_minor: i64,
        pub currency: Currency,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        TopUp,
        Transfer,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Completed,
        Pending,
        Failed,
    }

    /// How a ledger record reads from the viewer's side.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Perspective {
        Sent,
        Received,
        ToppedUp,
    }

    /// Request body for moving funds to another account.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub recipient_username: String,
        pub amount_minor: i64,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i64,
        pub kind: TransactionKind,
        pub status: TransactionStatus,
        pub perspective: Perspective,
        pub sender_id: String,
        pub recipient_id: String,
        pub amount_minor: i64,
        pub note: String,
        pub created_at: DateTime<Utc>,
    }

    /// Full history for the authenticated caller, newest first.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryResponse {
        pub transactions: Vec<TransactionView>,
    }
}
