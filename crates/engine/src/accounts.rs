//! The module contains the `Account` struct and its entity.
//!
//! An account is a user's ledger-visible identity: a unique username, a
//! display name, and a balance in minor units. The balance is mutated only
//! by the transfer operations in `ops`; it never goes below zero.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::EngineError;

/// A custodial wallet account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Stable identifier for this account.
    ///
    /// This is a UUID generated once at provisioning and never reused; the
    /// username can be changed administratively without breaking ledger
    /// references.
    pub id: Uuid,
    /// Unique, case-sensitive, human-chosen name used to address transfers.
    pub username: String,
    pub display_name: String,
    /// Balance in minor units. Invariant: never negative.
    pub balance_minor: i64,
    /// Informational score shown on profiles; not ledger-critical.
    pub reputation: i64,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        username: String,
        display_name: String,
        balance_minor: i64,
        reputation: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            display_name,
            balance_minor,
            reputation,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,
    pub display_name: String,
    /// Credential checked by the server's session layer; the engine never
    /// reads it.
    pub password: String,
    pub balance_minor: i64,
    pub reputation: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            username: ActiveValue::Set(value.username.clone()),
            display_name: ActiveValue::Set(value.display_name.clone()),
            password: ActiveValue::NotSet,
            balance_minor: ActiveValue::Set(value.balance_minor),
            reputation: ActiveValue::Set(value.reputation),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("account not exists".to_string()))?,
            username: model.username,
            display_name: model.display_name,
            balance_minor: model.balance_minor,
            reputation: model.reputation,
            created_at: model.created_at,
        })
    }
}
