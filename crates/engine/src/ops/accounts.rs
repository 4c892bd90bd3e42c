//! Account store and directory operations.
//!
//! The account store is the only writer of balance values. The directory
//! side (username resolution, uniqueness) is read-mostly: it is written only
//! at provisioning time.

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, TransactionTrait, sea_query::Expr,
};

use crate::{Account, EngineError, ResultEngine, accounts};

use super::{Engine, normalize_username, with_tx};

/// Balance every freshly provisioned account starts with (1000.00 USDC).
pub const STARTING_BALANCE_MINOR: i64 = 100_000;

/// Reputation score assigned at provisioning.
pub const STARTING_REPUTATION: i64 = 75;

/// Provisioning command: creates an account before any ledger operation can
/// reference it.
#[derive(Clone, Debug)]
pub struct CreateAccountCmd {
    pub username: String,
    pub display_name: String,
    /// Stored for the server's session layer; opaque to the engine.
    pub password: String,
    pub starting_balance_minor: i64,
    pub reputation: i64,
}

impl CreateAccountCmd {
    /// Command with the standard starting balance and reputation.
    pub fn with_defaults(username: String, display_name: String, password: String) -> Self {
        Self {
            username,
            display_name,
            password,
            starting_balance_minor: STARTING_BALANCE_MINOR,
            reputation: STARTING_REPUTATION,
        }
    }
}

pub(super) async fn find_by_username<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> ResultEngine<Option<accounts::Model>> {
    let model = accounts::Entity::find()
        .filter(accounts::Column::Username.eq(username))
        .one(conn)
        .await?;
    Ok(model)
}

impl Engine {
    /// Provision a new account.
    ///
    /// Usernames are case-sensitive and unique; a duplicate fails with
    /// [`EngineError::ExistingKey`] and nothing is written.
    pub async fn create_account(&self, cmd: CreateAccountCmd) -> ResultEngine<Account> {
        let username = normalize_username(&cmd.username)?;
        if cmd.starting_balance_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "starting balance must not be negative".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            if find_by_username(&db_tx, &username).await?.is_some() {
                return Err(EngineError::ExistingKey(username));
            }

            let account = Account::new(
                username,
                cmd.display_name.trim().to_string(),
                cmd.starting_balance_minor,
                cmd.reputation,
            );
            let mut model = accounts::ActiveModel::from(&account);
            model.password = ActiveValue::Set(cmd.password);
            model.insert(&db_tx).await?;

            Ok(account)
        })
    }

    /// Current balance of an account, in minor units.
    pub async fn balance(&self, account_id: &str) -> ResultEngine<i64> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Ok(model.balance_minor)
    }

    /// Full profile of an account.
    pub async fn profile(&self, account_id: &str) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Account::try_from(model)
    }

    /// Resolve a username to its account (case-sensitive exact match).
    pub async fn resolve_by_username(&self, username: &str) -> ResultEngine<Account> {
        let model = find_by_username(&self.database, username)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Account::try_from(model)
    }

    /// Whether a username is already owned; used during provisioning.
    pub async fn is_username_taken(&self, username: &str) -> ResultEngine<bool> {
        Ok(find_by_username(&self.database, username).await?.is_some())
    }

    /// Apply `delta_minor` to an account balance and return the new balance.
    ///
    /// The mutation is one guarded UPDATE (`balance = balance + delta` with
    /// a `balance + delta >= 0` filter), so read-validate-adjust is a single
    /// atomic statement: two concurrent adjustments on the same account can
    /// never both read a stale balance. Zero rows affected means either the
    /// account is missing or the result would be negative; the follow-up
    /// lookup inside the same transaction disambiguates.
    pub(super) async fn adjust_balance(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: &str,
        delta_minor: i64,
    ) -> ResultEngine<i64> {
        let applied = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::BalanceMinor,
                Expr::col(accounts::Column::BalanceMinor).add(delta_minor),
            )
            .filter(accounts::Column::Id.eq(account_id))
            .filter(Expr::expr(Expr::col(accounts::Column::BalanceMinor).add(delta_minor)).gte(0))
            .exec(db_tx)
            .await?;

        if applied.rows_affected == 0 {
            return match accounts::Entity::find_by_id(account_id.to_string())
                .one(db_tx)
                .await?
            {
                None => Err(EngineError::KeyNotFound("account not exists".to_string())),
                Some(model) => Err(EngineError::InsufficientFunds(format!(
                    "balance {} cannot absorb {}",
                    model.balance_minor, delta_minor
                ))),
            };
        }

        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Ok(model.balance_minor)
    }
}
