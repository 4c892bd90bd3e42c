//! Account endpoints and the session-layer view of the `accounts` table.

use api_types::{
    Currency,
    account::{ProfileView, PublicProfileView, RegisterNew},
};
use axum::{Extension, Json, extract::Path, extract::State, http::StatusCode};
use sea_orm::entity::prelude::*;

use crate::{ServerError, server::ServerState};
use engine::CreateAccountCmd;

/// Server-side mapping of the `accounts` table, used only to verify
/// credentials and attach the caller to the request. Balance mutations go
/// through the engine.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub password: String,
    pub balance_minor: i64,
    pub reputation: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn profile_view(account: engine::Account) -> ProfileView {
    ProfileView {
        id: account.id.to_string(),
        username: account.username,
        display_name: account.display_name,
        balance_minor: account.balance_minor,
        currency: Currency::Usdc,
        reputation: account.reputation,
        created_at: account.created_at,
    }
}

/// Provision a new account. The only route outside the session layer.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterNew>,
) -> Result<(StatusCode, Json<ProfileView>), ServerError> {
    let account = state
        .engine
        .create_account(CreateAccountCmd::with_defaults(
            payload.username,
            payload.display_name,
            payload.password,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(profile_view(account))))
}

/// The authenticated caller's own profile, balance included.
pub async fn profile(
    Extension(account): Extension<Model>,
    State(state): State<ServerState>,
) -> Result<Json<ProfileView>, ServerError> {
    let account = state.engine.profile(&account.id).await?;
    Ok(Json(profile_view(account)))
}

/// Public profile of another account, looked up by username.
///
/// Balances are private to their holder and never appear here.
pub async fn public_profile(
    Extension(_account): Extension<Model>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<Json<PublicProfileView>, ServerError> {
    let account = state.engine.resolve_by_username(&username).await?;
    Ok(Json(PublicProfileView {
        username: account.username,
        display_name: account.display_name,
        reputation: account.reputation,
        created_at: account.created_at,
    }))
}
