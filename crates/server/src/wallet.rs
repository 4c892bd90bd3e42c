//! Wallet endpoints: balance reads and top-ups for the authenticated caller.

use api_types::{
    Currency,
    wallet::{BalanceView, NewBalance, TopUpNew},
};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, accounts, server::ServerState};
use engine::TopUpCmd;

pub async fn balance(
    Extension(account): Extension<accounts::Model>,
    State(state): State<ServerState>,
) -> Result<Json<BalanceView>, ServerError> {
    let balance_minor = state.engine.balance(&account.id).await?;
    Ok(Json(BalanceView {
        balance_minor,
        currency: Currency::Usdc,
    }))
}

/// Credit the caller's own wallet. Always self-service: the target account
/// is taken from the session, never from the payload.
pub async fn top_up(
    Extension(account): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TopUpNew>,
) -> Result<Json<NewBalance>, ServerError> {
    let balance_minor = state
        .engine
        .top_up(TopUpCmd {
            account_id: account.id,
            amount_minor: payload.amount_minor,
        })
        .await?;

    Ok(Json(NewBalance {
        balance_minor,
        currency: Currency::Usdc,
    }))
}
