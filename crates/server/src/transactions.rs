//! Transfer and history endpoints.

use api_types::{
    Currency,
    transaction::{
        HistoryResponse, Perspective as ApiPerspective, TransactionKind as ApiKind,
        TransactionStatus as ApiStatus, TransactionView, TransferNew,
    },
    wallet::NewBalance,
};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, accounts, server::ServerState};
use engine::TransferCmd;

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::TopUp => ApiKind::TopUp,
        engine::TransactionKind::Transfer => ApiKind::Transfer,
    }
}

fn map_status(status: engine::TransactionStatus) -> ApiStatus {
    match status {
        engine::TransactionStatus::Completed => ApiStatus::Completed,
        engine::TransactionStatus::Pending => ApiStatus::Pending,
        engine::TransactionStatus::Failed => ApiStatus::Failed,
    }
}

fn map_perspective(perspective: engine::Perspective) -> ApiPerspective {
    match perspective {
        engine::Perspective::Sent => ApiPerspective::Sent,
        engine::Perspective::Received => ApiPerspective::Received,
        engine::Perspective::ToppedUp => ApiPerspective::ToppedUp,
    }
}

/// Move funds from the caller to the account owning `recipient_username`.
pub async fn transfer_new(
    Extension(account): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<Json<NewBalance>, ServerError> {
    let balance_minor = state
        .engine
        .transfer(TransferCmd {
            sender_id: account.id,
            recipient_username: payload.recipient_username,
            amount_minor: payload.amount_minor,
            note: payload.note,
        })
        .await?;

    Ok(Json(NewBalance {
        balance_minor,
        currency: Currency::Usdc,
    }))
}

/// Full ledger history for the caller, newest first, each record labelled
/// from the caller's side.
pub async fn history(
    Extension(account): Extension<accounts::Model>,
    State(state): State<ServerState>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let records = state.engine.history(&account.id).await?;

    let transactions = records
        .into_iter()
        .map(|(tx, perspective)| TransactionView {
            id: tx.id,
            kind: map_kind(tx.kind),
            status: map_status(tx.status),
            perspective: map_perspective(perspective),
            sender_id: tx.sender_id,
            recipient_id: tx.recipient_id,
            amount_minor: tx.amount_minor,
            note: tx.note,
            created_at: tx.created_at,
        })
        .collect();

    Ok(Json(HistoryResponse { transactions }))
}
