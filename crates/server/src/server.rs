use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{accounts, transactions, wallet};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Session verifier: every request except `/register` must carry Basic
/// credentials matching an existing account. The matched account rides the
/// request as an extension, so handlers act only on behalf of the caller.
async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let account: Option<accounts::Model> = accounts::Entity::find()
        .filter(accounts::Column::Username.eq(auth_header.username()))
        .filter(accounts::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let account = if let Some(account) = account {
        account
    } else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/profile", get(accounts::profile))
        .route("/users/{username}", get(accounts::public_profile))
        .route("/balance", get(wallet::balance))
        .route("/wallet/topUp", post(wallet::top_up))
        .route("/transfer", post(transactions::transfer_new))
        .route("/transactions", get(transactions::history))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route("/register", post(accounts::register))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header;
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder()
            .database(db.clone())
            .build()
            .await
            .unwrap();

        router(ServerState {
            engine: Arc::new(engine),
            db,
        })
    }

    fn basic(username: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    async fn register(app: &Router, username: &str) -> Value {
        let (status, body) = send(
            app,
            "POST",
            "/register",
            None,
            Some(json!({
                "username": username,
                "display_name": format!("{username} Example"),
                "password": "pw",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn register_then_read_own_profile() {
        let app = test_router().await;
        let created = register(&app, "alice").await;
        assert_eq!(created["balance_minor"].as_i64(), Some(100_000));

        let auth = basic("alice", "pw");
        let (status, profile) = send(&app, "GET", "/profile", Some(&auth), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["id"], created["id"]);
        assert_eq!(profile["username"].as_str(), Some("alice"));
        assert_eq!(profile["balance_minor"].as_i64(), Some(100_000));
        assert_eq!(profile["currency"].as_str(), Some("USDC"));
        assert_eq!(profile["reputation"].as_i64(), Some(75));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let app = test_router().await;
        register(&app, "alice").await;

        let (status, _) = send(
            &app,
            "POST",
            "/register",
            None,
            Some(json!({
                "username": "alice",
                "display_name": "Alice Again",
                "password": "other",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn wrong_credentials_are_unauthorized() {
        let app = test_router().await;
        register(&app, "alice").await;

        let auth = basic("alice", "wrong");
        let (status, _) = send(&app, "GET", "/profile", Some(&auth), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let auth = basic("nobody", "pw");
        let (status, _) = send(&app, "GET", "/balance", Some(&auth), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn top_up_credits_own_wallet() {
        let app = test_router().await;
        register(&app, "alice").await;
        let auth = basic("alice", "pw");

        let (status, body) = send(
            &app,
            "POST",
            "/wallet/topUp",
            Some(&auth),
            Some(json!({ "amount_minor": 500 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance_minor"].as_i64(), Some(100_500));

        let (status, body) = send(&app, "GET", "/balance", Some(&auth), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance_minor"].as_i64(), Some(100_500));

        let (status, _) = send(
            &app,
            "POST",
            "/wallet/topUp",
            Some(&auth),
            Some(json!({ "amount_minor": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn transfer_moves_funds_and_reports_errors() {
        let app = test_router().await;
        register(&app, "alice").await;
        register(&app, "bob").await;
        let alice = basic("alice", "pw");
        let bob = basic("bob", "pw");

        let (status, body) = send(
            &app,
            "POST",
            "/transfer",
            Some(&alice),
            Some(json!({
                "recipient_username": "bob",
                "amount_minor": 20_000,
                "note": "lunch",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance_minor"].as_i64(), Some(80_000));

        let (status, body) = send(&app, "GET", "/balance", Some(&bob), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance_minor"].as_i64(), Some(120_000));

        let (status, _) = send(
            &app,
            "POST",
            "/transfer",
            Some(&alice),
            Some(json!({ "recipient_username": "nobody", "amount_minor": 100 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            "POST",
            "/transfer",
            Some(&alice),
            Some(json!({ "recipient_username": "alice", "amount_minor": 100 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(
            &app,
            "POST",
            "/transfer",
            Some(&alice),
            Some(json!({ "recipient_username": "bob", "amount_minor": 1_000_000 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn history_labels_records_from_the_caller_side() {
        let app = test_router().await;
        register(&app, "alice").await;
        register(&app, "bob").await;
        let alice = basic("alice", "pw");
        let bob = basic("bob", "pw");

        send(
            &app,
            "POST",
            "/wallet/topUp",
            Some(&alice),
            Some(json!({ "amount_minor": 500 })),
        )
        .await;
        send(
            &app,
            "POST",
            "/transfer",
            Some(&alice),
            Some(json!({ "recipient_username": "bob", "amount_minor": 200 })),
        )
        .await;

        let (status, body) = send(&app, "GET", "/transactions", Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        let transactions = body["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0]["kind"].as_str(), Some("transfer"));
        assert_eq!(transactions[0]["perspective"].as_str(), Some("sent"));
        assert_eq!(transactions[1]["kind"].as_str(), Some("top_up"));
        assert_eq!(transactions[1]["perspective"].as_str(), Some("topped_up"));
        assert_eq!(transactions[1]["sender_id"].as_str(), Some("system"));
        assert_eq!(transactions[0]["status"].as_str(), Some("completed"));

        let (status, body) = send(&app, "GET", "/transactions", Some(&bob), None).await;
        assert_eq!(status, StatusCode::OK);
        let transactions = body["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0]["perspective"].as_str(), Some("received"));
    }

    #[tokio::test]
    async fn public_profile_never_exposes_balance() {
        let app = test_router().await;
        register(&app, "alice").await;
        register(&app, "bob").await;
        let alice = basic("alice", "pw");

        let (status, body) = send(&app, "GET", "/users/bob", Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"].as_str(), Some("bob"));
        assert_eq!(body["reputation"].as_i64(), Some(75));
        assert!(body.get("balance_minor").is_none());
        assert!(body.get("id").is_none());

        let (status, _) = send(&app, "GET", "/users/nobody", Some(&alice), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
