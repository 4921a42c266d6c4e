use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use axum::{Extension, extract::Query, http::StatusCode, response::IntoResponse};
use serde_json::Value;

use spotrelay::api;
use spotrelay::error::AuthFailure;
use spotrelay::management::{MemoryStore, SessionRegistry, TokenManager};
use spotrelay::server::AppState;
use spotrelay::spotify::auth::TokenExchange;
use spotrelay::spotify::player::{PlayerApi, PlayerCommand, PlayerReply};
use spotrelay::types::TokenGrant;

// Accounts service stand-in: accepts any code except "bad-code".
struct FakeExchange;

#[async_trait]
impl TokenExchange for FakeExchange {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AuthFailure> {
        if code == "bad-code" {
            return Err(AuthFailure::ExchangeRejected("invalid_grant".to_string()));
        }
        Ok(TokenGrant {
            access_token: "code-access".to_string(),
            refresh_token: Some("code-refresh".to_string()),
            expires_in: 3600,
            scope: None,
        })
    }

    async fn exchange_refresh(&self, _refresh_token: &str) -> Result<TokenGrant, AuthFailure> {
        Ok(TokenGrant {
            access_token: "minted".to_string(),
            refresh_token: None,
            expires_in: 3600,
            scope: None,
        })
    }
}

// Player endpoint stand-in: 204 for everything.
struct FakePlayer;

#[async_trait]
impl PlayerApi for FakePlayer {
    async fn send(
        &self,
        _token: &str,
        _command: &PlayerCommand,
    ) -> Result<PlayerReply, AuthFailure> {
        Ok(PlayerReply::NoContent)
    }
}

fn app_state() -> Arc<AppState> {
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(SessionRegistry::new(store, None));
    let exchange: Arc<dyn TokenExchange> = Arc::new(FakeExchange);
    let player: Arc<dyn PlayerApi> = Arc::new(FakePlayer);
    let tokens = Arc::new(TokenManager::new(
        Arc::clone(&registry),
        Arc::clone(&exchange),
        60,
    ));
    Arc::new(AppState {
        registry,
        tokens,
        exchange,
        player,
    })
}

fn query(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
    Query(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_callback_completes_login_and_redirects() {
    let state = app_state();
    let session = state.registry.create(None).await;

    let response = api::callback(
        query(&[("code", "abc"), ("state", session.session_id.as_str())]),
        Extension(state.clone()),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response
        .headers()
        .get(axum::http::header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.contains(&format!("session_id={}", session.session_id)));
    assert!(location.contains("access_token=code-access"));

    // The session now carries the token pair
    let stored = state.registry.get(&session.session_id).await.unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("code-access"));
    assert_eq!(stored.refresh_token.as_deref(), Some("code-refresh"));
}

#[tokio::test]
async fn test_callback_honors_redirect_hint() {
    let state = app_state();
    let session = state.registry.create(Some("/player".to_string())).await;

    let response = api::callback(
        query(&[("code", "abc"), ("state", session.session_id.as_str())]),
        Extension(state),
    )
    .await
    .into_response();

    let location = response
        .headers()
        .get(axum::http::header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("/player#"));
}

#[tokio::test]
async fn test_callback_with_unknown_state_is_unauthorized() {
    let state = app_state();

    let response = api::callback(
        query(&[("code", "abc"), ("state", "nope")]),
        Extension(state),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_callback_with_provider_error_is_bad_request() {
    let state = app_state();

    let response = api::callback(query(&[("error", "access_denied")]), Extension(state))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("access_denied"));
}

#[tokio::test]
async fn test_callback_rejected_code_is_terminal() {
    let state = app_state();
    let session = state.registry.create(None).await;

    let response = api::callback(
        query(&[("code", "bad-code"), ("state", session.session_id.as_str())]),
        Extension(state.clone()),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    // The session remains pending; no token material was stored
    let stored = state.registry.get(&session.session_id).await.unwrap();
    assert!(stored.access_token.is_none());
}

#[tokio::test]
async fn test_token_route_is_unauthorized_before_callback() {
    let state = app_state();
    let session = state.registry.create(None).await;

    let response = api::token(
        query(&[("session_id", session.session_id.as_str())]),
        Extension(state),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_token_route_returns_access_token() {
    let state = app_state();
    let session = state.registry.create(None).await;
    api::callback(
        query(&[("code", "abc"), ("state", session.session_id.as_str())]),
        Extension(state.clone()),
    )
    .await;

    let response = api::token(
        query(&[("session_id", session.session_id.as_str())]),
        Extension(state),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["access_token"], "code-access");
}

#[tokio::test]
async fn test_seek_answers_success() {
    let state = app_state();
    let session = state.registry.create(None).await;
    api::callback(
        query(&[("code", "abc"), ("state", session.session_id.as_str())]),
        Extension(state.clone()),
    )
    .await;

    let response = api::seek(
        query(&[
            ("session_id", session.session_id.as_str()),
            ("position", "30000"),
        ]),
        Extension(state),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_seek_requires_numeric_position() {
    let state = app_state();

    let response = api::seek(
        query(&[("session_id", "s1"), ("position", "later")]),
        Extension(state),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_current_playback_reports_no_device_without_failing() {
    let state = app_state();
    let session = state.registry.create(None).await;
    api::callback(
        query(&[("code", "abc"), ("state", session.session_id.as_str())]),
        Extension(state.clone()),
    )
    .await;

    // Upstream 204 on the state query is informational, not an error
    let response = api::current_playback(
        query(&[("session_id", session.session_id.as_str())]),
        Extension(state),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("No active device"));
}

#[tokio::test]
async fn test_session_status_shapes() {
    let state = app_state();

    let unknown = api::session_status(query(&[("session_id", "nope")]), Extension(state.clone()))
        .await;
    assert!(!unknown.0.valid);

    let session = state.registry.create(None).await;
    let pending = api::session_status(
        query(&[("session_id", session.session_id.as_str())]),
        Extension(state.clone()),
    )
    .await;
    assert!(pending.0.valid);
    assert!(!pending.0.token_valid);
    assert!(!pending.0.can_refresh);

    api::callback(
        query(&[("code", "abc"), ("state", session.session_id.as_str())]),
        Extension(state.clone()),
    )
    .await;
    let live = api::session_status(
        query(&[("session_id", session.session_id.as_str())]),
        Extension(state),
    )
    .await;
    assert!(live.0.valid);
    assert!(live.0.token_valid);
    assert!(live.0.can_refresh);
    assert!(live.0.expires_in > 0);
}
