use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use serde_json::{Value, json};

use spotrelay::error::AuthFailure;
use spotrelay::management::{MemoryStore, SessionRegistry, SessionStore, TokenManager};
use spotrelay::spotify::auth::TokenExchange;
use spotrelay::spotify::player::{self, PlayerApi, PlayerCommand, PlayerReply, RelayOutcome};
use spotrelay::types::{Session, TokenGrant};
use spotrelay::utils::now_ts;

// Token endpoint stand-in; every refresh mints "minted-<n>".
struct FakeExchange {
    refresh_calls: AtomicUsize,
}

impl FakeExchange {
    fn new() -> Self {
        FakeExchange {
            refresh_calls: AtomicUsize::new(0),
        }
    }

    fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExchange for FakeExchange {
    async fn exchange_code(&self, _code: &str) -> Result<TokenGrant, AuthFailure> {
        Ok(TokenGrant {
            access_token: "code-access".to_string(),
            refresh_token: Some("code-refresh".to_string()),
            expires_in: 3600,
            scope: None,
        })
    }

    async fn exchange_refresh(&self, _refresh_token: &str) -> Result<TokenGrant, AuthFailure> {
        let call = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TokenGrant {
            access_token: format!("minted-{call}"),
            refresh_token: None,
            expires_in: 3600,
            scope: None,
        })
    }
}

// What the player endpoint stand-in should answer with.
enum PlayerBehavior {
    /// 204 for every call.
    NoContent,
    /// JSON body for every call.
    Json(Value),
    /// 401 for the named token, 204 for any replacement.
    RejectToken(String),
    /// 401 no matter the token.
    AlwaysUnauthorized,
    /// A non-success status, passed through verbatim.
    Rejected(u16, String),
}

struct FakePlayer {
    calls: AtomicUsize,
    behavior: PlayerBehavior,
}

impl FakePlayer {
    fn new(behavior: PlayerBehavior) -> Self {
        FakePlayer {
            calls: AtomicUsize::new(0),
            behavior,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlayerApi for FakePlayer {
    async fn send(&self, token: &str, _command: &PlayerCommand) -> Result<PlayerReply, AuthFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            PlayerBehavior::NoContent => Ok(PlayerReply::NoContent),
            PlayerBehavior::Json(value) => Ok(PlayerReply::Json(value.clone())),
            PlayerBehavior::RejectToken(stale) => {
                if token == stale {
                    Ok(PlayerReply::Unauthorized)
                } else {
                    Ok(PlayerReply::NoContent)
                }
            }
            PlayerBehavior::AlwaysUnauthorized => Ok(PlayerReply::Unauthorized),
            PlayerBehavior::Rejected(status, message) => Ok(PlayerReply::Rejected {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

fn authed_session(session_id: &str, access: &str, expires_at: u64) -> Session {
    let now = now_ts();
    Session {
        session_id: session_id.to_string(),
        created_at: now,
        last_used_at: now,
        access_token: Some(access.to_string()),
        refresh_token: Some("refresh".to_string()),
        expires_at,
        redirect_after_login: None,
    }
}

async fn setup(behavior: PlayerBehavior) -> (Arc<FakeExchange>, FakePlayer, Arc<TokenManager>) {
    let exchange = Arc::new(FakeExchange::new());
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(SessionRegistry::new(store.clone(), None));
    let tokens = Arc::new(TokenManager::new(registry, exchange.clone(), 60));
    store
        .set(authed_session("s1", "valid-token", now_ts() + 3600))
        .await;
    (exchange, FakePlayer::new(behavior), tokens)
}

#[tokio::test]
async fn test_seek_no_content_is_success() {
    let (exchange, player, tokens) = setup(PlayerBehavior::NoContent).await;

    let outcome = player::relay(
        &tokens,
        &player,
        "s1",
        PlayerCommand::Seek { position_ms: 30000 },
    )
    .await
    .unwrap();

    assert!(matches!(outcome, RelayOutcome::Done));
    assert_eq!(player.call_count(), 1);
    assert_eq!(exchange.refresh_count(), 0);
}

#[tokio::test]
async fn test_current_playback_no_content_means_no_device() {
    let (_, player, tokens) = setup(PlayerBehavior::NoContent).await;

    let outcome = player::relay(&tokens, &player, "s1", PlayerCommand::CurrentPlayback)
        .await
        .unwrap();

    assert!(matches!(outcome, RelayOutcome::NoActiveDevice));
}

#[tokio::test]
async fn test_current_playback_passes_state_through() {
    let body = json!({ "is_playing": true, "progress_ms": 1234 });
    let (_, player, tokens) = setup(PlayerBehavior::Json(body.clone())).await;

    let outcome = player::relay(&tokens, &player, "s1", PlayerCommand::CurrentPlayback)
        .await
        .unwrap();

    match outcome {
        RelayOutcome::State(value) => assert_eq!(value, body),
        other => panic!("expected playback state, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upstream_401_forces_one_refresh_and_one_resend() {
    let (exchange, player, tokens) =
        setup(PlayerBehavior::RejectToken("valid-token".to_string())).await;

    let outcome = player::relay(&tokens, &player, "s1", PlayerCommand::Pause)
        .await
        .unwrap();

    assert!(matches!(outcome, RelayOutcome::Done));
    assert_eq!(player.call_count(), 2);
    assert_eq!(exchange.refresh_count(), 1);
}

#[tokio::test]
async fn test_second_401_surfaces_refresh_denied() {
    let (exchange, player, tokens) = setup(PlayerBehavior::AlwaysUnauthorized).await;

    let err = player::relay(&tokens, &player, "s1", PlayerCommand::Next)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthFailure::RefreshDenied(_)));
    // Exactly one refresh and one resend before the error surfaces
    assert_eq!(player.call_count(), 2);
    assert_eq!(exchange.refresh_count(), 1);
}

#[tokio::test]
async fn test_other_statuses_pass_through_without_retry() {
    let (exchange, player, tokens) = setup(PlayerBehavior::Rejected(
        404,
        "Device not found".to_string(),
    ))
    .await;

    let err = player::relay(&tokens, &player, "s1", PlayerCommand::Play)
        .await
        .unwrap_err();

    match err {
        AuthFailure::UpstreamRejected(message) => assert_eq!(message, "Device not found"),
        other => panic!("expected upstream rejection, got {other:?}"),
    }
    assert_eq!(player.call_count(), 1);
    assert_eq!(exchange.refresh_count(), 0);
}

#[tokio::test]
async fn test_unknown_session_never_reaches_upstream() {
    let (exchange, player, tokens) = setup(PlayerBehavior::NoContent).await;

    let err = player::relay(&tokens, &player, "missing", PlayerCommand::Play)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthFailure::InvalidSession));
    assert_eq!(player.call_count(), 0);
    assert_eq!(exchange.refresh_count(), 0);
}

#[tokio::test]
async fn test_command_json_body_still_counts_as_success() {
    let (_, player, tokens) = setup(PlayerBehavior::Json(json!({ "ok": true }))).await;

    let outcome = player::relay(&tokens, &player, "s1", PlayerCommand::Previous)
        .await
        .unwrap();

    assert!(matches!(outcome, RelayOutcome::Done));
}
