use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{config, error::AuthFailure, management::TokenManager};

/// A playback-control call relayed to the Web API player endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    Seek { position_ms: u64 },
    Play,
    Pause,
    Next,
    Previous,
    CurrentPlayback,
}

/// The upstream response, reduced to what the relay cares about.
#[derive(Debug, Clone)]
pub enum PlayerReply {
    /// 204; for `CurrentPlayback` this means no active device.
    NoContent,
    /// 2xx with a JSON body.
    Json(Value),
    /// 401; the token was rejected server-side.
    Unauthorized,
    /// Any other non-success status, surfaced verbatim.
    Rejected { status: u16, message: String },
}

/// The final outcome of a relayed command, after token handling.
#[derive(Debug, Clone)]
pub enum RelayOutcome {
    /// Command accepted, nothing to report.
    Done,
    /// `CurrentPlayback` against a session with no active device. An
    /// informational result, not a failure.
    NoActiveDevice,
    /// Playback state JSON from `CurrentPlayback`.
    State(Value),
}

/// One upstream call with a bearer token. Behind a trait so the relay's
/// 401-retry handling can be exercised without network access.
#[async_trait]
pub trait PlayerApi: Send + Sync {
    async fn send(&self, token: &str, command: &PlayerCommand) -> Result<PlayerReply, AuthFailure>;
}

/// Production player client over the Web API.
pub struct WebApiClient {
    http: Client,
}

impl WebApiClient {
    pub fn new() -> Self {
        WebApiClient {
            http: Client::new(),
        }
    }
}

impl Default for WebApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlayerApi for WebApiClient {
    async fn send(&self, token: &str, command: &PlayerCommand) -> Result<PlayerReply, AuthFailure> {
        let base = config::spotify_apiurl();
        let request = match command {
            PlayerCommand::Seek { position_ms } => self
                .http
                .put(format!("{base}/me/player/seek?position_ms={position_ms}")),
            PlayerCommand::Play => self.http.put(format!("{base}/me/player/play")),
            PlayerCommand::Pause => self.http.put(format!("{base}/me/player/pause")),
            PlayerCommand::Next => self.http.post(format!("{base}/me/player/next")),
            PlayerCommand::Previous => self.http.post(format!("{base}/me/player/previous")),
            PlayerCommand::CurrentPlayback => self.http.get(format!("{base}/me/player")),
        };

        let res = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthFailure::UpstreamRejected(e.to_string()))?;

        let status = res.status();
        match status {
            StatusCode::NO_CONTENT => Ok(PlayerReply::NoContent),
            StatusCode::UNAUTHORIZED => Ok(PlayerReply::Unauthorized),
            s if s.is_success() => {
                let body = res
                    .json::<Value>()
                    .await
                    .map_err(|e| AuthFailure::UpstreamRejected(e.to_string()))?;
                Ok(PlayerReply::Json(body))
            }
            s => {
                // Prefer the error message in the body over the bare status
                // line when the Web API provides one.
                let message = res
                    .json::<Value>()
                    .await
                    .ok()
                    .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                    .unwrap_or_else(|| s.to_string());
                Ok(PlayerReply::Rejected {
                    status: s.as_u16(),
                    message,
                })
            }
        }
    }
}

/// Relays one command for a session: obtains a valid token, issues the
/// upstream call, and on 401 forces exactly one refresh before one resend.
/// Other upstream rejections are surfaced verbatim, never retried.
pub async fn relay(
    tokens: &TokenManager,
    player: &dyn PlayerApi,
    session_id: &str,
    command: PlayerCommand,
) -> Result<RelayOutcome, AuthFailure> {
    let token = tokens.ensure_valid_token(session_id).await?;
    let mut reply = player.send(&token, &command).await?;

    if let PlayerReply::Unauthorized = reply {
        // The server, not the clock, declared the token invalid.
        let fresh = tokens.force_refresh(session_id, &token).await?;
        reply = player.send(&fresh, &command).await?;
    }

    match reply {
        PlayerReply::NoContent => {
            if command == PlayerCommand::CurrentPlayback {
                Ok(RelayOutcome::NoActiveDevice)
            } else {
                Ok(RelayOutcome::Done)
            }
        }
        PlayerReply::Json(value) => {
            if command == PlayerCommand::CurrentPlayback {
                Ok(RelayOutcome::State(value))
            } else {
                Ok(RelayOutcome::Done)
            }
        }
        PlayerReply::Unauthorized => Err(AuthFailure::RefreshDenied(
            "access token rejected after refresh".to_string(),
        )),
        PlayerReply::Rejected { message, .. } => Err(AuthFailure::UpstreamRejected(message)),
    }
}
