use serde::{Deserialize, Serialize};

/// A server-side session binding one browser user to an OAuth token pair.
///
/// Created at `/login` before the browser is redirected to the accounts
/// service, completed at `/callback`, and mutated by every refresh. All
/// timestamps are unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub created_at: u64,
    pub last_used_at: u64,
    /// Bearer credential for the Web API; `None` until the callback completes.
    pub access_token: Option<String>,
    /// Long-lived credential used to mint new access tokens; `None` until
    /// the callback completes.
    pub refresh_token: Option<String>,
    /// Absolute unix-seconds time after which `access_token` is invalid.
    pub expires_at: u64,
    /// Client-supplied redirect hint carried through the authorization
    /// round trip.
    pub redirect_after_login: Option<String>,
}

impl Session {
    /// Whether the access token exists and stays valid for at least
    /// `margin` more seconds.
    pub fn has_fresh_token(&self, now: u64, margin: u64) -> bool {
        self.access_token.is_some() && self.expires_at > now + margin
    }

    /// Seconds until the access token expires, clamped to zero.
    pub fn expires_in(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}

/// The refresh-recoverable subset of a session written to the session cache.
///
/// Access tokens are never persisted; they are re-minted from the refresh
/// token after a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    pub refresh_token: String,
    pub created_at: u64,
    pub last_used_at: u64,
}

/// A successful response from the accounts token endpoint.
///
/// `refresh_token` is absent on refresh grants unless the server rotates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    #[serde(default)]
    pub scope: Option<String>,
}

/// The `/session-status` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Whether the session exists at all.
    pub valid: bool,
    /// Whether the access token is present and not yet expired.
    pub token_valid: bool,
    /// Seconds until the access token expires, zero when absent or expired.
    pub expires_in: u64,
    /// Whether a refresh token is on file.
    pub can_refresh: bool,
    /// Seconds since the session was created.
    pub session_age: u64,
}

impl SessionStatus {
    /// Status reported for an unknown session id.
    pub fn missing() -> Self {
        SessionStatus {
            valid: false,
            token_valid: false,
            expires_in: 0,
            can_refresh: false,
            session_age: 0,
        }
    }
}
