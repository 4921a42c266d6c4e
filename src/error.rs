//! Failure taxonomy for the relay.

use thiserror::Error;

/// Authorization and relay failures surfaced to HTTP clients.
///
/// Every variant maps to a structured JSON response; none of them crash a
/// request. `InvalidSession`, `ExchangeRejected` and `RefreshDenied` are
/// terminal for their session or login attempt and require the client to
/// restart at `/login`; `UpstreamRejected` is a per-request failure that
/// leaves the session intact.
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("Unknown or missing session. Start over at /login.")]
    InvalidSession,

    #[error("Authorization code exchange rejected: {0}")]
    ExchangeRejected(String),

    #[error("Token refresh denied: {0}")]
    RefreshDenied(String),

    #[error("Spotify rejected the request: {0}")]
    UpstreamRejected(String),
}

impl AuthFailure {
    /// The HTTP status this failure is reported with.
    pub fn status(&self) -> u16 {
        match self {
            AuthFailure::InvalidSession => 401,
            AuthFailure::ExchangeRejected(_) => 400,
            AuthFailure::RefreshDenied(_) => 401,
            AuthFailure::UpstreamRejected(_) => 502,
        }
    }
}

/// Failures of the session cache persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
