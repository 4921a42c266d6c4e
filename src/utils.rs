use base64::{Engine, engine::general_purpose::STANDARD};
use rand::{Rng, distr::Alphanumeric};

/// Length of generated session identifiers.
pub const SESSION_ID_LEN: usize = 32;

pub fn generate_session_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

/// Builds the HTTP Basic credentials for the token endpoint,
/// `base64(client_id:client_secret)` prefixed with the scheme.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let raw = format!("{}:{}", client_id, client_secret);
    format!("Basic {}", STANDARD.encode(raw.as_bytes()))
}

pub fn now_ts() -> u64 {
    chrono::Utc::now().timestamp() as u64
}
