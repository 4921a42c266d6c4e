//! Configuration management for the Spotify playback relay.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. It provides a centralized way to
//! manage application configuration including Spotify API credentials,
//! server settings, and the session lifecycle tunables.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! The OAuth client credentials, redirect URI and listen address have no
//! sane defaults and must be set; endpoint URLs, the requested scope and
//! the lifecycle tunables fall back to working defaults.

use dotenv;
use std::{env, path::PathBuf};

/// Default scope requested during authorization: read playback state,
/// modify playback state, read the currently playing track.
const DEFAULT_SCOPE: &str =
    "user-read-playback-state user-modify-playback-state user-read-currently-playing";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `spotrelay/.env`. This allows users to store
/// configuration securely without hardcoding sensitive values.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/spotrelay/.env`
/// - macOS: `~/Library/Application Support/spotrelay/.env`
/// - Windows: `%LOCALAPPDATA%/spotrelay/.env`
///
/// # Errors
///
/// This function will return an error if:
/// - The parent directory cannot be created
/// - The `.env` file cannot be read or parsed
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotrelay/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::from_path(path).map_err(|e| e.to_string())?;
    Ok(())
}

/// Returns the listen address for the relay server.
///
/// Retrieves the `SERVER_ADDRESS` environment variable which specifies the
/// address and port where the HTTP server should bind, e.g. `0.0.0.0:8888`.
///
/// # Panics
///
/// Panics if the `SERVER_ADDRESS` environment variable is not set.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set")
}

/// Returns the Spotify API client ID for authentication.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable is not set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID").expect("SPOTIFY_API_AUTH_CLIENT_ID must be set")
}

/// Returns the Spotify API client secret for authentication.
///
/// The secret is combined with the client ID into the HTTP Basic credentials
/// presented to the token endpoint. It should never appear in logs.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_SECRET` environment variable is not set.
pub fn spotify_client_secret() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_SECRET").expect("SPOTIFY_API_AUTH_CLIENT_SECRET must be set")
}

/// Returns the OAuth redirect URI registered with the Spotify application.
///
/// This must match the redirect URI configured in the Spotify developer
/// dashboard; the token endpoint rejects exchanges whose redirect URI
/// differs from the one used during authorization.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_REDIRECT_URI` environment variable is not set.
pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI").expect("SPOTIFY_API_REDIRECT_URI must be set")
}

/// Returns the scope requested during authorization.
///
/// Defaults to the playback scopes the relay needs when
/// `SPOTIFY_API_AUTH_SCOPE` is not set.
pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|_| DEFAULT_SCOPE.to_string())
}

/// Returns the Spotify OAuth authorization URL.
///
/// `/login` redirects the browser here. Defaults to the public accounts
/// service endpoint.
pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/authorize".to_string())
}

/// Returns the Spotify OAuth token exchange URL.
///
/// Both the authorization-code and refresh-token grants are posted here.
/// Defaults to the public accounts service endpoint.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string())
}

/// Returns the Spotify Web API base URL.
///
/// All playback calls are issued against this base. Defaults to the public
/// Web API endpoint.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| "https://api.spotify.com/v1".to_string())
}

/// Returns the safety margin, in seconds, applied to token expiry checks.
///
/// An access token expiring within this many seconds is treated as already
/// stale and refreshed before use. Defaults to 60.
pub fn token_refresh_margin_secs() -> u64 {
    env_u64("TOKEN_REFRESH_MARGIN_SECS", 60)
}

/// Returns the idle retention window for sessions, in seconds.
///
/// Sessions whose `last_used_at` predates now minus this window are removed
/// by the periodic sweep. Defaults to 7 days.
pub fn session_retention_secs() -> u64 {
    env_u64("SESSION_RETENTION_SECS", 7 * 24 * 60 * 60)
}

/// Returns the interval between session sweeps, in seconds. Defaults to 3600.
pub fn session_sweep_interval_secs() -> u64 {
    env_u64("SESSION_SWEEP_INTERVAL_SECS", 3600)
}

/// Returns the interval between session cache writes, in seconds.
/// Defaults to 300.
pub fn session_persist_interval_secs() -> u64 {
    env_u64("SESSION_PERSIST_INTERVAL_SECS", 300)
}

fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(v) => v.parse().unwrap_or(default),
        Err(_) => default,
    }
}
