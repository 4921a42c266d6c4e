//! # API Module
//!
//! This module provides the HTTP endpoints of the playback relay. Every
//! route is query-parameter driven and answers with JSON or a redirect.
//!
//! ## Endpoints
//!
//! ### Authorization
//!
//! - [`login`] - Creates a session and redirects the browser to the
//!   accounts service authorization page, carrying the session id in the
//!   OAuth `state` parameter.
//! - [`callback`] - Completes the round trip: exchanges the authorization
//!   code for a token pair, stores it on the session named by `state`, and
//!   redirects back to the client.
//! - [`token`] - Hands the session's current access token to the browser,
//!   refreshing it first when needed.
//! - [`session_status`] - Informational poll of a session's validity,
//!   token freshness and age.
//!
//! ### Playback
//!
//! - [`seek`], [`play`], [`pause`], [`next`], [`previous`] - Relay the
//!   corresponding player command and answer `{success:true}` or
//!   `{success:false, error}`.
//! - [`current_playback`] - Returns the upstream playback state JSON, or
//!   an informational `{error}` body when no device is active.
//!
//! ### Monitoring
//!
//! - [`health`] - Health check returning application status and version.
//!
//! ## Failure Shape
//!
//! Failures are always structured JSON; the status code comes from the
//! [`AuthFailure`](crate::error::AuthFailure) taxonomy. Playback routes
//! wrap the message in `{success:false, error}`, the authorization routes
//! use a bare `{error}` object.

mod callback;
mod health;
mod login;
mod playback;
mod status;
mod token;

pub use callback::callback;
pub use health::health;
pub use login::login;
pub use playback::current_playback;
pub use playback::next;
pub use playback::pause;
pub use playback::play;
pub use playback::previous;
pub use playback::seek;
pub use status::session_status;
pub use token::token;

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthFailure;

/// 302 redirect. The accounts round trip uses Found rather than the 307/303
/// variants axum's `Redirect` builds.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// `{error}` response for the authorization routes.
fn failure_response(failure: &AuthFailure) -> Response {
    let status =
        StatusCode::from_u16(failure.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": failure.to_string() }))).into_response()
}

/// `{success:false, error}` response for the playback routes.
fn command_failure_response(failure: &AuthFailure) -> Response {
    let status =
        StatusCode::from_u16(failure.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({ "success": false, "error": failure.to_string() })),
    )
        .into_response()
}
