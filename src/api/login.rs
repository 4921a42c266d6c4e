use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension, Json,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reqwest::Url;
use serde_json::json;

use crate::{config, info, server::AppState};

pub async fn login(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    let session = state
        .registry
        .create(params.get("redirect_uri").cloned())
        .await;
    info!("Login started for session {}", session.session_id);

    let client_id = config::spotify_client_id();
    let scope = config::spotify_scope();
    let redirect_uri = config::spotify_redirect_uri();
    let url = Url::parse_with_params(
        &config::spotify_apiauth_url(),
        &[
            ("response_type", "code"),
            ("client_id", client_id.as_str()),
            ("scope", scope.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("state", session.session_id.as_str()),
        ],
    );

    match url {
        Ok(url) => super::found(url.as_str()),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Invalid authorization URL: {e}") })),
        )
            .into_response(),
    }
}
