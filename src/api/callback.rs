use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension, Json,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{error::AuthFailure, server::AppState, success, warning};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    if let Some(denied) = params.get("error") {
        warning!("Authorization denied by accounts service: {}", denied);
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("Authorization failed: {denied}") })),
        )
            .into_response();
    }

    let (Some(code), Some(session_id)) = (params.get("code"), params.get("state")) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing code or state parameter." })),
        )
            .into_response();
    };

    if state.registry.get(session_id).await.is_none() {
        return super::failure_response(&AuthFailure::InvalidSession);
    }

    match state.exchange.exchange_code(code).await {
        Ok(grant) => {
            let Some(session) = state.registry.complete_login(session_id, &grant).await else {
                return super::failure_response(&AuthFailure::InvalidSession);
            };
            if let Err(e) = state.registry.persist().await {
                warning!("Failed to persist session cache: {}", e);
            }
            success!("Session {} authenticated", session.session_id);

            let base = session
                .redirect_after_login
                .unwrap_or_else(|| "/".to_string());
            let target = format!(
                "{base}#session_id={id}&access_token={token}",
                id = session.session_id,
                token = grant.access_token
            );
            super::found(&target)
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            super::failure_response(&e)
        }
    }
}
