use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension, Json,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::server::AppState;

pub async fn token(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    let Some(session_id) = params.get("session_id") else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing session_id parameter." })),
        )
            .into_response();
    };

    match state.tokens.ensure_valid_token(session_id).await {
        Ok(access_token) => Json(json!({ "access_token": access_token })).into_response(),
        Err(e) => super::failure_response(&e),
    }
}
