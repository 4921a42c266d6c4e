use std::{collections::HashMap, sync::Arc};

use axum::{Extension, Json, extract::Query};

use crate::{server::AppState, types::SessionStatus};

/// Informational poll; an unknown session answers `valid:false` rather
/// than an error so clients can decide whether to restart at `/login`.
pub async fn session_status(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Json<SessionStatus> {
    let Some(session_id) = params.get("session_id") else {
        return Json(SessionStatus::missing());
    };

    Json(state.registry.status(session_id).await)
}
