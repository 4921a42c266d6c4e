use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension, Json,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    server::AppState,
    spotify::player::{self, PlayerCommand, RelayOutcome},
};

pub async fn seek(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    let Some(session_id) = params.get("session_id") else {
        return missing_param("session_id");
    };
    let Some(position_ms) = params.get("position").and_then(|p| p.parse::<u64>().ok()) else {
        return missing_param("position");
    };

    run_command(&state, session_id, PlayerCommand::Seek { position_ms }).await
}

pub async fn play(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    let Some(session_id) = params.get("session_id") else {
        return missing_param("session_id");
    };
    run_command(&state, session_id, PlayerCommand::Play).await
}

pub async fn pause(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    let Some(session_id) = params.get("session_id") else {
        return missing_param("session_id");
    };
    run_command(&state, session_id, PlayerCommand::Pause).await
}

pub async fn next(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    let Some(session_id) = params.get("session_id") else {
        return missing_param("session_id");
    };
    run_command(&state, session_id, PlayerCommand::Next).await
}

pub async fn previous(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Response {
    let Some(session_id) = params.get("session_id") else {
        return missing_param("session_id");
    };
    run_command(&state, session_id, PlayerCommand::Previous).await
}

pub async fn current_playback(
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

    match player::relay(
        &state.tokens,
        state.player.as_ref(),
        session_id,
        PlayerCommand::CurrentPlayback,
    )
    .await
    {
        Ok(RelayOutcome::State(value)) => Json(value).into_response(),
        Ok(_) => Json(json!({
            "error": "No active device found. Start playback on a Spotify device first."
        }))
        .into_response(),
        Err(e) => super::failure_response(&e),
    }
}

async fn run_command(state: &AppState, session_id: &str, command: PlayerCommand) -> Response {
    match player::relay(&state.tokens, state.player.as_ref(), session_id, command).await {
        Ok(_) => Json(json!({ "success": true })).into_response(),
        Err(e) => super::command_failure_response(&e),
    }
}

fn missing_param(name: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "success": false,
            "error": format!("Missing or invalid {name} parameter.")
        })),
    )
        .into_response()
}
