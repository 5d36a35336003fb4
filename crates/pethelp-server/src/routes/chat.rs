use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use pethelp_schema::Message;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(respond))
}

/// `POST /api/chat` with body `{messages: Message[]}`; returns the next
/// assistant message. The transcript is supplied by the client and not
/// persisted here — the engine reads a snapshot and nothing else.
async fn respond(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Message>, ApiError> {
    let Json(body) = payload
        .map_err(|rejection| ApiError::bad_request(format!("Invalid request. {rejection}")))?;

    let messages = body
        .get("messages")
        .filter(|m| m.is_array())
        .ok_or_else(|| ApiError::bad_request("Invalid request. Messages array is required."))?;

    let transcript: Vec<Message> = serde_json::from_value(messages.clone())
        .map_err(|e| ApiError::bad_request(format!("Invalid request. {e}")))?;

    Ok(Json(state.engine.respond(&transcript)))
}
