use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use pethelp_schema::Message;
use pethelp_store::SessionSummary;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions))
        .route("/{id}", get(get_session))
        .route("/{id}/reset", post(reset_session))
}

async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let transcript = state.store.load(&id).await?;
    if transcript.is_empty() {
        return Err(ApiError::not_found(format!("no session: {id}")));
    }
    Ok(Json(transcript))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.store.clear(&id).await? {
        return Err(ApiError::not_found(format!("no session: {id}")));
    }
    Ok(Json(serde_json::json!({ "status": "reset", "id": id })))
}
