use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Conversation;
use crate::state::AppState;

use super::authorize;

pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, AppError> {
    authorize(&state, &headers)?;

    let conv = {
        let db = state.db.lock().unwrap();
        queries::get_conversation(&db, &id)?
    };

    conv.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("conversation {id}")))
}

pub async fn delete_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    authorize(&state, &headers)?;

    // Don't let an in-flight turn save over the reset.
    let _turn = state.turn_locks.acquire(&id).await;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::delete_conversation(&db, &id)?
    };

    if deleted {
        tracing::info!(conversation = %id, "conversation reset");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("conversation {id}")))
    }
}
