use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::services::conversation;
use crate::state::AppState;

use super::authorize;

#[derive(Deserialize)]
pub struct IncomingMessage {
    pub conversation_id: Option<String>,
    pub text: String,
}

#[derive(Serialize)]
pub struct TurnResponse {
    pub conversation_id: String,
    pub replies: Vec<String>,
}

pub async fn post_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<IncomingMessage>,
) -> Result<Json<TurnResponse>, AppError> {
    authorize(&state, &headers)?;

    let conversation_id = match payload.conversation_id.as_deref().map(str::trim) {
        Some("") => return Err(AppError::BadRequest("conversation_id must not be empty".to_string())),
        Some(id) => id.to_string(),
        None => uuid::Uuid::new_v4().to_string(),
    };

    tracing::info!(conversation = %conversation_id, text = %payload.text, "incoming message");

    let replies = conversation::process_message(&state, &conversation_id, &payload.text).await?;

    {
        let db = state.db.lock().unwrap();
        match queries::expire_old_conversations(&db) {
            Ok(0) => {}
            Ok(n) => tracing::debug!(expired = n, "purged expired conversations"),
            Err(e) => tracing::error!(error = %e, "failed to purge expired conversations"),
        }
    }

    Ok(Json(TurnResponse {
        conversation_id,
        replies,
    }))
}
