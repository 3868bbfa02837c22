pub mod conversations;
pub mod health;
pub mod messages;

use axum::http::HeaderMap;

use crate::errors::AppError;
use crate::state::AppState;

/// Shared-secret check against `MicrosoftAppPassword`; open when it is unset.
pub fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    if !state.config.auth_enabled() {
        return Ok(());
    }

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    if token == state.config.app_password {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}
