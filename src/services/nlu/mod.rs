pub mod intent;
pub mod luis;

use async_trait::async_trait;

use crate::models::RecognizerResult;
use crate::services::dialog::TurnContext;

#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, turn: &TurnContext) -> anyhow::Result<RecognizerResult>;
}
