use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::dialog::BookingDialogState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub dialog: Option<BookingDialogState>,
    pub last_activity: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl Conversation {
    pub fn is_active(&self) -> bool {
        self.dialog.is_some()
    }
}
