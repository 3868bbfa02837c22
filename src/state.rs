use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tokio::sync::OwnedMutexGuard;

use crate::config::AppConfig;
use crate::services::dialog::BookingDialog;
use crate::services::nlu::Recognizer;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    /// `None` when LUIS is not configured; the bot then books without NLU.
    pub recognizer: Option<Box<dyn Recognizer>>,
    pub booking_dialog: BookingDialog,
    pub turn_locks: TurnLocks,
}

/// One async lock per conversation, held from loading a turn's state to saving it.
#[derive(Default)]
pub struct TurnLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl TurnLocks {
    /// Wait until no other turn is running on `conversation_id`.
    pub async fn acquire(&self, conversation_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            // Entries only the map refers to have no holder and no waiter.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(conversation_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.locks.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
