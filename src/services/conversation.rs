use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::db::queries;
use crate::models::{BookingRequest, Conversation, Intent};
use crate::services::dialog::{DialogTurnStatus, TurnContext};
use crate::services::nlu::intent::execute_query;
use crate::state::AppState;

pub const LUIS_NOT_CONFIGURED: &str = "NOTE: LUIS is not configured. To enable all capabilities, add 'LuisAppId', 'LuisAPIKey' and 'LuisAPIHostName' to the .env file.";
pub const WEATHER_UNAVAILABLE: &str = "Weather lookups are not available yet.";
pub const WHAT_ELSE: &str = "What else can I do for you?";

/// Handle one user message and return the bot's replies, in order.
pub async fn process_message(
    state: &Arc<AppState>,
    conversation_id: &str,
    message: &str,
) -> anyhow::Result<Vec<String>> {
    let ttl = Duration::minutes(state.config.conversation_ttl_minutes);

    // Held until the turn's state is saved, so turns on one conversation run in order.
    let _turn = state.turn_locks.acquire(conversation_id).await;

    let mut conv = {
        let db = state.db.lock().unwrap();
        queries::get_conversation(&db, conversation_id)?
    }
    .unwrap_or_else(|| new_conversation(conversation_id, ttl));

    let mut turn = TurnContext::new(conversation_id, message.trim());

    tracing::info!(
        conversation = conversation_id,
        active = conv.is_active(),
        "processing message"
    );

    let status = match conv.dialog.as_mut() {
        Some(dialog) => state.booking_dialog.continue_dialog(dialog, &mut turn),
        None => match route_new_request(state, &mut turn).await {
            Some(booking) => {
                let (dialog, status) = state.booking_dialog.begin(booking, &mut turn);
                conv.dialog = Some(dialog);
                status
            }
            None => DialogTurnStatus::Waiting,
        },
    };

    match status {
        DialogTurnStatus::Waiting => {}
        DialogTurnStatus::Complete(Some(booking)) => {
            tracing::info!(
                conversation = conversation_id,
                destination = booking.destination.as_deref().unwrap_or(""),
                "booking completed"
            );
            turn.send_activity(booked_message(&booking));
            turn.send_activity(WHAT_ELSE);
            conv.dialog = None;
        }
        DialogTurnStatus::Complete(None) | DialogTurnStatus::Cancelled => {
            turn.send_activity(WHAT_ELSE);
            conv.dialog = None;
        }
    }

    let now = Utc::now().naive_utc();
    conv.last_activity = now;
    conv.expires_at = now + ttl;

    {
        let db = state.db.lock().unwrap();
        queries::save_conversation(&db, &conv)?;
    }

    Ok(turn.into_replies())
}

/// Decide what a message outside a booking means.
///
/// Returns the request to start a booking dialog with, or `None` when the
/// turn was answered directly.
async fn route_new_request(state: &AppState, turn: &mut TurnContext) -> Option<BookingRequest> {
    let Some(recognizer) = state.recognizer.as_deref() else {
        turn.send_activity(LUIS_NOT_CONFIGURED);
        return Some(BookingRequest::default());
    };

    let (intent, booking) = execute_query(recognizer, turn).await;

    match intent {
        Some(Intent::BookFlight) => {
            let booking = booking.unwrap_or_default();
            if !booking.unsupported_airports.is_empty() {
                turn.send_activity(format!(
                    "Sorry but the following airports are not supported: {}",
                    booking.unsupported_airports.join(", ")
                ));
            }
            Some(booking)
        }
        Some(Intent::GetWeather) => {
            turn.send_activity(WEATHER_UNAVAILABLE);
            None
        }
        other => {
            let label = other.as_ref().map(Intent::as_str).unwrap_or("None");
            turn.send_activity(format!(
                "Sorry, I didn't get that. Please try asking in a different way (intent was {label})"
            ));
            None
        }
    }
}

fn booked_message(booking: &BookingRequest) -> String {
    format!(
        "I have you booked to {} from {} on {}.",
        booking.destination.as_deref().unwrap_or_default(),
        booking.origin.as_deref().unwrap_or_default(),
        booking.travel_date.as_deref().unwrap_or_default(),
    )
}

fn new_conversation(id: &str, ttl: Duration) -> Conversation {
    let now = Utc::now().naive_utc();
    Conversation {
        id: id.to_string(),
        dialog: None,
        last_activity: now,
        expires_at: now + ttl,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::config::AppConfig;
    use crate::db;
    use crate::models::RecognizerResult;
    use crate::services::dialog::booking::{BUDGET_PROMPT, DESTINATION_PROMPT, ORIGIN_PROMPT};
    use crate::services::dialog::BookingDialog;
    use crate::services::nlu::Recognizer;
    use crate::services::telemetry::NullTelemetry;
    use crate::state::TurnLocks;

    struct KeywordRecognizer;

    #[async_trait]
    impl Recognizer for KeywordRecognizer {
        async fn recognize(&self, turn: &TurnContext) -> anyhow::Result<RecognizerResult> {
            let mut result = RecognizerResult {
                text: turn.text.clone(),
                ..Default::default()
            };
            if turn.text.contains("weather") {
                result.intents = vec![("BookFlight".to_string(), 0.1), ("GetWeather".to_string(), 0.9)];
            } else if turn.text.contains("fly") {
                result.intents = vec![("BookFlight".to_string(), 0.9)];
                result.entities.insert("To".to_string(), vec!["Paris".to_string()]);
            } else if turn.text.contains("boom") {
                anyhow::bail!("recognizer exploded");
            }
            Ok(result)
        }
    }

    /// Takes long enough to answer that a second turn arrives mid-flight.
    struct SlowRecognizer;

    #[async_trait]
    impl Recognizer for SlowRecognizer {
        async fn recognize(&self, turn: &TurnContext) -> anyhow::Result<RecognizerResult> {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            KeywordRecognizer.recognize(turn).await
        }
    }

    fn test_config() -> AppConfig {
        AppConfig {
            port: 8000,
            database_url: ":memory:".to_string(),
            app_id: String::new(),
            app_password: String::new(),
            luis_app_id: String::new(),
            luis_api_key: String::new(),
            luis_api_host_name: String::new(),
            telemetry_sink: "none".to_string(),
            conversation_ttl_minutes: 30,
            booking_dialog_id: "BookingDialog".to_string(),
        }
    }

    fn test_state(recognizer: Option<Box<dyn Recognizer>>) -> Arc<AppState> {
        Arc::new(AppState {
            db: Arc::new(Mutex::new(db::init_db(":memory:").unwrap())),
            config: test_config(),
            recognizer,
            booking_dialog: BookingDialog::new("BookingDialog", Arc::new(NullTelemetry)),
            turn_locks: TurnLocks::default(),
        })
    }

    #[tokio::test]
    async fn test_book_flight_prefills_and_asks_next_question() {
        let state = test_state(Some(Box::new(KeywordRecognizer)));
        let replies = process_message(&state, "c1", "fly me to paris").await.unwrap();
        assert_eq!(replies, vec![ORIGIN_PROMPT.to_string()]);

        let conv = {
            let db = state.db.lock().unwrap();
            queries::get_conversation(&db, "c1").unwrap().unwrap()
        };
        let dialog = conv.dialog.unwrap();
        assert_eq!(dialog.booking.destination.as_deref(), Some("Paris"));
    }

    #[tokio::test]
    async fn test_weather_intent_is_answered_directly() {
        let state = test_state(Some(Box::new(KeywordRecognizer)));
        let replies = process_message(&state, "c1", "what's the weather").await.unwrap();
        assert_eq!(replies, vec![WEATHER_UNAVAILABLE.to_string()]);
    }

    #[tokio::test]
    async fn test_recognizer_failure_is_not_understood() {
        let state = test_state(Some(Box::new(KeywordRecognizer)));
        let replies = process_message(&state, "c1", "boom").await.unwrap();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("Sorry, I didn't get that"));
        assert!(replies[0].contains("intent was None"));
    }

    #[tokio::test]
    async fn test_without_luis_booking_starts_empty() {
        let state = test_state(None);
        let replies = process_message(&state, "c1", "hello").await.unwrap();
        assert_eq!(
            replies,
            vec![LUIS_NOT_CONFIGURED.to_string(), DESTINATION_PROMPT.to_string()]
        );
    }

    #[tokio::test]
    async fn test_full_conversation_books_and_resets() {
        let state = test_state(Some(Box::new(KeywordRecognizer)));
        process_message(&state, "c1", "fly me to paris").await.unwrap();
        for answer in ["Berlin", "500", "2023-06-01", "2023-06-10"] {
            process_message(&state, "c1", answer).await.unwrap();
        }

        let replies = process_message(&state, "c1", "yes").await.unwrap();
        assert_eq!(
            replies,
            vec![
                "I have you booked to Paris from Berlin on 2023-06-01.".to_string(),
                WHAT_ELSE.to_string(),
            ]
        );

        let conv = {
            let db = state.db.lock().unwrap();
            queries::get_conversation(&db, "c1").unwrap().unwrap()
        };
        assert!(!conv.is_active());
    }

    #[tokio::test]
    async fn test_conversations_do_not_share_state() {
        let state = test_state(Some(Box::new(KeywordRecognizer)));
        process_message(&state, "a", "fly me to paris").await.unwrap();

        let replies = process_message(&state, "b", "Berlin").await.unwrap();
        assert!(replies[0].starts_with("Sorry, I didn't get that"));
    }

    #[tokio::test]
    async fn test_overlapping_turns_on_one_conversation_run_in_order() {
        let state = test_state(Some(Box::new(SlowRecognizer)));

        let first = process_message(&state, "c1", "fly me to paris");
        let second = async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            process_message(&state, "c1", "Berlin").await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap(), vec![ORIGIN_PROMPT.to_string()]);
        assert_eq!(second.unwrap(), vec![BUDGET_PROMPT.to_string()]);

        let conv = {
            let db = state.db.lock().unwrap();
            queries::get_conversation(&db, "c1").unwrap().unwrap()
        };
        let dialog = conv.dialog.unwrap();
        assert_eq!(dialog.booking.destination.as_deref(), Some("Paris"));
        assert_eq!(dialog.booking.origin.as_deref(), Some("Berlin"));
    }
}
