use crate::models::{BookingField, BookingRequest, Intent, TopIntent};
use crate::services::dialog::TurnContext;
use crate::services::nlu::Recognizer;

/// Recognizer entity category feeding each booking field.
pub const ENTITY_FIELDS: [(&str, BookingField); 5] = [
    ("To", BookingField::Destination),
    ("From", BookingField::Origin),
    ("maxBudget", BookingField::MaxBudget),
    ("departureDate", BookingField::TravelDate),
    ("returnDate", BookingField::TravelBackDate),
];

/// Highest-scoring intent; on equal scores the first one reported wins.
pub fn top_intent(intents: &[(String, f64)]) -> Option<TopIntent> {
    let mut best: Option<(&str, f64)> = None;
    for (label, score) in intents {
        match best {
            Some((_, best_score)) if *score <= best_score => {}
            _ => best = Some((label.as_str(), *score)),
        }
    }
    best.map(|(label, score)| TopIntent {
        intent: Intent::parse(label),
        score,
    })
}

/// Classify the turn and pre-fill a booking from recognized entities.
///
/// Recognizer failures are logged and reported as `(None, None)`.
pub async fn execute_query(
    recognizer: &dyn Recognizer,
    turn: &TurnContext,
) -> (Option<Intent>, Option<BookingRequest>) {
    let result = match recognizer.recognize(turn).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, conversation = %turn.conversation_id, "recognizer failed");
            return (None, None);
        }
    };

    let Some(top) = top_intent(&result.intents) else {
        return (None, None);
    };

    tracing::info!(
        conversation = %turn.conversation_id,
        intent = top.intent.as_str(),
        score = top.score,
        "recognized intent"
    );

    if top.intent != Intent::BookFlight {
        return (Some(top.intent), None);
    }

    let mut booking = BookingRequest::default();
    for (category, field) in ENTITY_FIELDS {
        if let Some(value) = result.entities.get(category).and_then(|values| values.first()) {
            *field.slot_mut(&mut booking) = Some(value.clone());
        }
    }

    (Some(top.intent), Some(booking))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::models::RecognizerResult;

    struct FixedRecognizer(RecognizerResult);

    #[async_trait]
    impl Recognizer for FixedRecognizer {
        async fn recognize(&self, _turn: &TurnContext) -> anyhow::Result<RecognizerResult> {
            Ok(self.0.clone())
        }
    }

    struct FailingRecognizer;

    #[async_trait]
    impl Recognizer for FailingRecognizer {
        async fn recognize(&self, _turn: &TurnContext) -> anyhow::Result<RecognizerResult> {
            anyhow::bail!("LUIS unavailable")
        }
    }

    fn intents(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(l, s)| (l.to_string(), *s)).collect()
    }

    fn entities(pairs: &[(&str, Vec<&str>)]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_top_intent_picks_highest() {
        let top = top_intent(&intents(&[("BookFlight", 0.4), ("GetWeather", 0.9)])).unwrap();
        assert_eq!(top.intent, Intent::GetWeather);
        assert_eq!(top.score, 0.9);
    }

    #[test]
    fn test_top_intent_first_wins_ties() {
        let top = top_intent(&intents(&[("Cancel", 0.5), ("BookFlight", 0.5)])).unwrap();
        assert_eq!(top.intent, Intent::Cancel);
    }

    #[test]
    fn test_top_intent_empty() {
        assert!(top_intent(&[]).is_none());
    }

    #[tokio::test]
    async fn test_book_flight_copies_present_entities_only() {
        let recognizer = FixedRecognizer(RecognizerResult {
            text: "fly me to paris".to_string(),
            intents: intents(&[("BookFlight", 0.95), ("None", 0.01)]),
            entities: entities(&[("To", vec!["Paris", "Lyon"]), ("returnDate", vec!["2023-06-10"])]),
        });
        let turn = TurnContext::new("c1", "fly me to paris");

        let (intent, booking) = execute_query(&recognizer, &turn).await;
        assert_eq!(intent, Some(Intent::BookFlight));
        let booking = booking.unwrap();
        assert_eq!(booking.destination.as_deref(), Some("Paris"));
        assert_eq!(booking.origin, None);
        assert_eq!(booking.max_budget, None);
        assert_eq!(booking.travel_date, None);
        assert_eq!(booking.travel_back_date.as_deref(), Some("2023-06-10"));
        assert!(booking.unsupported_airports.is_empty());
    }

    #[tokio::test]
    async fn test_entity_values_are_not_normalized() {
        let recognizer = FixedRecognizer(RecognizerResult {
            text: String::new(),
            intents: intents(&[("BookFlight", 0.8)]),
            entities: entities(&[("From", vec!["new york"]), ("maxBudget", vec!["five hundred"])]),
        });
        let turn = TurnContext::new("c1", "");

        let (_, booking) = execute_query(&recognizer, &turn).await;
        let booking = booking.unwrap();
        assert_eq!(booking.origin.as_deref(), Some("new york"));
        assert_eq!(booking.max_budget.as_deref(), Some("five hundred"));
    }

    #[tokio::test]
    async fn test_other_intent_has_no_booking() {
        let recognizer = FixedRecognizer(RecognizerResult {
            text: String::new(),
            intents: intents(&[("BookFlight", 0.4), ("GetWeather", 0.9)]),
            entities: entities(&[("To", vec!["Paris"])]),
        });
        let turn = TurnContext::new("c1", "");

        let (intent, booking) = execute_query(&recognizer, &turn).await;
        assert_eq!(intent, Some(Intent::GetWeather));
        assert!(booking.is_none());
    }

    #[tokio::test]
    async fn test_recognizer_failure_degrades_to_nothing() {
        let turn = TurnContext::new("c1", "fly me to paris");
        let (intent, booking) = execute_query(&FailingRecognizer, &turn).await;
        assert!(intent.is_none());
        assert!(booking.is_none());
    }
}
