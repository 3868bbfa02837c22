use serde::{Deserialize, Serialize};

/// Flight booking being assembled over a conversation.
///
/// Dates hold either a definite calendar date (`2023-06-01`) or a TIMEX
/// expression that may still be ambiguous (`XXXX-WXX-6`). The budget is kept
/// as the user typed it and only checked for being numeric when captured.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookingRequest {
    pub destination: Option<String>,
    pub origin: Option<String>,
    pub max_budget: Option<String>,
    pub travel_date: Option<String>,
    pub travel_back_date: Option<String>,
    #[serde(default)]
    pub unsupported_airports: Vec<String>,
}

/// The five user-facing fields of a [`BookingRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingField {
    Destination,
    Origin,
    MaxBudget,
    TravelDate,
    TravelBackDate,
}

impl BookingField {
    pub const ALL: [BookingField; 5] = [
        BookingField::Destination,
        BookingField::Origin,
        BookingField::MaxBudget,
        BookingField::TravelDate,
        BookingField::TravelBackDate,
    ];

    pub fn slot_mut(self, booking: &mut BookingRequest) -> &mut Option<String> {
        match self {
            BookingField::Destination => &mut booking.destination,
            BookingField::Origin => &mut booking.origin,
            BookingField::MaxBudget => &mut booking.max_budget,
            BookingField::TravelDate => &mut booking.travel_date,
            BookingField::TravelBackDate => &mut booking.travel_back_date,
        }
    }

    pub fn slot(self, booking: &BookingRequest) -> Option<&str> {
        match self {
            BookingField::Destination => booking.destination.as_deref(),
            BookingField::Origin => booking.origin.as_deref(),
            BookingField::MaxBudget => booking.max_budget.as_deref(),
            BookingField::TravelDate => booking.travel_date.as_deref(),
            BookingField::TravelBackDate => booking.travel_back_date.as_deref(),
        }
    }
}

impl BookingRequest {
    pub fn is_complete(&self) -> bool {
        BookingField::ALL.iter().all(|f| f.slot(self).is_some())
    }

    pub fn confirmation_message(&self) -> String {
        format!(
            "Please confirm, I have you traveling to: {} from: {} on: {} and return for {} for {} dollars maximum.",
            self.destination.as_deref().unwrap_or_default(),
            self.origin.as_deref().unwrap_or_default(),
            self.travel_date.as_deref().unwrap_or_default(),
            self.travel_back_date.as_deref().unwrap_or_default(),
            self.max_budget.as_deref().unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_complete_needs_every_field() {
        let mut booking = BookingRequest {
            destination: Some("Paris".to_string()),
            origin: Some("Berlin".to_string()),
            max_budget: Some("500".to_string()),
            travel_date: Some("2023-06-01".to_string()),
            travel_back_date: None,
            unsupported_airports: vec![],
        };
        assert!(!booking.is_complete());

        *BookingField::TravelBackDate.slot_mut(&mut booking) = Some("2023-06-10".to_string());
        assert!(booking.is_complete());
    }

    #[test]
    fn test_confirmation_message_mentions_all_fields() {
        let booking = BookingRequest {
            destination: Some("Paris".to_string()),
            origin: Some("Berlin".to_string()),
            max_budget: Some("500".to_string()),
            travel_date: Some("2023-06-01".to_string()),
            travel_back_date: Some("2023-06-10".to_string()),
            unsupported_airports: vec![],
        };
        let msg = booking.confirmation_message();
        for part in ["Paris", "Berlin", "500", "2023-06-01", "2023-06-10"] {
            assert!(msg.contains(part), "missing {part} in {msg}");
        }
    }

    #[test]
    fn test_unsupported_airports_defaults_when_missing() {
        let booking: BookingRequest =
            serde_json::from_str(r#"{"destination":"Paris","origin":null,"max_budget":null,"travel_date":null,"travel_back_date":null}"#)
                .unwrap();
        assert!(booking.unsupported_airports.is_empty());
        assert_eq!(booking.destination.as_deref(), Some("Paris"));
    }
}
