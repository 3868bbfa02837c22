use serde::{Deserialize, Serialize};

use super::booking::BookingRequest;

/// Steps of the booking waterfall, in the order they run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    Destination,
    Origin,
    MaxBudget,
    TravelDate,
    TravelBackDate,
    Confirm,
    Final,
}

impl BookingStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStep::Destination => "destination",
            BookingStep::Origin => "origin",
            BookingStep::MaxBudget => "max_budget",
            BookingStep::TravelDate => "travel_date",
            BookingStep::TravelBackDate => "travel_back_date",
            BookingStep::Confirm => "confirm",
            BookingStep::Final => "final",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            BookingStep::Destination => Some(BookingStep::Origin),
            BookingStep::Origin => Some(BookingStep::MaxBudget),
            BookingStep::MaxBudget => Some(BookingStep::TravelDate),
            BookingStep::TravelDate => Some(BookingStep::TravelBackDate),
            BookingStep::TravelBackDate => Some(BookingStep::Confirm),
            BookingStep::Confirm => Some(BookingStep::Final),
            BookingStep::Final => None,
        }
    }
}

/// Which date resolver instance a child flow belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DateSlot {
    Departure,
    Return,
}

/// What the suspended waterfall is waiting for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingInput {
    Text { prompt: String },
    Confirm { prompt: String },
    /// `prompt` is the question the resolver last asked.
    Date { slot: DateSlot, prompt: String },
}

/// Everything needed to resume a booking waterfall on the next turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingDialogState {
    /// Step that suspended, or the step about to run.
    pub step: BookingStep,
    pub booking: BookingRequest,
    pub pending: Option<PendingInput>,
}

impl BookingDialogState {
    pub fn new(booking: BookingRequest) -> Self {
        Self {
            step: BookingStep::Destination,
            booking,
            pending: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_advance_in_order() {
        let mut step = BookingStep::Destination;
        let mut visited = vec![step];
        while let Some(next) = step.next() {
            visited.push(next);
            step = next;
        }
        assert_eq!(visited.len(), 7);
        assert_eq!(visited.last(), Some(&BookingStep::Final));
    }

    #[test]
    fn test_state_survives_json() {
        let mut state = BookingDialogState::new(BookingRequest {
            destination: Some("Paris".to_string()),
            ..Default::default()
        });
        state.step = BookingStep::TravelDate;
        state.pending = Some(PendingInput::Date {
            slot: DateSlot::Departure,
            prompt: "When would you like to travel?".to_string(),
        });

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains(r#""kind":"date""#));
        assert!(json.contains(r#""step":"travel_date""#));

        let restored: BookingDialogState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }
}
