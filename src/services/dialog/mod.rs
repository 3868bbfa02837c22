pub mod booking;
pub mod context;
pub mod date_resolver;

pub use booking::BookingDialog;
pub use context::TurnContext;

use crate::models::{BookingRequest, DateSlot};

/// Value handed from one waterfall step to the next.
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    Empty,
    Text(String),
    Confirmation(bool),
}

impl StepInput {
    pub fn into_text(self) -> Option<String> {
        match self {
            StepInput::Text(text) => Some(text),
            StepInput::Empty | StepInput::Confirmation(_) => None,
        }
    }
}

/// What a step asks the dialog host to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    PromptText(String),
    PromptConfirm(String),
    BeginChild { slot: DateSlot, seed: Option<String> },
    Next(StepInput),
    End(Option<BookingRequest>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialogTurnStatus {
    Waiting,
    Complete(Option<BookingRequest>),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    Help,
    Cancel,
}

pub fn detect_interruption(text: &str) -> Option<Interruption> {
    match text.trim().to_lowercase().as_str() {
        "help" | "?" => Some(Interruption::Help),
        "cancel" | "quit" => Some(Interruption::Cancel),
        _ => None,
    }
}

pub fn parse_confirmation(text: &str) -> Option<bool> {
    let normalized = text.trim().trim_end_matches(&['.', '!'][..]).to_lowercase();
    match normalized.as_str() {
        "yes" | "y" | "yeah" | "yep" | "sure" | "ok" | "okay" | "true" | "1" => Some(true),
        "no" | "n" | "nope" | "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_interruption() {
        assert_eq!(detect_interruption(" HELP "), Some(Interruption::Help));
        assert_eq!(detect_interruption("?"), Some(Interruption::Help));
        assert_eq!(detect_interruption("Quit"), Some(Interruption::Cancel));
        assert_eq!(detect_interruption("cancel my flight please"), None);
    }

    #[test]
    fn test_parse_confirmation() {
        assert_eq!(parse_confirmation("Yes!"), Some(true));
        assert_eq!(parse_confirmation("ok"), Some(true));
        assert_eq!(parse_confirmation("nope"), Some(false));
        assert_eq!(parse_confirmation("maybe"), None);
    }
}
