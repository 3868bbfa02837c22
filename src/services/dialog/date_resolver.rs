use crate::models::DateSlot;
use crate::services::timex;

use super::context::TurnContext;

pub const DEPARTURE_PROMPT: &str = "When would you like to travel?";
pub const RETURN_PROMPT: &str = "When would you like to return?";
pub const REPROMPT: &str =
    "I'm sorry, for best results, please enter your travel date including the month, day and year.";

#[derive(Debug, Clone, PartialEq)]
pub enum ChildStatus {
    /// Suspended on the question it just asked.
    Waiting(String),
    Complete(String),
}

/// Sub-flow that keeps asking until it has one definite date.
#[derive(Debug, Clone)]
pub struct DateResolver {
    pub slot: DateSlot,
    prompt: &'static str,
}

impl DateResolver {
    pub fn departure() -> Self {
        Self {
            slot: DateSlot::Departure,
            prompt: DEPARTURE_PROMPT,
        }
    }

    pub fn return_date() -> Self {
        Self {
            slot: DateSlot::Return,
            prompt: RETURN_PROMPT,
        }
    }

    pub fn begin(&self, seed: Option<&str>, turn: &mut TurnContext) -> ChildStatus {
        match seed {
            None => self.ask(self.prompt, turn),
            Some(timex) if timex::is_ambiguous(timex) => self.ask(REPROMPT, turn),
            Some(timex) => ChildStatus::Complete(timex.to_string()),
        }
    }

    pub fn resume(&self, turn: &mut TurnContext) -> ChildStatus {
        match timex::resolve_user_date(&turn.text) {
            Some(date) => ChildStatus::Complete(date),
            None => {
                tracing::debug!(slot = ?self.slot, input = %turn.text, "date not definite, reprompting");
                self.ask(REPROMPT, turn)
            }
        }
    }

    fn ask(&self, prompt: &str, turn: &mut TurnContext) -> ChildStatus {
        turn.send_activity(prompt);
        ChildStatus::Waiting(prompt.to_string())
    }
}
