use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{BookingDialogState, BookingRequest, BookingStep, DateSlot, PendingInput};
use crate::services::telemetry::TelemetrySink;
use crate::services::timex;

use super::context::TurnContext;
use super::date_resolver::{ChildStatus, DateResolver};
use super::{
    detect_interruption, parse_confirmation, DialogTurnStatus, Interruption, StepInput,
    StepOutcome,
};

pub const DESTINATION_PROMPT: &str = "To what city would you like to travel?";
pub const ORIGIN_PROMPT: &str = "From what city will you be travelling?";
pub const BUDGET_PROMPT: &str = "What is your maximum budget for the trip?";
pub const BUDGET_WARNING: &str = "Be careful, your budget is most likely not a number!";
pub const DATE_ORDER_WARNING: &str = "Be careful! The return date is before the travel date.";
pub const CONFIRM_RETRY: &str = "Please answer yes or no.";
pub const HELP_MESSAGE: &str = "Show Help...";
pub const CANCEL_MESSAGE: &str = "Cancelling";

pub const EVENT_CONFIRMED: &str = "SuggestionConfirmed";
pub const EVENT_REFUTING: &str = "SuggestionRefuting";
pub const EVENT_WATERFALL_START: &str = "WaterfallStart";
pub const EVENT_WATERFALL_COMPLETE: &str = "WaterfallComplete";
pub const EVENT_WATERFALL_CANCEL: &str = "WaterfallCancel";

/// Slot-filling waterfall for a flight booking.
///
/// Each step either passes the already-known value through or suspends on a
/// prompt. Suspension is recorded in [`BookingDialogState::pending`], so the
/// caller only has to persist the state between turns.
pub struct BookingDialog {
    dialog_id: String,
    telemetry: Arc<dyn TelemetrySink>,
    departure: DateResolver,
    return_date: DateResolver,
}

impl BookingDialog {
    pub fn new(dialog_id: impl Into<String>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            dialog_id: dialog_id.into(),
            telemetry,
            departure: DateResolver::departure(),
            return_date: DateResolver::return_date(),
        }
    }

    pub fn dialog_id(&self) -> &str {
        &self.dialog_id
    }

    pub fn begin(
        &self,
        booking: BookingRequest,
        turn: &mut TurnContext,
    ) -> (BookingDialogState, DialogTurnStatus) {
        self.track(EVENT_WATERFALL_START, None);
        let mut state = BookingDialogState::new(booking);
        let status = self.run(&mut state, StepInput::Empty, turn);
        (state, status)
    }

    pub fn continue_dialog(
        &self,
        state: &mut BookingDialogState,
        turn: &mut TurnContext,
    ) -> DialogTurnStatus {
        match detect_interruption(&turn.text) {
            Some(Interruption::Help) => {
                turn.send_activity(HELP_MESSAGE);
                self.repeat_pending(state, turn);
                return DialogTurnStatus::Waiting;
            }
            Some(Interruption::Cancel) => {
                turn.send_activity(CANCEL_MESSAGE);
                self.track(EVENT_WATERFALL_CANCEL, Some(state.step));
                return DialogTurnStatus::Cancelled;
            }
            None => {}
        }

        let Some(pending) = state.pending.take() else {
            tracing::warn!(dialog = %self.dialog_id, step = state.step.as_str(), "resumed without a pending prompt, rerunning step");
            return self.run(state, StepInput::Empty, turn);
        };

        let input = match pending {
            PendingInput::Text { prompt } => {
                let text = turn.text.trim().to_string();
                if text.is_empty() {
                    turn.send_activity(prompt.clone());
                    state.pending = Some(PendingInput::Text { prompt });
                    return DialogTurnStatus::Waiting;
                }
                StepInput::Text(text)
            }
            PendingInput::Confirm { prompt } => match parse_confirmation(&turn.text) {
                Some(answer) => StepInput::Confirmation(answer),
                None => {
                    turn.send_activity(CONFIRM_RETRY);
                    turn.send_activity(prompt.clone());
                    state.pending = Some(PendingInput::Confirm { prompt });
                    return DialogTurnStatus::Waiting;
                }
            },
            PendingInput::Date { slot, .. } => match self.resolver(slot).resume(turn) {
                ChildStatus::Complete(date) => StepInput::Text(date),
                ChildStatus::Waiting(prompt) => {
                    state.pending = Some(PendingInput::Date { slot, prompt });
                    return DialogTurnStatus::Waiting;
                }
            },
        };

        match state.step.next() {
            Some(next) => {
                state.step = next;
                self.run(state, input, turn)
            }
            None => self.finish(None),
        }
    }

    fn run(
        &self,
        state: &mut BookingDialogState,
        mut input: StepInput,
        turn: &mut TurnContext,
    ) -> DialogTurnStatus {
        loop {
            tracing::debug!(dialog = %self.dialog_id, step = state.step.as_str(), "running waterfall step");

            let outcome = match state.step {
                BookingStep::Destination => self.destination_step(state),
                BookingStep::Origin => self.origin_step(state, input),
                BookingStep::MaxBudget => self.max_budget_step(state, input),
                BookingStep::TravelDate => self.travel_date_step(state, input, turn),
                BookingStep::TravelBackDate => self.travel_back_date_step(state, input),
                BookingStep::Confirm => self.confirm_step(state, input, turn),
                BookingStep::Final => self.final_step(state, input),
            };

            input = match outcome {
                StepOutcome::Next(value) => value,
                StepOutcome::PromptText(prompt) => {
                    turn.send_activity(prompt.clone());
                    state.pending = Some(PendingInput::Text { prompt });
                    return DialogTurnStatus::Waiting;
                }
                StepOutcome::PromptConfirm(prompt) => {
                    turn.send_activity(prompt.clone());
                    state.pending = Some(PendingInput::Confirm { prompt });
                    return DialogTurnStatus::Waiting;
                }
                StepOutcome::BeginChild { slot, seed } => {
                    match self.resolver(slot).begin(seed.as_deref(), turn) {
                        ChildStatus::Complete(date) => StepInput::Text(date),
                        ChildStatus::Waiting(prompt) => {
                            state.pending = Some(PendingInput::Date { slot, prompt });
                            return DialogTurnStatus::Waiting;
                        }
                    }
                }
                StepOutcome::End(result) => return self.finish(result),
            };

            match state.step.next() {
                Some(next) => state.step = next,
                None => return self.finish(None),
            }
        }
    }

    fn destination_step(&self, state: &BookingDialogState) -> StepOutcome {
        match &state.booking.destination {
            None => StepOutcome::PromptText(DESTINATION_PROMPT.to_string()),
            Some(destination) => StepOutcome::Next(StepInput::Text(destination.clone())),
        }
    }

    fn origin_step(&self, state: &mut BookingDialogState, input: StepInput) -> StepOutcome {
        capture(&mut state.booking.destination, input);
        match &state.booking.origin {
            None => StepOutcome::PromptText(ORIGIN_PROMPT.to_string()),
            Some(origin) => StepOutcome::Next(StepInput::Text(origin.clone())),
        }
    }

    fn max_budget_step(&self, state: &mut BookingDialogState, input: StepInput) -> StepOutcome {
        capture(&mut state.booking.origin, input);
        match &state.booking.max_budget {
            None => StepOutcome::PromptText(BUDGET_PROMPT.to_string()),
            Some(budget) => StepOutcome::Next(StepInput::Text(budget.clone())),
        }
    }

    fn travel_date_step(
        &self,
        state: &mut BookingDialogState,
        input: StepInput,
        turn: &mut TurnContext,
    ) -> StepOutcome {
        capture(&mut state.booking.max_budget, input);

        // Warn only; the user's final confirmation is what counts.
        if let Some(budget) = &state.booking.max_budget {
            if !is_numeric(budget) {
                turn.send_activity(BUDGET_WARNING);
            }
        }

        date_or_child(&state.booking.travel_date, DateSlot::Departure)
    }

    fn travel_back_date_step(&self, state: &mut BookingDialogState, input: StepInput) -> StepOutcome {
        capture(&mut state.booking.travel_date, input);
        date_or_child(&state.booking.travel_back_date, DateSlot::Return)
    }

    fn confirm_step(
        &self,
        state: &mut BookingDialogState,
        input: StepInput,
        turn: &mut TurnContext,
    ) -> StepOutcome {
        capture(&mut state.booking.travel_back_date, input);
        debug_assert!(state.booking.is_complete(), "confirm reached with missing fields");

        // Plain string comparison; only ISO dates order correctly this way.
        if let (Some(outbound), Some(back)) =
            (&state.booking.travel_date, &state.booking.travel_back_date)
        {
            if outbound > back {
                turn.send_activity(DATE_ORDER_WARNING);
            }
        }

        StepOutcome::PromptConfirm(state.booking.confirmation_message())
    }

    fn final_step(&self, state: &BookingDialogState, input: StepInput) -> StepOutcome {
        if input == StepInput::Confirmation(true) {
            self.track(EVENT_CONFIRMED, None);
            tracing::info!(dialog = %self.dialog_id, "booking confirmed");
            return StepOutcome::End(Some(state.booking.clone()));
        }

        self.track(EVENT_REFUTING, None);
        tracing::info!(dialog = %self.dialog_id, "booking refused");
        StepOutcome::End(None)
    }

    fn finish(&self, result: Option<BookingRequest>) -> DialogTurnStatus {
        self.track(EVENT_WATERFALL_COMPLETE, None);
        DialogTurnStatus::Complete(result)
    }

    fn repeat_pending(&self, state: &BookingDialogState, turn: &mut TurnContext) {
        match &state.pending {
            Some(PendingInput::Text { prompt })
            | Some(PendingInput::Confirm { prompt })
            | Some(PendingInput::Date { prompt, .. }) => turn.send_activity(prompt.clone()),
            None => {}
        }
    }

    fn resolver(&self, slot: DateSlot) -> &DateResolver {
        match slot {
            DateSlot::Departure => &self.departure,
            DateSlot::Return => &self.return_date,
        }
    }

    fn track(&self, name: &str, step: Option<BookingStep>) {
        let mut properties = HashMap::new();
        properties.insert("DialogId".to_string(), self.dialog_id.clone());
        if let Some(step) = step {
            properties.insert("StepName".to_string(), step.as_str().to_string());
        }
        self.telemetry.track_event(name, &properties);
    }
}

fn capture(field: &mut Option<String>, input: StepInput) {
    if let Some(value) = input.into_text() {
        *field = Some(value);
    }
}

fn date_or_child(current: &Option<String>, slot: DateSlot) -> StepOutcome {
    match current {
        Some(date) if !timex::is_ambiguous(date) => StepOutcome::Next(StepInput::Text(date.clone())),
        seed => StepOutcome::BeginChild {
            slot,
            seed: seed.clone(),
        },
    }
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
