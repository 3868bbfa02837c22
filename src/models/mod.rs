pub mod booking;
pub mod conversation;
pub mod dialog;
pub mod intent;

pub use booking::{BookingField, BookingRequest};
pub use conversation::Conversation;
pub use dialog::{BookingDialogState, BookingStep, DateSlot, PendingInput};
pub use intent::{Intent, RecognizerResult, TopIntent};
