pub mod conversation;
pub mod dialog;
pub mod nlu;
pub mod telemetry;
pub mod timex;
