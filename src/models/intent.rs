use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    BookFlight,
    Cancel,
    GetWeather,
    NoneIntent,
    Other(String),
}

impl Intent {
    pub fn as_str(&self) -> &str {
        match self {
            Intent::BookFlight => "BookFlight",
            Intent::Cancel => "Cancel",
            Intent::GetWeather => "GetWeather",
            Intent::NoneIntent => "None",
            Intent::Other(label) => label,
        }
    }

    pub fn parse(label: &str) -> Self {
        match label {
            "BookFlight" => Intent::BookFlight,
            "Cancel" => Intent::Cancel,
            "GetWeather" => Intent::GetWeather,
            "None" | "NoneIntent" => Intent::NoneIntent,
            other => Intent::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopIntent {
    pub intent: Intent,
    pub score: f64,
}

/// Raw output of an NLU recognizer for one utterance.
///
/// `intents` keeps the order the recognizer reported them in, which decides
/// ties in [`crate::services::nlu::intent::top_intent`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognizerResult {
    pub text: String,
    pub intents: Vec<(String, f64)>,
    pub entities: HashMap<String, Vec<String>>,
}
