use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;

use super::Recognizer;
use crate::models::RecognizerResult;
use crate::services::dialog::TurnContext;

/// LUIS v3 prediction endpoint client.
pub struct LuisRecognizer {
    app_id: String,
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl LuisRecognizer {
    pub fn new(app_id: String, api_key: String, host_name: String) -> Self {
        let host = host_name.trim_end_matches('/');
        let endpoint = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };
        Self {
            app_id,
            api_key,
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Recognizer for LuisRecognizer {
    async fn recognize(&self, turn: &TurnContext) -> anyhow::Result<RecognizerResult> {
        let url = format!(
            "{}/luis/prediction/v3.0/apps/{}/slots/production/predict",
            self.endpoint, self.app_id
        );

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("subscription-key", self.api_key.as_str()),
                ("verbose", "true"),
                ("show-all-intents", "true"),
                ("log", "true"),
                ("query", turn.text.as_str()),
            ])
            .send()
            .await
            .context("failed to call LUIS API")?;

        let status = resp.status();
        let data: Value = resp
            .json()
            .await
            .context("failed to parse LUIS response")?;

        if !status.is_success() {
            anyhow::bail!("LUIS API error ({}): {}", status, data);
        }

        parse_prediction(&turn.text, &data)
    }
}

pub fn parse_prediction(text: &str, data: &Value) -> anyhow::Result<RecognizerResult> {
    let prediction = data
        .get("prediction")
        .ok_or_else(|| anyhow::anyhow!("missing prediction in LUIS response"))?;

    // Object order is the service's order (serde_json preserve_order).
    let intents = prediction
        .get("intents")
        .and_then(Value::as_object)
        .map(|intents| {
            intents
                .iter()
                .map(|(label, v)| (label.clone(), v["score"].as_f64().unwrap_or(0.0)))
                .collect()
        })
        .unwrap_or_default();

    let mut entities = HashMap::new();
    if let Some(map) = prediction.get("entities").and_then(Value::as_object) {
        for (category, value) in map {
            if category.starts_with('$') {
                continue;
            }
            let mut values = Vec::new();
            flatten_entity(value, &mut values);
            if !values.is_empty() {
                entities.insert(category.clone(), values);
            }
        }
    }

    Ok(RecognizerResult {
        text: text.to_string(),
        intents,
        entities,
    })
}

fn flatten_entity(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Number(n) => out.push(n.to_string()),
        Value::Array(items) => {
            for item in items {
                flatten_entity(item, out);
            }
        }
        Value::Object(map) => {
            // datetimeV2: {"type": "date", "values": [{"timex": "..."}]}
            if let Some(values) = map.get("values").and_then(Value::as_array) {
                out.extend(
                    values
                        .iter()
                        .filter_map(|v| v.get("timex").and_then(Value::as_str))
                        .map(str::to_string),
                );
            } else if let Some(timex) = map.get("timex").and_then(Value::as_str) {
                out.push(timex.to_string());
            } else if let Some(text) = map.get("text").and_then(Value::as_str) {
                out.push(text.to_string());
            }
        }
        Value::Bool(_) | Value::Null => {}
    }
}
