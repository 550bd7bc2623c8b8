use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /predict`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PredictRequest {
    /// `data:image/png;base64,...`
    pub image: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PredictionResult {
    pub prediction: String,
    pub confidence: f64,
    /// In the order the classifier listed them.
    pub probabilities: Vec<(String, f64)>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClientError {
    /// The classifier answered with a truthy `error` field.
    Endpoint,
    /// No usable answer: network failure, bad body, or a bare non-2xx status.
    Transport(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Endpoint => write!(f, "classifier reported an error"),
            ClientError::Transport(reason) => write!(f, "transport failure: {reason}"),
        }
    }
}

impl std::error::Error for ClientError {}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn has_error_indicator(body: &Value) -> bool {
    body.get("error").map_or(false, is_truthy)
}

/// Classifies a finished HTTP exchange into a result or a client error.
pub fn decode_response(status: u16, body: &str) -> Result<PredictionResult, ClientError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|error| ClientError::Transport(format!("invalid JSON body: {error}")))?;
    if !value.is_object() {
        return Err(ClientError::Transport("response is not an object".into()));
    }
    if has_error_indicator(&value) {
        return Err(ClientError::Endpoint);
    }
    if !(200..300).contains(&status) {
        return Err(ClientError::Transport(format!("HTTP status {status}")));
    }
    parse_prediction(&value)
}

fn parse_prediction(value: &Value) -> Result<PredictionResult, ClientError> {
    let missing = |field: &str| ClientError::Transport(format!("missing or invalid `{field}`"));
    let prediction = value
        .get("prediction")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("prediction"))?
        .to_string();
    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or_else(|| missing("confidence"))?;
    let entries = value
        .get("probabilities")
        .and_then(Value::as_object)
        .ok_or_else(|| missing("probabilities"))?;
    let mut probabilities = Vec::with_capacity(entries.len());
    for (shape, probability) in entries {
        let probability = probability
            .as_f64()
            .ok_or_else(|| missing("probabilities"))?;
        probabilities.push((shape.clone(), probability));
    }
    Ok(PredictionResult {
        prediction,
        confidence,
        probabilities,
    })
}
