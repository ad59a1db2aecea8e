//! Request and response bodies of the prediction service.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FetchError;
use crate::schema::ForecastKind;

/// Text shown for a result field the service returned as `null`.
pub const UNAVAILABLE: &str = "unavailable";

/// Key of the point estimate in a temperature result.
pub const PREDICTION_KEY: &str = "prediction";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemperatureRequest {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub dayofweek: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRequest {
    pub year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvironmentRequest {
    pub year: i32,
    pub temperature: f64,
}

/// A validated forecast request, serialized as the bare body of its endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForecastRequest {
    Temperature(TemperatureRequest),
    Mortality(YearRequest),
    Environment(EnvironmentRequest),
    Economy(YearRequest),
}

impl ForecastRequest {
    pub fn kind(&self) -> ForecastKind {
        match self {
            ForecastRequest::Temperature(_) => ForecastKind::Temperature,
            ForecastRequest::Mortality(_) => ForecastKind::Mortality,
            ForecastRequest::Environment(_) => ForecastKind::Environment,
            ForecastRequest::Economy(_) => ForecastKind::Economy,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.kind().endpoint()
    }

    pub fn year(&self) -> i32 {
        match self {
            ForecastRequest::Temperature(r) => r.year,
            ForecastRequest::Mortality(r) | ForecastRequest::Economy(r) => r.year,
            ForecastRequest::Environment(r) => r.year,
        }
    }

    /// JSON body as sent on the wire.
    pub fn body(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// One value of a forecast result.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultValue {
    Number(f64),
    Text(String),
}

impl ResultValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResultValue::Number(n) => Some(*n),
            ResultValue::Text(_) => None,
        }
    }
}

impl std::fmt::Display for ResultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultValue::Number(n) => {
                // At most three decimals, trailing zeros trimmed.
                let s = format!("{:.3}", n);
                let s = s.trim_end_matches('0').trim_end_matches('.');
                write!(f, "{}", s)
            }
            ResultValue::Text(t) => write!(f, "{}", t),
        }
    }
}

/// Ordered, non-empty key/value result of a forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    entries: Vec<(String, ResultValue)>,
}

impl ForecastResult {
    /// `None` when `entries` is empty.
    pub fn new(entries: Vec<(String, ResultValue)>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(ForecastResult { entries })
        }
    }

    pub fn first_key(&self) -> &str {
        // Non-empty by construction.
        self.entries.first().map(|(k, _)| k.as_str()).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&ResultValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Deserialize)]
struct TemperatureResponse {
    prediction: f64,
    range: TemperatureRange,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TemperatureRange {
    Pair([f64; 2]),
    Bounds { lower: f64, upper: f64 },
}

const MORTALITY_FIELDS: [&str; 3] = ["population", "death_rate", "expected_deaths"];

/// Decode a successful response body for `kind`.
pub fn parse_response(kind: ForecastKind, body: &str) -> Result<ForecastResult, FetchError> {
    match kind {
        ForecastKind::Temperature => parse_temperature(body),
        ForecastKind::Mortality => {
            let map = parse_object(body)?;
            let entries = MORTALITY_FIELDS
                .iter()
                .map(|field| {
                    let value = map
                        .get(*field)
                        .ok_or_else(|| FetchError::Schema(format!("missing field '{}'", field)))?;
                    Ok((field.to_string(), to_result_value(field, value)?))
                })
                .collect::<Result<Vec<_>, FetchError>>()?;
            ForecastResult::new(entries).ok_or_else(|| FetchError::Schema("empty result".into()))
        }
        ForecastKind::Environment | ForecastKind::Economy => {
            let map = parse_object(body)?;
            let entries = map
                .iter()
                .map(|(k, v)| Ok((k.clone(), to_result_value(k, v)?)))
                .collect::<Result<Vec<_>, FetchError>>()?;
            ForecastResult::new(entries)
                .ok_or_else(|| FetchError::Schema("response contained no indicators".into()))
        }
    }
}

fn parse_temperature(body: &str) -> Result<ForecastResult, FetchError> {
    let resp: TemperatureResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Schema(e.to_string()))?;
    let (lower, upper) = match resp.range {
        TemperatureRange::Pair([lo, hi]) => (lo, hi),
        TemperatureRange::Bounds { lower, upper } => (lower, upper),
    };
    let entries = vec![
        (PREDICTION_KEY.to_string(), ResultValue::Number(resp.prediction)),
        ("lower".to_string(), ResultValue::Number(lower)),
        ("upper".to_string(), ResultValue::Number(upper)),
    ];
    ForecastResult::new(entries).ok_or_else(|| FetchError::Schema("empty result".into()))
}

fn parse_object(body: &str) -> Result<Map<String, Value>, FetchError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(FetchError::Schema(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(FetchError::Schema(e.to_string())),
    }
}

fn to_result_value(key: &str, value: &Value) -> Result<ResultValue, FetchError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(ResultValue::Number)
            .ok_or_else(|| FetchError::Schema(format!("'{}' is not representable", key))),
        Value::String(s) => Ok(ResultValue::Text(s.clone())),
        Value::Null => Ok(ResultValue::Text(UNAVAILABLE.to_string())),
        other => Err(FetchError::Schema(format!(
            "'{}' is a {}, expected a number",
            key,
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Message of an `{"error": "..."}` body, if that is what `body` is.
pub fn service_error_message(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body).ok()? {
        Value::Object(map) => map.get("error")?.as_str().map(str::to_string),
        _ => None,
    }
}
