//! Defensive extractors over raw Fitbit payloads.
//!
//! Every function here is total over `Option<&Value>`: an absent payload
//! (endpoint returned 403/404 for this user/date) or any malformed
//! sub-structure degrades to `None`, never to an error. The Fitbit API has
//! shipped several shapes for the same logical metric over the years, so
//! each extractor tries the known shapes in a fixed priority order and
//! takes the first numeric value found. Non-numeric values count as absent.

use serde_json::Value;

/// Resting heart rate: `activities-heart[0].value.restingHeartRate`, integer only.
pub fn resting_hr(payload: Option<&Value>) -> Option<i64> {
    payload?
        .get("activities-heart")?
        .as_array()?
        .first()?
        .get("value")?
        .get("restingHeartRate")?
        .as_i64()
}

/// Total minutes asleep: `summary.totalMinutesAsleep`, integer only.
pub fn sleep_minutes(payload: Option<&Value>) -> Option<i64> {
    payload?
        .get("summary")?
        .get("totalMinutesAsleep")?
        .as_i64()
}

/// Body weight: last numeric `weight` in the weight log list. The log is
/// ordered oldest-first, so the reverse scan makes the most recent logged
/// value win.
pub fn weight(payload: Option<&Value>) -> Option<f64> {
    payload?
        .get("weight")?
        .as_array()?
        .iter()
        .rev()
        .find_map(|entry| entry.get("weight")?.as_f64())
}

/// Sleep score: `sleepScore` as an object with `score`, or a list of such
/// objects (first numeric wins), or a flat top-level `score`.
pub fn sleep_score(payload: Option<&Value>) -> Option<f64> {
    let payload = payload?;
    match payload.get("sleepScore") {
        Some(Value::Object(data)) => {
            if let Some(score) = data.get("score").and_then(Value::as_f64) {
                return Some(score);
            }
        }
        Some(Value::Array(entries)) => {
            if let Some(score) = entries.iter().find_map(|e| e.get("score")?.as_f64()) {
                return Some(score);
            }
        }
        _ => {}
    }
    payload.get("score").and_then(Value::as_f64)
}

const SLEEP_RECORD_HR_KEYS: [&str; 3] = ["averageHeartRate", "avgHeartRate", "heartRate"];
const SLEEP_SUMMARY_HR_KEYS: [&str; 2] = ["averageHeartRate", "avgHeartRate"];

/// Average sleeping heart rate: scan the sleep records for any of the three
/// known key spellings, then fall back to the summary object.
pub fn avg_sleeping_hr(payload: Option<&Value>) -> Option<f64> {
    let payload = payload?;
    if let Some(records) = payload.get("sleep").and_then(Value::as_array) {
        for record in records {
            for key in SLEEP_RECORD_HR_KEYS {
                if let Some(hr) = record.get(key).and_then(Value::as_f64) {
                    return Some(hr);
                }
            }
        }
    }
    let summary = payload.get("summary")?;
    SLEEP_SUMMARY_HR_KEYS
        .iter()
        .find_map(|key| summary.get(key)?.as_f64())
}

/// SpO2: entries under `value` or `spo2`, each carrying a nested `value.avg`
/// or a flat numeric `value`; a bare object with `avg`; or a flat top-level
/// `avg`.
pub fn spo2(payload: Option<&Value>) -> Option<f64> {
    let payload = payload?;
    let values = non_null(payload.get("value")).or_else(|| non_null(payload.get("spo2")));
    match values {
        Some(Value::Array(entries)) => {
            for entry in entries {
                match entry.get("value") {
                    Some(Value::Object(value)) => {
                        if let Some(avg) = value.get("avg").and_then(Value::as_f64) {
                            return Some(avg);
                        }
                    }
                    Some(value) => {
                        if let Some(avg) = value.as_f64() {
                            return Some(avg);
                        }
                    }
                    None => {}
                }
            }
        }
        Some(Value::Object(value)) => {
            if let Some(avg) = value.get("avg").and_then(Value::as_f64) {
                return Some(avg);
            }
        }
        _ => {}
    }
    payload.get("avg").and_then(Value::as_f64)
}

/// HRV: entries under `hrv` or `value`, each with nested `value.rmssd`, or a
/// bare object with `rmssd`.
pub fn hrv_rmssd(payload: Option<&Value>) -> Option<f64> {
    let payload = payload?;
    let values = non_null(payload.get("hrv")).or_else(|| non_null(payload.get("value")));
    match values {
        Some(Value::Array(entries)) => entries
            .iter()
            .find_map(|entry| entry.get("value")?.get("rmssd")?.as_f64()),
        Some(Value::Object(value)) => value.get("rmssd").and_then(Value::as_f64),
        _ => None,
    }
}

/// Readiness score: under `dailyReadiness` or `readiness`, either a list
/// (first numeric `score` wins) or an object with `score`, else a flat
/// top-level `score`.
pub fn readiness(payload: Option<&Value>) -> Option<f64> {
    let payload = payload?;
    let data =
        non_null(payload.get("dailyReadiness")).or_else(|| non_null(payload.get("readiness")));
    match data {
        Some(Value::Array(entries)) => {
            if let Some(score) = entries.iter().find_map(|e| e.get("score")?.as_f64()) {
                return Some(score);
            }
        }
        Some(Value::Object(data)) => {
            if let Some(score) = data.get("score").and_then(Value::as_f64) {
                return Some(score);
            }
        }
        _ => {}
    }
    payload.get("score").and_then(Value::as_f64)
}

/// Breathing rate: entries under `br` or `value`, each with nested
/// `value.breathingRate` or a flat numeric `value`, or a bare object with
/// `breathingRate`.
pub fn respiration(payload: Option<&Value>) -> Option<f64> {
    let payload = payload?;
    let values = non_null(payload.get("br")).or_else(|| non_null(payload.get("value")));
    match values {
        Some(Value::Array(entries)) => entries.iter().find_map(|entry| {
            match entry.get("value")? {
                Value::Object(value) => value.get("breathingRate").and_then(Value::as_f64),
                other => other.as_f64(),
            }
        }),
        Some(Value::Object(value)) => value.get("breathingRate").and_then(Value::as_f64),
        _ => None,
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}
