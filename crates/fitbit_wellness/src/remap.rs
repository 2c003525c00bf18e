//! Field-map remapping: project a normalized day of metrics into the
//! Intervals.icu wellness schema.

use serde_json::{Map, Value, json};

use crate::SyncError;
use crate::extract;

/// One calendar day of normalized Fitbit metrics. Built fresh per run and
/// never mutated; absent metrics stay `None`.
#[derive(Clone, Debug)]
pub struct DailyRecord {
    pub date: String,
    /// The `summary` object of the daily activity payload, vendor-shaped.
    pub summary: Value,
    /// The raw sleep payload, vendor-shaped.
    pub sleep: Value,
    pub rhr: Option<i64>,
    pub weight: Option<f64>,
    pub sleep_score: Option<f64>,
    pub avg_sleeping_hr: Option<f64>,
    pub spo2: Option<f64>,
    pub hrv_rmssd: Option<f64>,
    pub readiness: Option<f64>,
    pub respiration: Option<f64>,
}

impl DailyRecord {
    /// Structural view the field-map source paths resolve against. Absent
    /// optionals appear as JSON null, which the builder treats as absent.
    pub fn projection(&self) -> Value {
        json!({
            "date": self.date,
            "summary": self.summary,
            "sleep": {
                "minutes": extract::sleep_minutes(Some(&self.sleep)),
                "score": self.sleep_score,
                "avg_hr": self.avg_sleeping_hr,
                "raw": self.sleep,
            },
            "rhr": self.rhr,
            "weight": self.weight,
            "spo2": self.spo2,
            "hrv": {"rmssd": self.hrv_rmssd},
            "readiness": self.readiness,
            "respiration": self.respiration,
        })
    }
}

/// Ordered mapping from Intervals.icu wellness field to a dotted source path
/// in the [`DailyRecord`] projection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMap(Vec<(String, String)>);

impl Default for FieldMap {
    fn default() -> Self {
        Self(
            [
                ("weight", "weight"),
                ("restingHR", "rhr"),
                ("sleepSecs", "sleep.minutes"),
                ("sleepScore", "sleep.score"),
                ("avgSleepingHR", "sleep.avg_hr"),
                ("spO2", "spo2"),
                ("hrv", "hrv.rmssd"),
                ("readiness", "readiness"),
                ("respiration", "respiration"),
                ("steps", "summary.steps"),
                ("kcalConsumed", "summary.caloriesOut"),
            ]
            .into_iter()
            .map(|(field, path)| (field.to_string(), path.to_string()))
            .collect(),
        )
    }
}

impl FieldMap {
    /// Parse a user-supplied JSON object of `{"targetField": "source.path"}`.
    pub fn from_json(raw: &str) -> Result<Self, SyncError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| SyncError::Config(format!("field map is not valid JSON: {e}")))?;
        let object = value
            .as_object()
            .ok_or_else(|| SyncError::Config("field map must be a JSON object".into()))?;
        let mut pairs = Vec::with_capacity(object.len());
        for (field, path) in object {
            let path = path.as_str().ok_or_else(|| {
                SyncError::Config(format!("field map entry {field:?} must map to a string path"))
            })?;
            pairs.push((field.clone(), path.to_string()));
        }
        Ok(Self(pairs))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, p)| (f.as_str(), p.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolve a dotted path against a nested object view.
///
/// An exact top-level key wins over traversal, so flat keys containing
/// literal dots stay addressable. No wildcard or index syntax.
pub fn resolve<'a>(view: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(value) = view.get(path) {
        return Some(value);
    }
    let mut current = view;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Project a record through the field map. Fields whose source path resolves
/// to absent (or null) are omitted outright, never emitted as placeholders.
///
/// `sleepSecs` is the one unit-converting field: a numeric source value is
/// taken as minutes and emitted as whole seconds; a non-numeric source is
/// omitted.
pub fn build_payload(field_map: &FieldMap, record: &DailyRecord) -> Map<String, Value> {
    let view = record.projection();
    let mut payload = Map::new();
    for (target, source) in field_map.iter() {
        let Some(value) = resolve(&view, source) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        if target == "sleepSecs" {
            if let Some(minutes) = value.as_f64() {
                payload.insert(target.to_string(), json!((minutes * 60.0) as i64));
            }
            continue;
        }
        payload.insert(target.to_string(), value.clone());
    }
    payload
}
