//! Response validation: raw body → [`Extraction`].
//!
//! The body is decoded as untyped JSON first and each record is checked on
//! its own. A wrong top-level shape fails the whole response with
//! [`FieldSenseError::MalformedResponse`]; a bad record is dropped with a
//! [`RecordError`] and the rest are kept.

use crate::document::{BoundingBox, DocumentData, Extraction};
use crate::error::{FieldSenseError, RecordError};
use serde_json::{Map, Value};
use tracing::warn;

/// Parse and validate a response body.
pub fn parse_extraction(body: &[u8]) -> Result<Extraction, FieldSenseError> {
    let root: Value = serde_json::from_slice(body).map_err(|e| FieldSenseError::MalformedResponse {
        detail: format!("body is not JSON: {e}"),
    })?;
    validate_value(root)
}

/// Validate an already-decoded JSON value.
pub fn validate_value(root: Value) -> Result<Extraction, FieldSenseError> {
    let mut root = match root {
        Value::Object(map) => map,
        other => {
            return Err(FieldSenseError::MalformedResponse {
                detail: format!("expected a JSON object, got {}", kind(&other)),
            })
        }
    };
    let records = match root.remove("results") {
        Some(Value::Array(records)) => records,
        Some(other) => {
            return Err(FieldSenseError::MalformedResponse {
                detail: format!("'results' must be an array, got {}", kind(&other)),
            })
        }
        None => {
            return Err(FieldSenseError::MalformedResponse {
                detail: "missing 'results' array".into(),
            })
        }
    };

    let mut results = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        match validate_record(record) {
            Ok(bbox) => results.push(bbox),
            Err(reason) => {
                warn!("Dropping record {}: {}", index, reason);
                rejected.push(RecordError { index, reason });
            }
        }
    }

    Ok(Extraction {
        document: DocumentData { results },
        rejected,
    })
}

fn validate_record(record: Value) -> Result<BoundingBox, String> {
    let mut obj = match record {
        Value::Object(map) => map,
        other => return Err(format!("expected an object, got {}", kind(&other))),
    };

    let class_id = match obj.remove("class_id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(Value::String(_)) => return Err("class_id is empty".into()),
        Some(other) => return Err(format!("class_id must be a string, got {}", kind(&other))),
        None => return Err("missing class_id".into()),
    };

    let bbox = read_bbox(&mut obj)?;

    let confidence = match obj.remove("confidence") {
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|c| c.is_finite())
            .ok_or_else(|| "confidence is not a finite number".to_string())?,
        Some(other) => return Err(format!("confidence must be a number, got {}", kind(&other))),
        None => return Err("missing confidence".into()),
    };
    if !(0.0..=1.0).contains(&confidence) {
        return Err(format!("confidence {confidence} is outside [0, 1]"));
    }

    let text = match obj.remove("text") {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => return Err(format!("text must be a string, got {}", kind(&other))),
    };

    Ok(BoundingBox {
        class_id,
        bbox,
        confidence,
        text,
    })
}

fn read_bbox(obj: &mut Map<String, Value>) -> Result<[f64; 4], String> {
    let coords = match obj.remove("bbox") {
        Some(Value::Array(coords)) => coords,
        Some(other) => return Err(format!("bbox must be an array, got {}", kind(&other))),
        None => return Err("missing bbox".into()),
    };
    if coords.len() != 4 {
        return Err(format!("bbox must have 4 numbers, got {}", coords.len()));
    }
    let mut out = [0.0; 4];
    for (slot, value) in out.iter_mut().zip(coords.iter()) {
        *slot = value
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("bbox coordinate {value} is not a finite number"))?;
    }
    Ok(out)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
