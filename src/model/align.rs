//! Feature alignment and encoding
//!
//! The classifier is order-sensitive: every input row must carry exactly the
//! trained feature columns, in the trained order. Alignment never fails;
//! encoding fails only on values the model cannot consume (unseen category,
//! non-finite number).

use serde_json::{Map, Value};

use super::artifact::ModelMeta;
use super::ScoringError;

/// Map an arbitrary record onto the trained column list.
///
/// Missing columns take the per-column default from the metadata, falling
/// back to numeric zero. Fields the model was not trained on are dropped.
pub fn align(record: &Map<String, Value>, meta: &ModelMeta) -> Vec<Value> {
    meta.feature_columns
        .iter()
        .map(|column| {
            record
                .get(column)
                .cloned()
                .or_else(|| meta.defaults.get(column).cloned())
                .unwrap_or_else(|| Value::from(0))
        })
        .collect()
}

/// Align and encode one record into the f32 row the classifier consumes.
pub fn encode_row(record: &Map<String, Value>, meta: &ModelMeta) -> Result<Vec<f32>, ScoringError> {
    meta.feature_columns
        .iter()
        .zip(align(record, meta))
        .map(|(column, value)| encode_value(column, &value, meta))
        .collect()
}

fn encode_value(column: &str, value: &Value, meta: &ModelMeta) -> Result<f32, ScoringError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(|v| v as f32)
            .filter(|v| v.is_finite())
            .ok_or_else(|| ScoringError::BadValue {
                column: column.to_string(),
                value: value.to_string(),
            }),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => {
            let vocabulary = meta.categories.get(column).ok_or_else(|| {
                ScoringError::BadValue {
                    column: column.to_string(),
                    value: value.to_string(),
                }
            })?;
            vocabulary
                .iter()
                .position(|category| category == s)
                .map(|code| code as f32)
                .ok_or_else(|| ScoringError::UnseenCategory {
                    column: column.to_string(),
                    value: s.clone(),
                })
        }
        _ => Err(ScoringError::BadValue {
            column: column.to_string(),
            value: value.to_string(),
        }),
    }
}
