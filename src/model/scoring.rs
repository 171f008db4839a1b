//! Scoring service
//!
//! Composes alignment, encoding and the classifier, derives the binary label
//! from the fixed decision threshold, and forwards every outcome to the
//! audit logger. Auditing never changes a scoring result.

use std::sync::Arc;

use ndarray::Array2;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::db::{AuditEntry, AuditSink};

use super::align;
use super::artifact::ModelMeta;
use super::inference::Classifier;
use super::ScoringError;

/// Fixed decision cutoff for the positive (attrition) class. Process-wide,
/// never recomputed from data.
pub const DECISION_THRESHOLD: f64 = 0.33;

#[derive(Debug, Clone, Serialize)]
pub struct Scoring {
    pub threshold: f64,
    pub proba: f64,
    pub pred: i16,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchScoring {
    pub threshold: f64,
    pub probas: Vec<f64>,
    pub preds: Vec<i16>,
}

pub struct ScoringService {
    classifier: Box<dyn Classifier>,
    meta: ModelMeta,
    audit: Arc<dyn AuditSink>,
}

impl ScoringService {
    pub fn new(classifier: Box<dyn Classifier>, meta: ModelMeta, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            classifier,
            meta,
            audit,
        }
    }

    pub fn threshold(&self) -> f64 {
        DECISION_THRESHOLD
    }

    pub fn model_version(&self) -> &str {
        &self.meta.version
    }

    pub fn audit_enabled(&self) -> bool {
        self.audit.is_enabled()
    }

    /// Score one record and audit the outcome.
    pub fn score_one(&self, record: &Map<String, Value>) -> Result<Scoring, ScoringError> {
        let result = self.score_rows(std::slice::from_ref(record)).and_then(|probas| {
            probas
                .first()
                .map(|&proba| Scoring {
                    threshold: DECISION_THRESHOLD,
                    proba,
                    pred: label(proba),
                })
                .ok_or_else(|| {
                    ScoringError::Inference("classifier returned no probability".to_string())
                })
        });

        let payload = Value::Object(record.clone());
        match &result {
            Ok(scoring) => self.audit.record(AuditEntry::ok(
                "api",
                payload,
                Some(scoring.proba),
                Some(scoring.pred),
                DECISION_THRESHOLD,
                self.model_version(),
            )),
            Err(e) => self.audit.record(AuditEntry::error(
                "api",
                payload,
                DECISION_THRESHOLD,
                self.model_version(),
                e.to_string(),
            )),
        }

        result
    }

    /// Score an ordered batch, all-or-nothing: one bad row rejects the lot.
    /// Audits one row per batch with synthetic aggregates over the results.
    pub fn score_batch(&self, records: &[Map<String, Value>]) -> Result<BatchScoring, ScoringError> {
        let result = self.score_rows(records).map(|probas| {
            let preds = probas.iter().map(|&p| label(p)).collect();
            BatchScoring {
                threshold: DECISION_THRESHOLD,
                probas,
                preds,
            }
        });

        let payload = json!({ "batch": records });
        match &result {
            Ok(batch) => {
                let n = batch.probas.len();
                let (proba, pred) = if n > 0 {
                    let mean = batch.probas.iter().sum::<f64>() / n as f64;
                    let positives = batch.preds.iter().filter(|&&p| p == 1).count();
                    (Some(mean), Some(i16::from(positives * 2 >= n)))
                } else {
                    (None, None)
                };
                self.audit.record(AuditEntry::ok(
                    "api-batch",
                    payload,
                    proba,
                    pred,
                    DECISION_THRESHOLD,
                    self.model_version(),
                ));
            }
            Err(e) => self.audit.record(AuditEntry::error(
                "api-batch",
                payload,
                DECISION_THRESHOLD,
                self.model_version(),
                e.to_string(),
            )),
        }

        result
    }

    fn score_rows(&self, records: &[Map<String, Value>]) -> Result<Vec<f64>, ScoringError> {
        let width = self.meta.feature_columns.len();
        let mut flat = Vec::with_capacity(records.len() * width);
        for record in records {
            flat.extend(align::encode_row(record, &self.meta)?);
        }
        let rows = Array2::from_shape_vec((records.len(), width), flat)
            .map_err(|e| ScoringError::Inference(e.to_string()))?;
        self.classifier.predict_proba(rows)
    }
}

fn label(proba: f64) -> i16 {
    i16::from(proba >= DECISION_THRESHOLD)
}
