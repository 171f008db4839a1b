//! Inference - ONNX Runtime integration
//!
//! Wraps the loaded session behind the `Classifier` seam so the scoring
//! service never talks to the runtime directly.

use std::path::Path;

use ndarray::Array2;
use parking_lot::Mutex;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;

use super::artifact::ArtifactError;
use super::ScoringError;

/// Opaque probability scorer over aligned feature rows.
///
/// Implementations return the positive-class probability per row, in input
/// order. They may fail per call but must never panic.
pub trait Classifier: Send + Sync {
    fn predict_proba(&self, rows: Array2<f32>) -> Result<Vec<f64>, ScoringError>;
}

/// ONNX-backed classifier. The session is loaded once and never swapped;
/// the lock only serializes `run` calls.
pub struct OnnxClassifier {
    session: Mutex<Session>,
}

impl OnnxClassifier {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::Load(format!(
                "model not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| ArtifactError::Load(format!("failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ArtifactError::Load(format!("failed to set optimization: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| ArtifactError::Load(format!("failed to load model: {}", e)))?;

        tracing::info!("ONNX session ready ({})", path.display());

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict_proba(&self, rows: Array2<f32>) -> Result<Vec<f64>, ScoringError> {
        let n = rows.nrows();
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut session = self.session.lock();

        let output_name = session
            .outputs()
            .iter()
            .find(|o| o.name() == "probabilities")
            .or_else(|| session.outputs().last())
            .map(|o| o.name().to_string())
            .ok_or_else(|| ScoringError::Inference("model defines no outputs".to_string()))?;

        let input = Value::from_array(rows)
            .map_err(|e| ScoringError::Inference(format!("tensor error: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| ScoringError::Inference(e.to_string()))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| ScoringError::Inference(format!("missing output '{}'", output_name)))?;

        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ScoringError::Inference(format!("extract error: {}", e)))?;
        let data = output_tensor.1;

        if data.is_empty() || data.len() % n != 0 {
            return Err(ScoringError::Inference(format!(
                "output length {} does not match batch size {}",
                data.len(),
                n
            )));
        }

        // (n, 2) carries [p_negative, p_positive] per row; (n, 1) or (n,) is
        // already the positive class
        let stride = data.len() / n;
        Ok((0..n)
            .map(|i| f64::from(data[i * stride + (stride - 1)]))
            .collect())
    }
}
