//! ONNX Runtime classifier
//!
//! Single-output binary model: input `[1, 224, 224, 3]` in [0, 1], output
//! the probability that the note is genuine.

use std::path::Path;

use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::{Classifier, ClassifierError};

pub struct OnnxClassifier {
    session: Mutex<Session>,
    output_name: String,
    model_path: String,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path) -> Result<Self, ClassifierError> {
        tracing::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ClassifierError::Unavailable(format!(
                "Model not found: {}",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| ClassifierError::Unavailable(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::Unavailable(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ClassifierError::Unavailable(format!("Failed to load model: {}", e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ClassifierError::Unavailable("No output defined".to_string()))?;

        tracing::info!("ONNX model loaded successfully");

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            model_path: model_path.display().to_string(),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, input: &Array4<f32>) -> Result<f32, ClassifierError> {
        let start = std::time::Instant::now();

        let input_tensor = Value::from_array(input.clone())
            .map_err(|e| ClassifierError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ClassifierError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ClassifierError::Inference("No output".to_string()))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("Extract error: {}", e)))?;

        let score = data
            .first()
            .copied()
            .ok_or_else(|| ClassifierError::Inference("Empty output tensor".to_string()))?;

        tracing::debug!("Inference took {} us", start.elapsed().as_micros());
        Ok(score)
    }

    fn describe(&self) -> String {
        format!("ONNX Runtime (CPU): {}", self.model_path)
    }
}
