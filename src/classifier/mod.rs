//! Classifier Module - black-box note classifier
//!
//! The neural model is an external collaborator: the rest of the service only
//! sees `Classifier::classify(tensor) -> raw_score`.

pub mod preprocess;
pub mod onnx;

use std::path::Path;

use chrono::{DateTime, Local};
use ndarray::Array4;
use serde::Serialize;
use thiserror::Error;

pub use onnx::OnnxClassifier;
pub use preprocess::{load_and_normalize, PreprocessError};

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Raw score in [0, 1]; above 0.5 means genuine. Callers reject anything else.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &Array4<f32>) -> Result<f32, ClassifierError>;

    fn describe(&self) -> String;
}

/// Model file facts shown on the dashboard
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelInfo {
    pub status: String,
    pub size: String,
    pub date: String,
}

impl ModelInfo {
    pub fn from_path(path: &Path) -> Self {
        match std::fs::metadata(path) {
            Ok(meta) => {
                let size_mb = meta.len() as f64 / (1024.0 * 1024.0);
                let date = meta
                    .modified()
                    .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|_| "N/A".to_string());
                Self {
                    status: "Active".to_string(),
                    size: format!("{:.1} MB", size_mb),
                    date,
                }
            }
            Err(_) => Self {
                status: "Not Found".to_string(),
                size: "N/A".to_string(),
                date: "N/A".to_string(),
            },
        }
    }
}

/// Static training metadata, if present and parsable
pub fn load_model_metadata(path: &Path) -> Option<serde_json::Value> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring unparsable model metadata {}: {}", path.display(), e);
            None
        }
    }
}
