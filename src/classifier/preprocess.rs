//! Model input preparation
//!
//! Decode, force RGB, nearest-neighbour resize to the model's square input,
//! scale to [0, 1]. Layout is NHWC with a batch of one. Must match training.

use std::path::Path;

use image::imageops::FilterType;
use ndarray::Array4;
use thiserror::Error;

pub const INPUT_SIZE: u32 = 224;
pub const INPUT_CHANNELS: usize = 3;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("could not decode image {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("unexpected tensor shape: {0}")]
    Shape(String),
}

pub fn load_and_normalize(path: &Path) -> Result<Array4<f32>, PreprocessError> {
    let decoded = image::open(path).map_err(|e| PreprocessError::Decode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let rgb = decoded
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Nearest)
        .to_rgb8();

    let side = INPUT_SIZE as usize;
    let data: Vec<f32> = rgb.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();

    Array4::from_shape_vec((1, side, side, INPUT_CHANNELS), data)
        .map_err(|e| PreprocessError::Shape(e.to_string()))
}
