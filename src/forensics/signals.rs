//! Forensic Signal Extractor
//!
//! Six quantitative measurements over the decoded planes. All of them are
//! always computed, even if no rule ends up using a given value.

use serde::{Deserialize, Serialize};

use super::edges;
use super::planes::ImagePlanes;
use super::ForensicError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForensicSignals {
    /// Variance of the Laplacian response (higher = sharper)
    pub sharpness: f64,
    /// Mean gray level, 0-255
    pub brightness: f64,
    /// Std-dev of gray levels, 0-255
    pub contrast: f64,
    /// Mean HSV saturation, 0-255
    pub saturation: f64,
    /// Fraction of edge pixels, 0-1
    pub edge_density: f64,
    /// Std-dev across the three channel means, 0-255
    pub color_cast: f64,
}

impl ForensicSignals {
    pub fn extract(planes: &ImagePlanes) -> Result<Self, ForensicError> {
        if planes.is_empty() {
            return Err(ForensicError::EmptyImage);
        }

        let (brightness, contrast) = mean_std(&planes.gray);
        let laplacian = laplacian(&planes.gray, planes.width, planes.height);
        let (_, lap_std) = mean_std_f64(&laplacian);
        let (saturation, _) = mean_std(&planes.saturation);
        let edge_density = edges::detect(&planes.gray, planes.width, planes.height).density();

        let channel_means = [mean(&planes.blue), mean(&planes.green), mean(&planes.red)];
        let (_, color_cast) = mean_std_f64(&channel_means);

        Ok(Self {
            sharpness: lap_std * lap_std,
            brightness,
            contrast,
            saturation,
            edge_density,
            color_cast,
        })
    }
}

/// Reflect-101 index (`gfedcb|abcdefgh|gfedcba`)
fn reflect_101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut i = i;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }
    i as usize
}

/// 4-neighbour Laplacian `[0 1 0; 1 -4 1; 0 1 0]`, reflect-101 borders
pub fn laplacian(gray: &[u8], width: usize, height: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(width * height);
    let px = |x: isize, y: isize| -> f64 {
        gray[reflect_101(y, height) * width + reflect_101(x, width)] as f64
    };

    for y in 0..height as isize {
        for x in 0..width as isize {
            let value = px(x, y - 1) + px(x - 1, y) + px(x + 1, y) + px(x, y + 1) - 4.0 * px(x, y);
            out.push(value);
        }
    }

    out
}

fn mean(values: &[u8]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as u64).sum::<u64>() as f64 / values.len() as f64
}

/// Population mean and standard deviation
fn mean_std(values: &[u8]) -> (f64, f64) {
    let m = mean(values);
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let var = values.iter().map(|&v| (v as f64 - m).powi(2)).sum::<f64>() / values.len() as f64;
    (m, var.sqrt())
}

fn mean_std_f64(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let m = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
    (m, var.sqrt())
}
