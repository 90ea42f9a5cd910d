//! Visual forensics renderings for the operator UI
//!
//! Edge map, Laplacian noise, equalised contrast and a saturation heatmap,
//! each returned as a `data:image/jpeg;base64,...` URL.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use serde::Serialize;

use super::planes::ImagePlanes;
use super::signals::laplacian;
use super::{edges, ForensicError};

#[derive(Debug, Clone, Serialize)]
pub struct VisualReport {
    pub edges: String,
    pub noise: String,
    pub contrast: String,
    pub heatmap: String,
}

pub fn render(planes: &ImagePlanes) -> Result<VisualReport, ForensicError> {
    let (w, h) = (planes.width, planes.height);

    let edge_map = edges::detect(&planes.gray, w, h).to_luma();
    let noise: Vec<u8> = laplacian(&planes.gray, w, h)
        .into_iter()
        .map(|v| v.abs().min(255.0) as u8)
        .collect();
    let contrast = equalize_histogram(&planes.gray);
    let heatmap: Vec<u8> = planes.saturation.iter().flat_map(|&s| jet(s)).collect();

    Ok(VisualReport {
        edges: encode_gray(edge_map, w, h)?,
        noise: encode_gray(noise, w, h)?,
        contrast: encode_gray(contrast, w, h)?,
        heatmap: encode_rgb(heatmap, w, h)?,
    })
}

/// Global histogram equalisation
pub fn equalize_histogram(gray: &[u8]) -> Vec<u8> {
    let mut hist = [0usize; 256];
    for &v in gray {
        hist[v as usize] += 1;
    }

    let total = gray.len();
    let mut cdf = [0usize; 256];
    let mut running = 0;
    for (i, count) in hist.iter().enumerate() {
        running += count;
        cdf[i] = running;
    }

    let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);
    if total == cdf_min {
        return gray.to_vec();
    }

    let scale = 255.0 / (total - cdf_min) as f64;
    let lut: Vec<u8> = cdf
        .iter()
        .map(|&c| ((c.saturating_sub(cdf_min)) as f64 * scale).round().clamp(0.0, 255.0) as u8)
        .collect();

    gray.iter().map(|&v| lut[v as usize]).collect()
}

/// JET colour map: blue -> cyan -> yellow -> red
pub fn jet(value: u8) -> [u8; 3] {
    let x = value as f64 / 255.0;
    let channel = |offset: f64| ((1.5 - (4.0 * x - offset).abs()).clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(3.0), channel(2.0), channel(1.0)]
}

fn encode_gray(data: Vec<u8>, w: usize, h: usize) -> Result<String, ForensicError> {
    let img = GrayImage::from_raw(w as u32, h as u32, data)
        .ok_or_else(|| ForensicError::Render("gray buffer size mismatch".to_string()))?;
    encode(DynamicImage::ImageLuma8(img))
}

fn encode_rgb(data: Vec<u8>, w: usize, h: usize) -> Result<String, ForensicError> {
    let img = RgbImage::from_raw(w as u32, h as u32, data)
        .ok_or_else(|| ForensicError::Render("rgb buffer size mismatch".to_string()))?;
    encode(DynamicImage::ImageRgb8(img))
}

fn encode(img: DynamicImage) -> Result<String, ForensicError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(|e| ForensicError::Render(e.to_string()))?;
    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(buf.into_inner())))
}
