//! Decoded pixel planes
//!
//! Separate 8-bit planes (gray, R, G, B, HSV saturation) in row-major order.
//! Conversions follow the usual 8-bit vision conventions: BT.601 luma with
//! rounding, and saturation `255 * (max - min) / max`.

use std::path::Path;

use image::RgbImage;

use super::ForensicError;

#[derive(Debug, Clone)]
pub struct ImagePlanes {
    pub width: usize,
    pub height: usize,
    pub gray: Vec<u8>,
    pub red: Vec<u8>,
    pub green: Vec<u8>,
    pub blue: Vec<u8>,
    pub saturation: Vec<u8>,
}

impl ImagePlanes {
    pub fn open(path: &Path) -> Result<Self, ForensicError> {
        let decoded = image::open(path).map_err(|e| ForensicError::ImageLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_rgb(&decoded.to_rgb8())
    }

    pub fn from_rgb(img: &RgbImage) -> Result<Self, ForensicError> {
        let (width, height) = (img.width() as usize, img.height() as usize);
        if width == 0 || height == 0 {
            return Err(ForensicError::EmptyImage);
        }

        let len = width * height;
        let mut planes = Self {
            width,
            height,
            gray: Vec::with_capacity(len),
            red: Vec::with_capacity(len),
            green: Vec::with_capacity(len),
            blue: Vec::with_capacity(len),
            saturation: Vec::with_capacity(len),
        };

        for pixel in img.pixels() {
            let [r, g, b] = pixel.0;
            planes.red.push(r);
            planes.green.push(g);
            planes.blue.push(b);
            planes.gray.push(luma(r, g, b));
            planes.saturation.push(saturation(r, g, b));
        }

        Ok(planes)
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// BT.601 luma, fixed point with rounding
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    const SHIFT: u32 = 14;
    let y = (r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + (1 << (SHIFT - 1))) >> SHIFT;
    y.min(255) as u8
}

/// HSV saturation scaled to 0-255
pub fn saturation(r: u8, g: u8, b: u8) -> u8 {
    let max = r.max(g).max(b) as u32;
    if max == 0 {
        return 0;
    }
    let min = r.min(g).min(b) as u32;
    ((255 * (max - min) + max / 2) / max) as u8
}
