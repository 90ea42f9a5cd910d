//! Fixed-threshold edge detector
//!
//! Canny-style: 3x3 Sobel gradients, L1 magnitude, non-maximum suppression
//! along the quantised gradient direction, then hysteresis between a low and
//! a high threshold with 8-connectivity.

use std::collections::VecDeque;

/// Hysteresis thresholds on the L1 gradient magnitude
pub const LOW_THRESHOLD: i32 = 100;
pub const HIGH_THRESHOLD: i32 = 200;

/// tan(22.5°) and tan(67.5°) in 15-bit fixed point
const TAN_22_5: i64 = 13573;
const TAN_67_5: i64 = 79109;
const FIXED_SHIFT: u32 = 15;

/// Binary edge map, `true` where an edge pixel was kept
#[derive(Debug, Clone)]
pub struct EdgeMap {
    pub width: usize,
    pub height: usize,
    pub edges: Vec<bool>,
}

impl EdgeMap {
    pub fn count(&self) -> usize {
        self.edges.iter().filter(|&&e| e).count()
    }

    /// Fraction of pixels marked as edges, in [0, 1]
    pub fn density(&self) -> f64 {
        if self.edges.is_empty() {
            return 0.0;
        }
        self.count() as f64 / self.edges.len() as f64
    }

    /// 0/255 rendering
    pub fn to_luma(&self) -> Vec<u8> {
        self.edges.iter().map(|&e| if e { 255 } else { 0 }).collect()
    }
}

/// Replicate-border pixel fetch
fn at(gray: &[u8], width: usize, height: usize, x: isize, y: isize) -> i32 {
    let x = x.clamp(0, width as isize - 1) as usize;
    let y = y.clamp(0, height as isize - 1) as usize;
    gray[y * width + x] as i32
}

/// Sobel gradients (dx, dy)
pub fn sobel(gray: &[u8], width: usize, height: usize) -> (Vec<i32>, Vec<i32>) {
    let mut dx = vec![0i32; width * height];
    let mut dy = vec![0i32; width * height];

    for y in 0..height as isize {
        for x in 0..width as isize {
            let p = |ox: isize, oy: isize| at(gray, width, height, x + ox, y + oy);
            let idx = y as usize * width + x as usize;

            dx[idx] = (p(1, -1) + 2 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2 * p(-1, 0) + p(-1, 1));
            dy[idx] = (p(-1, 1) + 2 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2 * p(0, -1) + p(1, -1));
        }
    }

    (dx, dy)
}

pub fn detect(gray: &[u8], width: usize, height: usize) -> EdgeMap {
    detect_with(gray, width, height, LOW_THRESHOLD, HIGH_THRESHOLD)
}

pub fn detect_with(gray: &[u8], width: usize, height: usize, low: i32, high: i32) -> EdgeMap {
    let len = width * height;
    if len == 0 {
        return EdgeMap { width, height, edges: Vec::new() };
    }

    let (dx, dy) = sobel(gray, width, height);
    let magnitude: Vec<i32> = dx.iter().zip(&dy).map(|(gx, gy)| gx.abs() + gy.abs()).collect();
    let mag_at = |x: isize, y: isize| -> i32 {
        if x < 0 || y < 0 || x >= width as isize || y >= height as isize {
            0
        } else {
            magnitude[y as usize * width + x as usize]
        }
    };

    // 0 = suppressed, 1 = weak candidate, 2 = strong
    let mut class = vec![0u8; len];
    let mut queue = VecDeque::new();

    for y in 0..height as isize {
        for x in 0..width as isize {
            let idx = y as usize * width + x as usize;
            let m = magnitude[idx];
            if m <= low {
                continue;
            }

            let gx = dx[idx] as i64;
            let gy = dy[idx] as i64;
            let ax = gx.abs();
            let ay = gy.abs() << FIXED_SHIFT;
            let tg22 = ax * TAN_22_5;

            let is_max = if ay < tg22 {
                m > mag_at(x - 1, y) && m >= mag_at(x + 1, y)
            } else if ay > ax * TAN_67_5 {
                m > mag_at(x, y - 1) && m >= mag_at(x, y + 1)
            } else {
                let s: isize = if (gx < 0) != (gy < 0) { -1 } else { 1 };
                m > mag_at(x - s, y - 1) && m > mag_at(x + s, y + 1)
            };

            if is_max {
                if m > high {
                    class[idx] = 2;
                    queue.push_back(idx);
                } else {
                    class[idx] = 1;
                }
            }
        }
    }

    let mut edges = vec![false; len];
    for &idx in &queue {
        edges[idx] = true;
    }

    while let Some(idx) = queue.pop_front() {
        let (x, y) = ((idx % width) as isize, (idx / width) as isize);
        for oy in -1..=1 {
            for ox in -1..=1 {
                let (nx, ny) = (x + ox, y + oy);
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                let n = ny as usize * width + nx as usize;
                if class[n] == 1 && !edges[n] {
                    edges[n] = true;
                    queue.push_back(n);
                }
            }
        }
    }

    EdgeMap { width, height, edges }
}
