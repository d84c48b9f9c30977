use image::RgbaImage;
use ndarray::Array2;

use crate::error::{GateError, Result};

/// Decoded RGBA frame owned by one validation call.
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    pub fn new(image: RgbaImage) -> Result<Self> {
        let expected = (image.width() * image.height() * 4) as usize;
        let actual = image.as_raw().len();
        if expected != actual {
            return Err(GateError::BufferSizeMismatch { expected, actual });
        }

        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn luminance_at(&self, x: u32, y: u32) -> f64 {
        let [r, g, b, _] = self.rgba(x, y);
        luminance(r, g, b)
    }
}

pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

/// Luminance sampled on a fixed cols x rows grid, independent of resolution.
pub fn luminance_grid(buffer: &PixelBuffer, cols: u32, rows: u32) -> Array2<f64> {
    let mut grid = Array2::zeros((rows as usize, cols as usize));

    for gy in 0..rows {
        for gx in 0..cols {
            let x = grid_coord(gx, cols, buffer.width());
            let y = grid_coord(gy, rows, buffer.height());
            grid[[gy as usize, gx as usize]] = buffer.luminance_at(x, y);
        }
    }

    grid
}

/// Maps grid index i of n to a pixel coordinate centered in its cell.
pub fn grid_coord(i: u32, n: u32, dim: u32) -> u32 {
    ((i as u64 * 2 + 1) * dim as u64 / (n as u64 * 2)).min(dim as u64 - 1) as u32
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}
