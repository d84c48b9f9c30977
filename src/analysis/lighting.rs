use serde::{Deserialize, Serialize};

use crate::config::BrightnessThresholds;
use crate::pixels::{PixelBuffer, luminance_grid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightingCondition {
    Normal,
    LowLight,
    VeryDark,
    OverExposed,
}

impl LightingCondition {
    pub fn is_low_light(self) -> bool {
        matches!(self, LightingCondition::LowLight)
    }
}

/// Global luminance estimate, computed once and read by every later stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LightingProfile {
    pub avg_brightness: f64,
    pub min_brightness: f64,
    pub max_brightness: f64,
    pub condition: LightingCondition,
}

/// Grid-sampled brightness classifier. A fixed coarse grid gives a stable
/// global estimate independent of input resolution; full-resolution scanning
/// would dominate runtime on large frames without changing the verdict.
pub struct BrightnessAnalyzer {
    thresholds: BrightnessThresholds,
}

impl BrightnessAnalyzer {
    pub fn new(thresholds: BrightnessThresholds) -> Self {
        Self { thresholds }
    }

    pub fn analyze(&self, buffer: &PixelBuffer) -> LightingProfile {
        let grid = luminance_grid(buffer, self.thresholds.grid_cols, self.thresholds.grid_rows);

        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &lum in grid.iter() {
            sum += lum;
            min = min.min(lum);
            max = max.max(lum);
        }
        let avg = sum / grid.len() as f64;

        let condition = if avg < self.thresholds.very_dark_below {
            LightingCondition::VeryDark
        } else if avg < self.thresholds.low_light_below {
            LightingCondition::LowLight
        } else if avg > self.thresholds.over_exposed_above {
            LightingCondition::OverExposed
        } else {
            LightingCondition::Normal
        };

        LightingProfile {
            avg_brightness: avg,
            min_brightness: min,
            max_brightness: max,
            condition,
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::pixels::PixelBuffer;

    fn solid(value: u8) -> PixelBuffer {
        let image = RgbaImage::from_pixel(64, 64, Rgba([value, value, value, 255]));
        PixelBuffer::new(image).unwrap()
    }

    #[test]
    fn classifies_the_four_conditions() {
        let analyzer = BrightnessAnalyzer::new(BrightnessThresholds::default());

        assert_eq!(
            analyzer.analyze(&solid(5)).condition,
            LightingCondition::VeryDark
        );
        assert_eq!(
            analyzer.analyze(&solid(30)).condition,
            LightingCondition::LowLight
        );
        assert_eq!(
            analyzer.analyze(&solid(128)).condition,
            LightingCondition::Normal
        );
        assert_eq!(
            analyzer.analyze(&solid(250)).condition,
            LightingCondition::OverExposed
        );
    }

    #[test]
    fn profile_tracks_min_and_max() {
        let analyzer = BrightnessAnalyzer::new(BrightnessThresholds::default());
        let profile = analyzer.analyze(&solid(128));
        assert!((profile.min_brightness - profile.max_brightness).abs() < 0.01);
        assert!(profile.avg_brightness > 120.0 && profile.avg_brightness < 135.0);
    }
}
