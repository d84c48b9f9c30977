use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::analysis::lighting::LightingCondition;
use crate::config::LivenessThresholds;
use crate::pixels::PixelBuffer;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LivenessResult {
    pub is_live: bool,
    pub variation_ratio: f64,
    pub exempted: bool,
}

/// Coarse anti-replay signal: a genuine sensor capture shows more random
/// local luminance variation than flat, synthetic, or heavily compressed
/// static imagery.
pub struct LivenessEstimator {
    thresholds: LivenessThresholds,
}

impl LivenessEstimator {
    pub fn new(thresholds: LivenessThresholds) -> Self {
        Self { thresholds }
    }

    pub fn analyze(
        &self,
        buffer: &PixelBuffer,
        condition: LightingCondition,
        rng: &mut StdRng,
    ) -> LivenessResult {
        let t = &self.thresholds;

        if t.exempt_low_light && condition.is_low_light() {
            return LivenessResult {
                is_live: true,
                variation_ratio: 0.0,
                exempted: true,
            };
        }

        let (w, h) = (buffer.width(), buffer.height());
        let mut varied = 0u32;
        for _ in 0..t.sample_pairs {
            let a = buffer.luminance_at(rng.gen_range(0..w), rng.gen_range(0..h));
            let b = buffer.luminance_at(rng.gen_range(0..w), rng.gen_range(0..h));
            if (a - b).abs() > t.variation_delta {
                varied += 1;
            }
        }

        let variation_ratio = varied as f64 / t.sample_pairs as f64;
        LivenessResult {
            is_live: variation_ratio > t.min_variation_ratio,
            variation_ratio,
            exempted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn flat_frame_is_not_live() {
        let image = RgbaImage::from_pixel(100, 100, Rgba([128, 128, 128, 255]));
        let buffer = PixelBuffer::new(image).unwrap();
        let estimator = LivenessEstimator::new(LivenessThresholds::default());
        let mut rng = StdRng::seed_from_u64(42);

        let result = estimator.analyze(&buffer, LightingCondition::Normal, &mut rng);
        assert!(!result.is_live);
        assert_eq!(result.variation_ratio, 0.0);
    }

    #[test]
    fn low_light_is_exempt() {
        let image = RgbaImage::from_pixel(100, 100, Rgba([30, 30, 30, 255]));
        let buffer = PixelBuffer::new(image).unwrap();
        let estimator = LivenessEstimator::new(LivenessThresholds::default());
        let mut rng = StdRng::seed_from_u64(42);

        let result = estimator.analyze(&buffer, LightingCondition::LowLight, &mut rng);
        assert!(result.is_live);
        assert!(result.exempted);
    }
}
