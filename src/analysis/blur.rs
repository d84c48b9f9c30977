use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::analysis::lighting::LightingCondition;
use crate::config::BlurThresholds;
use crate::pixels::PixelBuffer;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlurResult {
    pub passed: bool,
    pub mean_delta: f64,
    pub skipped: bool,
}

/// Sharpness estimate from sampled adjacent-pixel channel deltas. Skipped in
/// low light, where noise suppression legitimately flattens fine detail.
pub struct BlurDetector {
    thresholds: BlurThresholds,
}

impl BlurDetector {
    pub fn new(thresholds: BlurThresholds) -> Self {
        Self { thresholds }
    }

    pub fn analyze(
        &self,
        buffer: &PixelBuffer,
        condition: LightingCondition,
        rng: &mut StdRng,
    ) -> BlurResult {
        let t = &self.thresholds;

        if t.skip_low_light && condition.is_low_light() {
            return BlurResult {
                passed: true,
                mean_delta: 0.0,
                skipped: true,
            };
        }

        let (w, h) = (buffer.width(), buffer.height());
        let mut sum = 0.0;
        for _ in 0..t.sample_pairs {
            let x = rng.gen_range(0..w - 1);
            let y = rng.gen_range(0..h);
            let [r0, g0, b0, _] = buffer.rgba(x, y);
            let [r1, g1, b1, _] = buffer.rgba(x + 1, y);
            let delta = (r0 as f64 - r1 as f64).abs()
                + (g0 as f64 - g1 as f64).abs()
                + (b0 as f64 - b1 as f64).abs();
            sum += delta / 3.0;
        }

        let mean_delta = sum / t.sample_pairs as f64;
        BlurResult {
            passed: mean_delta >= t.min_mean_delta,
            mean_delta,
            skipped: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn flat_frame_is_blurry() {
        let image = RgbaImage::from_pixel(100, 100, Rgba([128, 128, 128, 255]));
        let buffer = PixelBuffer::new(image).unwrap();
        let detector = BlurDetector::new(BlurThresholds::default());
        let mut rng = StdRng::seed_from_u64(42);

        let result = detector.analyze(&buffer, LightingCondition::Normal, &mut rng);
        assert!(!result.passed);
        assert_eq!(result.mean_delta, 0.0);
    }

    #[test]
    fn noisy_frame_is_sharp() {
        let mut noise = StdRng::seed_from_u64(3);
        let image = RgbaImage::from_fn(100, 100, |_, _| {
            use rand::Rng as _;
            Rgba([
                noise.gen_range(0..=255),
                noise.gen_range(0..=255),
                noise.gen_range(0..=255),
                255,
            ])
        });
        let buffer = PixelBuffer::new(image).unwrap();
        let detector = BlurDetector::new(BlurThresholds::default());
        let mut rng = StdRng::seed_from_u64(42);

        let result = detector.analyze(&buffer, LightingCondition::Normal, &mut rng);
        assert!(result.passed, "mean delta {}", result.mean_delta);
    }
}
