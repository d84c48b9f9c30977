use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::analysis::lighting::LightingCondition;
use crate::config::ObjectThresholds;
use crate::pixels::PixelBuffer;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObjectResult {
    pub passed: bool,
    pub sharp_ratio: f64,
    pub skipped: bool,
}

/// Geometric objects produce a much higher density of hard luminance edges
/// than organic facial gradients. Never triggers in low light, where sensor
/// noise makes genuine captures look spuriously sharp.
pub struct ObjectEdgeDetector {
    thresholds: ObjectThresholds,
}

impl ObjectEdgeDetector {
    pub fn new(thresholds: ObjectThresholds) -> Self {
        Self { thresholds }
    }

    pub fn analyze(
        &self,
        buffer: &PixelBuffer,
        condition: LightingCondition,
        rng: &mut StdRng,
    ) -> ObjectResult {
        let t = &self.thresholds;

        if t.skip_low_light && condition.is_low_light() {
            return ObjectResult {
                passed: true,
                sharp_ratio: 0.0,
                skipped: true,
            };
        }

        let (w, h) = (buffer.width(), buffer.height());
        let mut sharp = 0u32;
        for _ in 0..t.sample_pairs {
            let x = rng.gen_range(0..w - 1);
            let y = rng.gen_range(0..h);
            let delta = (buffer.luminance_at(x + 1, y) - buffer.luminance_at(x, y)).abs();
            if delta > t.sharp_delta {
                sharp += 1;
            }
        }

        let sharp_ratio = sharp as f64 / t.sample_pairs as f64;
        ObjectResult {
            passed: sharp_ratio <= t.max_sharp_ratio,
            sharp_ratio,
            skipped: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use rand::SeedableRng;

    use super::*;

    fn stripes() -> PixelBuffer {
        // One-pixel black/white stripes: every adjacent pair is a hard edge.
        let image = RgbaImage::from_fn(100, 100, |x, _| {
            if x % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        PixelBuffer::new(image).unwrap()
    }

    #[test]
    fn hard_edged_pattern_fails() {
        let detector = ObjectEdgeDetector::new(ObjectThresholds::default());
        let mut rng = StdRng::seed_from_u64(42);
        let result = detector.analyze(&stripes(), LightingCondition::Normal, &mut rng);
        assert!(!result.passed);
        assert!(result.sharp_ratio > 0.9);
    }

    #[test]
    fn low_light_skips_the_stage() {
        let detector = ObjectEdgeDetector::new(ObjectThresholds::default());
        let mut rng = StdRng::seed_from_u64(42);
        let result = detector.analyze(&stripes(), LightingCondition::LowLight, &mut rng);
        assert!(result.passed);
        assert!(result.skipped);
    }
}
