use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::FaceCandidate;
use crate::analysis::lighting::LightingCondition;
use crate::config::{FaceLightingTable, FaceThresholds};
use crate::pixels::{PixelBuffer, grid_coord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceResult {
    pub passed: bool,
    pub confidence: f64,
    pub candidate: Option<FaceCandidate>,
    pub skin_ratio: f64,
    pub eye_ratio: f64,
    pub symmetry_score: f64,
}

/// Face presence heuristic over a centered square window. Three sub-signals
/// (skin-tone ratio, eye-region darkness, bilateral symmetry) combine into a
/// weighted confidence; the weight split and the skin envelope both dispatch
/// off the lighting condition.
pub struct FacePresenceDetector {
    thresholds: FaceThresholds,
}

struct SkinScan {
    ratio: f64,
    centroid: Option<(f64, f64)>,
    extent: f64,
}

impl FacePresenceDetector {
    pub fn new(thresholds: FaceThresholds) -> Self {
        Self { thresholds }
    }

    pub fn analyze(
        &self,
        buffer: &PixelBuffer,
        condition: LightingCondition,
        rng: &mut StdRng,
    ) -> FaceResult {
        let t = &self.thresholds;
        let table = t.table(condition);

        let min_dim = buffer.width().min(buffer.height());
        let side = ((min_dim as f64 * t.window_fraction) as u32).max(2);
        let x0 = (buffer.width() - side) / 2;
        let y0 = (buffer.height() - side) / 2;

        let skin = self.scan_skin(buffer, x0, y0, side, table);
        let eye_ratio = self.scan_eyes(buffer, x0, y0, side, table);
        let symmetry_score = self.scan_symmetry(buffer, x0, y0, side, rng);

        let skin_score = (skin.ratio / table.skin_full_ratio).min(1.0);
        let eye_score = (eye_ratio / table.eye_full_ratio).min(1.0);
        let confidence = table.skin_weight * skin_score
            + table.eye_weight * eye_score
            + table.structure_weight * symmetry_score;

        let candidate = skin.centroid.map(|(cx, cy)| FaceCandidate {
            center_x: cx,
            center_y: cy,
            approximate_size: skin.extent,
            confidence,
        });

        let eye_present = table.eye_optional || eye_ratio >= table.min_eye_ratio;
        let large_enough = skin.extent >= t.min_size_fraction * min_dim as f64;
        let passed = skin.ratio >= table.min_skin_ratio
            && eye_present
            && large_enough
            && confidence >= table.min_confidence;

        FaceResult {
            passed,
            confidence,
            candidate,
            skin_ratio: skin.ratio,
            eye_ratio,
            symmetry_score,
        }
    }

    fn scan_skin(
        &self,
        buffer: &PixelBuffer,
        x0: u32,
        y0: u32,
        side: u32,
        table: &FaceLightingTable,
    ) -> SkinScan {
        let n = self.thresholds.sample_grid;
        let mut matched = 0u32;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for gy in 0..n {
            for gx in 0..n {
                let x = x0 + grid_coord(gx, n, side);
                let y = y0 + grid_coord(gy, n, side);
                if table.skin.matches(buffer.rgba(x, y)) {
                    matched += 1;
                    let (fx, fy) = (x as f64, y as f64);
                    sum_x += fx;
                    sum_y += fy;
                    min_x = min_x.min(fx);
                    max_x = max_x.max(fx);
                    min_y = min_y.min(fy);
                    max_y = max_y.max(fy);
                }
            }
        }

        let total = (n * n) as f64;
        if matched == 0 {
            return SkinScan {
                ratio: 0.0,
                centroid: None,
                extent: 0.0,
            };
        }

        SkinScan {
            ratio: matched as f64 / total,
            centroid: Some((sum_x / matched as f64, sum_y / matched as f64)),
            extent: (max_x - min_x).max(max_y - min_y),
        }
    }

    /// Dark-pixel ratio in the upper-middle band of the window, bounded below
    /// by a noise floor so dead pixels do not count as eyes.
    fn scan_eyes(
        &self,
        buffer: &PixelBuffer,
        x0: u32,
        y0: u32,
        side: u32,
        table: &FaceLightingTable,
    ) -> f64 {
        let t = &self.thresholds;
        let band_y0 = y0 + (side as f64 * t.eye_band_top) as u32;
        let band_y1 = y0 + (side as f64 * t.eye_band_bottom) as u32;
        let band_w = (side as f64 * t.eye_band_width) as u32;
        let band_x0 = x0 + (side - band_w) / 2;

        let (cols, rows) = (30u32, 12u32);
        let mut dark = 0u32;
        let mut total = 0u32;

        for gy in 0..rows {
            for gx in 0..cols {
                let x = band_x0 + grid_coord(gx, cols, band_w.max(1));
                let y = band_y0 + grid_coord(gy, rows, (band_y1 - band_y0).max(1));
                let lum = buffer.luminance_at(x, y);
                total += 1;
                if lum < table.eye_dark_below && lum > table.eye_noise_floor {
                    dark += 1;
                }
            }
        }

        dark as f64 / total.max(1) as f64
    }

    /// Random left/right pairs mirrored about the window's vertical center
    /// line; the fraction with similar luminance is the structure score.
    fn scan_symmetry(
        &self,
        buffer: &PixelBuffer,
        x0: u32,
        y0: u32,
        side: u32,
        rng: &mut StdRng,
    ) -> f64 {
        let t = &self.thresholds;
        let cx = x0 + side / 2;
        let half = side / 2;
        if half < 2 {
            return 0.0;
        }

        let mut similar = 0u32;
        for _ in 0..t.symmetry_pairs {
            let dx = rng.gen_range(1..half);
            let y = y0 + rng.gen_range(0..side);
            let left = buffer.luminance_at(cx - dx, y);
            let right = buffer.luminance_at((cx + dx).min(buffer.width() - 1), y);
            if (left - right).abs() < t.symmetry_delta {
                similar += 1;
            }
        }

        similar as f64 / t.symmetry_pairs as f64
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use rand::SeedableRng;

    use super::*;

    fn face_frame() -> PixelBuffer {
        // Centered skin disc with two darker eye patches in the upper third
        // of the detection window.
        let image = RgbaImage::from_fn(200, 200, |x, y| {
            let dx = x as f64 - 100.0;
            let dy = y as f64 - 100.0;
            let in_disc = (dx * dx + dy * dy).sqrt() < 70.0;
            let in_eye = (80..=92).contains(&y)
                && ((70..=85).contains(&x) || (115..=130).contains(&x));
            if in_eye {
                Rgba([40, 30, 30, 255])
            } else if in_disc {
                Rgba([210, 150, 120, 255])
            } else {
                Rgba([90, 90, 90, 255])
            }
        });
        PixelBuffer::new(image).unwrap()
    }

    #[test]
    fn detects_a_centered_skin_disc() {
        let detector = FacePresenceDetector::new(FaceThresholds::default());
        let mut rng = StdRng::seed_from_u64(42);

        let result = detector.analyze(&face_frame(), LightingCondition::Normal, &mut rng);
        assert!(result.passed, "result: {result:?}");
        assert!(result.skin_ratio > 0.5);
        assert!(result.eye_ratio > 0.02);
        let candidate = result.candidate.unwrap();
        assert!((candidate.center_x - 100.0).abs() < 10.0);
        assert!((candidate.center_y - 100.0).abs() < 10.0);
    }

    #[test]
    fn rejects_a_gray_frame() {
        let detector = FacePresenceDetector::new(FaceThresholds::default());
        let mut rng = StdRng::seed_from_u64(42);
        let image = RgbaImage::from_pixel(200, 200, Rgba([120, 120, 120, 255]));
        let buffer = PixelBuffer::new(image).unwrap();

        let result = detector.analyze(&buffer, LightingCondition::Normal, &mut rng);
        assert!(!result.passed);
        assert_eq!(result.skin_ratio, 0.0);
        assert!(result.candidate.is_none());
    }
}
