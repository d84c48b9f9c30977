use serde::{Deserialize, Serialize};

use crate::analysis::lighting::LightingCondition;
use crate::config::ScreenshotThresholds;
use crate::pixels::{PixelBuffer, grid_coord, variance};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotResult {
    /// Aggregate signal score on a 0-5 scale.
    pub score: f64,
    pub confidence: f64,
    pub flagged: bool,
    pub border_uniform: bool,
    pub subpixel_ratio: f64,
    pub bright_ratio: f64,
    pub flat_ratio: f64,
    pub run_ratio: f64,
    pub sharp_ratio: f64,
}

/// Multi-signal screen-capture heuristic. Each signal adds a fixed weight
/// when its own sub-threshold is crossed; only an overwhelming combination
/// flags the frame.
pub struct ScreenshotDetector {
    thresholds: ScreenshotThresholds,
}

const ANCHOR_GRID: u32 = 40;
const BORDER_SAMPLES: u32 = 32;
const RUN_ROWS: u32 = 16;
const RUNS_PER_ROW: u32 = 16;

impl ScreenshotDetector {
    pub fn new(thresholds: ScreenshotThresholds) -> Self {
        Self { thresholds }
    }

    pub fn analyze(&self, buffer: &PixelBuffer, condition: LightingCondition) -> ScreenshotResult {
        let t = &self.thresholds;

        let border_uniform = self.borders_uniform(buffer);
        let (subpixel_ratio, bright_ratio, flat_ratio, sharp_ratio) = self.anchor_ratios(buffer);
        let run_ratio = self.flat_run_ratio(buffer);

        let mut score = 0.0;
        if border_uniform {
            score += t.border_weight;
        }
        if subpixel_ratio > t.subpixel_ratio_above {
            score += t.subpixel_weight;
        }
        if bright_ratio > t.bright_ratio_above && !condition.is_low_light() {
            score += t.bright_weight;
        }
        if flat_ratio > t.flat_ratio_above {
            score += t.flat_weight;
        }
        if run_ratio > t.run_ratio_above {
            score += t.run_weight;
        }
        if sharp_ratio > t.sharp_ratio_above {
            score += t.sharp_weight;
        }

        ScreenshotResult {
            score,
            confidence: (score / 5.0).min(1.0),
            flagged: score >= t.flag_score,
            border_uniform,
            subpixel_ratio,
            bright_ratio,
            flat_ratio,
            run_ratio,
            sharp_ratio,
        }
    }

    /// UI chrome and letterboxing leave all four borders nearly constant;
    /// a sensor capture almost never does.
    fn borders_uniform(&self, buffer: &PixelBuffer) -> bool {
        let (w, h) = (buffer.width(), buffer.height());

        let sample_row = |y: u32| -> Vec<f64> {
            (0..BORDER_SAMPLES)
                .map(|i| buffer.luminance_at(grid_coord(i, BORDER_SAMPLES, w), y))
                .collect()
        };
        let sample_col = |x: u32| -> Vec<f64> {
            (0..BORDER_SAMPLES)
                .map(|i| buffer.luminance_at(x, grid_coord(i, BORDER_SAMPLES, h)))
                .collect()
        };

        let borders = [
            sample_row(0),
            sample_row(h - 1),
            sample_col(0),
            sample_col(w - 1),
        ];

        borders
            .iter()
            .all(|b| variance(b) < self.thresholds.border_variance_below)
    }

    fn anchor_ratios(&self, buffer: &PixelBuffer) -> (f64, f64, f64, f64) {
        let t = &self.thresholds;
        let (w, h) = (buffer.width(), buffer.height());

        let mut subpixel = 0u32;
        let mut bright = 0u32;
        let mut flat = 0u32;
        let mut sharp = 0u32;
        let mut total = 0u32;
        let mut pairs = 0u32;

        for gy in 0..ANCHOR_GRID {
            for gx in 0..ANCHOR_GRID {
                let x = grid_coord(gx, ANCHOR_GRID, w);
                let y = grid_coord(gy, ANCHOR_GRID, h);
                let [r, g, b, _] = buffer.rgba(x, y);
                let lum = crate::pixels::luminance(r, g, b);
                total += 1;

                let spread = r.max(g).max(b) - r.min(g).min(b);
                if spread <= t.subpixel_channel_spread && lum > t.subpixel_min_luminance {
                    subpixel += 1;
                }
                if lum > t.bright_luminance_above {
                    bright += 1;
                }

                if x + 1 < w {
                    let delta = (buffer.luminance_at(x + 1, y) - lum).abs();
                    pairs += 1;
                    if delta < t.flat_delta_below {
                        flat += 1;
                    }
                    if delta > t.sharp_delta_above {
                        sharp += 1;
                    }
                }
            }
        }

        (
            subpixel as f64 / total as f64,
            bright as f64 / total as f64,
            flat as f64 / pairs.max(1) as f64,
            sharp as f64 / pairs.max(1) as f64,
        )
    }

    /// Fraction of short horizontal runs with no luminance change at all.
    fn flat_run_ratio(&self, buffer: &PixelBuffer) -> f64 {
        let (w, h) = (buffer.width(), buffer.height());
        let run_len = self.thresholds.run_length;
        if w <= run_len {
            return 0.0;
        }

        let mut flat_runs = 0u32;
        let mut total_runs = 0u32;

        for ry in 0..RUN_ROWS {
            let y = grid_coord(ry, RUN_ROWS, h);
            for rx in 0..RUNS_PER_ROW {
                let start = grid_coord(rx, RUNS_PER_ROW, w - run_len);
                total_runs += 1;

                let mut is_flat = true;
                let mut prev = buffer.luminance_at(start, y);
                for dx in 1..run_len {
                    let lum = buffer.luminance_at(start + dx, y);
                    if (lum - prev).abs() >= 0.5 {
                        is_flat = false;
                        break;
                    }
                    prev = lum;
                }
                if is_flat {
                    flat_runs += 1;
                }
            }
        }

        flat_runs as f64 / total_runs.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;
    use crate::pixels::PixelBuffer;

    #[test]
    fn uniform_frame_scores_as_screenshot() {
        let image = RgbaImage::from_pixel(120, 120, Rgba([200, 200, 200, 255]));
        let buffer = PixelBuffer::new(image).unwrap();
        let detector = ScreenshotDetector::new(ScreenshotThresholds::default());

        let result = detector.analyze(&buffer, LightingCondition::Normal);
        assert!(result.flagged, "score was {}", result.score);
        assert!(result.confidence > 0.85);
        assert!(result.border_uniform);
    }

    #[test]
    fn noisy_frame_stays_below_the_flag_score() {
        let mut rng = StdRng::seed_from_u64(7);
        let image = RgbaImage::from_fn(120, 120, |_, _| {
            Rgba([
                rng.gen_range(60..180),
                rng.gen_range(60..180),
                rng.gen_range(60..180),
                255,
            ])
        });
        let buffer = PixelBuffer::new(image).unwrap();
        let detector = ScreenshotDetector::new(ScreenshotThresholds::default());

        let result = detector.analyze(&buffer, LightingCondition::Normal);
        assert!(!result.flagged, "score was {}", result.score);
    }
}
