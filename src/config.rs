use serde::{Deserialize, Serialize};

use crate::analysis::lighting::LightingCondition;

/// Every tunable threshold in the pipeline, grouped per stage. Constructed
/// once and handed to [`crate::CaptureValidator`]; nothing in the analysis
/// code carries its own literals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Seed for all random pixel sampling. A fresh PRNG is created from this
    /// seed on every call, so identical input bytes give identical verdicts.
    pub sample_seed: u64,
    pub brightness: BrightnessThresholds,
    pub screenshot: ScreenshotThresholds,
    pub face: FaceThresholds,
    pub object: ObjectThresholds,
    pub blur: BlurThresholds,
    pub framing: FramingThresholds,
    pub liveness: LivenessThresholds,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            sample_seed: 42,
            brightness: BrightnessThresholds::default(),
            screenshot: ScreenshotThresholds::default(),
            face: FaceThresholds::default(),
            object: ObjectThresholds::default(),
            blur: BlurThresholds::default(),
            framing: FramingThresholds::default(),
            liveness: LivenessThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrightnessThresholds {
    pub grid_cols: u32,
    pub grid_rows: u32,
    pub very_dark_below: f64,
    pub low_light_below: f64,
    pub over_exposed_above: f64,
}

impl Default for BrightnessThresholds {
    fn default() -> Self {
        Self {
            grid_cols: 20,
            grid_rows: 20,
            very_dark_below: 15.0,
            low_light_below: 50.0,
            over_exposed_above: 240.0,
        }
    }
}

/// Six weighted signals on a 0-5 scale. `flag_score` is deliberately strict:
/// a false positive here blocks a legitimate photo, so only an overwhelming
/// signal combination trips the stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotThresholds {
    pub border_variance_below: f64,
    pub border_weight: f64,
    pub subpixel_channel_spread: u8,
    pub subpixel_min_luminance: f64,
    pub subpixel_ratio_above: f64,
    pub subpixel_weight: f64,
    pub bright_luminance_above: f64,
    pub bright_ratio_above: f64,
    pub bright_weight: f64,
    pub flat_delta_below: f64,
    pub flat_ratio_above: f64,
    pub flat_weight: f64,
    pub run_length: u32,
    pub run_ratio_above: f64,
    pub run_weight: f64,
    pub sharp_delta_above: f64,
    pub sharp_ratio_above: f64,
    pub sharp_weight: f64,
    pub flag_score: f64,
    pub reject_confidence: f64,
}

impl Default for ScreenshotThresholds {
    fn default() -> Self {
        Self {
            border_variance_below: 60.0,
            border_weight: 2.0,
            subpixel_channel_spread: 8,
            subpixel_min_luminance: 100.0,
            subpixel_ratio_above: 0.4,
            subpixel_weight: 1.5,
            bright_luminance_above: 200.0,
            bright_ratio_above: 0.5,
            bright_weight: 1.0,
            flat_delta_below: 2.0,
            flat_ratio_above: 0.6,
            flat_weight: 0.5,
            run_length: 8,
            run_ratio_above: 0.3,
            run_weight: 1.0,
            sharp_delta_above: 100.0,
            sharp_ratio_above: 0.25,
            sharp_weight: 0.5,
            flag_score: 4.0,
            reject_confidence: 0.85,
        }
    }
}

/// RGB envelope a sampled pixel must sit in to count as skin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinEnvelope {
    pub min_r: u8,
    pub min_g: u8,
    pub min_b: u8,
    pub min_red_green_gap: i16,
    pub min_channel_spread: i16,
    pub min_luminance: f64,
}

impl SkinEnvelope {
    pub fn matches(&self, rgba: [u8; 4]) -> bool {
        let [r, g, b, _] = rgba;
        let max = r.max(g).max(b) as i16;
        let min = r.min(g).min(b) as i16;

        r >= self.min_r
            && g >= self.min_g
            && b >= self.min_b
            && r > g
            && r >= b
            && (r as i16 - g as i16) >= self.min_red_green_gap
            && (max - min) >= self.min_channel_spread
            && crate::pixels::luminance(r, g, b) >= self.min_luminance
    }
}

/// Lighting-dependent half of the face thresholds. Skin desaturates under
/// weak illumination, so the low-light table widens the envelope and shifts
/// the score weights toward skin dominance while the eye signal degrades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceLightingTable {
    pub skin: SkinEnvelope,
    pub eye_dark_below: f64,
    pub eye_noise_floor: f64,
    pub min_eye_ratio: f64,
    /// When set, a missing eye signal does not fail the stage.
    pub eye_optional: bool,
    pub skin_weight: f64,
    pub eye_weight: f64,
    pub structure_weight: f64,
    pub min_skin_ratio: f64,
    pub min_confidence: f64,
    /// Skin ratio at which the skin sub-score saturates to 1.0.
    pub skin_full_ratio: f64,
    pub eye_full_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceThresholds {
    /// Side of the centered detection window as a fraction of min(w, h).
    pub window_fraction: f64,
    /// Samples per axis inside the window.
    pub sample_grid: u32,
    pub symmetry_pairs: u32,
    pub symmetry_delta: f64,
    /// Candidate must span at least this fraction of the shorter dimension.
    pub min_size_fraction: f64,
    /// Eye band inside the window: rows [top, bottom) as window fractions,
    /// centered horizontally over `eye_band_width` of the window.
    pub eye_band_top: f64,
    pub eye_band_bottom: f64,
    pub eye_band_width: f64,
    pub normal: FaceLightingTable,
    pub low_light: FaceLightingTable,
}

impl FaceThresholds {
    pub fn table(&self, condition: LightingCondition) -> &FaceLightingTable {
        match condition {
            LightingCondition::LowLight => &self.low_light,
            _ => &self.normal,
        }
    }
}

impl Default for FaceThresholds {
    fn default() -> Self {
        Self {
            window_fraction: 0.5,
            sample_grid: 40,
            symmetry_pairs: 60,
            symmetry_delta: 30.0,
            min_size_fraction: 0.2,
            eye_band_top: 0.25,
            eye_band_bottom: 0.45,
            eye_band_width: 0.6,
            normal: FaceLightingTable {
                skin: SkinEnvelope {
                    min_r: 95,
                    min_g: 40,
                    min_b: 20,
                    min_red_green_gap: 15,
                    min_channel_spread: 15,
                    min_luminance: 80.0,
                },
                eye_dark_below: 80.0,
                eye_noise_floor: 10.0,
                min_eye_ratio: 0.02,
                eye_optional: false,
                skin_weight: 0.5,
                eye_weight: 0.3,
                structure_weight: 0.2,
                min_skin_ratio: 0.15,
                min_confidence: 0.35,
                skin_full_ratio: 0.4,
                eye_full_ratio: 0.2,
            },
            low_light: FaceLightingTable {
                skin: SkinEnvelope {
                    min_r: 40,
                    min_g: 15,
                    min_b: 10,
                    min_red_green_gap: 5,
                    min_channel_spread: 8,
                    min_luminance: 20.0,
                },
                eye_dark_below: 25.0,
                eye_noise_floor: 3.0,
                min_eye_ratio: 0.0,
                eye_optional: true,
                skin_weight: 0.8,
                eye_weight: 0.05,
                structure_weight: 0.15,
                min_skin_ratio: 0.08,
                min_confidence: 0.25,
                skin_full_ratio: 0.4,
                eye_full_ratio: 0.2,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectThresholds {
    pub sample_pairs: u32,
    pub sharp_delta: f64,
    pub max_sharp_ratio: f64,
    /// Underexposed organic captures show noise-driven sharp transitions, so
    /// the stage never triggers in low light.
    pub skip_low_light: bool,
}

impl Default for ObjectThresholds {
    fn default() -> Self {
        Self {
            sample_pairs: 200,
            sharp_delta: 80.0,
            max_sharp_ratio: 0.6,
            skip_low_light: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlurThresholds {
    pub sample_pairs: u32,
    pub min_mean_delta: f64,
    pub skip_low_light: bool,
}

impl Default for BlurThresholds {
    fn default() -> Self {
        Self {
            sample_pairs: 150,
            min_mean_delta: 10.0,
            skip_low_light: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramingThresholds {
    /// Maximum |center offset| on each axis, as a fraction of that dimension.
    pub max_offset_fraction: f64,
}

impl Default for FramingThresholds {
    fn default() -> Self {
        Self {
            max_offset_fraction: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessThresholds {
    pub sample_pairs: u32,
    pub variation_delta: f64,
    pub min_variation_ratio: f64,
    pub exempt_low_light: bool,
}

impl Default for LivenessThresholds {
    fn default() -> Self {
        Self {
            sample_pairs: 50,
            variation_delta: 20.0,
            min_variation_ratio: 0.3,
            exempt_low_light: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_envelope_accepts_typical_skin() {
        let table = FaceThresholds::default().normal;
        assert!(table.skin.matches([210, 150, 120, 255]));
        assert!(!table.skin.matches([90, 90, 90, 255]));
    }

    #[test]
    fn low_light_envelope_accepts_darkened_skin() {
        let face = FaceThresholds::default();
        let darkened = [52, 37, 30, 255];
        assert!(!face.normal.skin.matches(darkened));
        assert!(face.low_light.skin.matches(darkened));
    }
}
