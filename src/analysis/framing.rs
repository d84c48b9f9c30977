use serde::{Deserialize, Serialize};

use crate::FaceCandidate;
use crate::config::FramingThresholds;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FramingResult {
    pub passed: bool,
    /// Normalized |offset| from the image center, per axis.
    pub offset_x: f64,
    pub offset_y: f64,
}

pub struct FramingChecker {
    thresholds: FramingThresholds,
}

impl FramingChecker {
    pub fn new(thresholds: FramingThresholds) -> Self {
        Self { thresholds }
    }

    /// No candidate means the face stage produced nothing to frame, which is
    /// an automatic failure rather than a pass.
    pub fn check(&self, candidate: Option<&FaceCandidate>, width: u32, height: u32) -> FramingResult {
        let Some(candidate) = candidate else {
            return FramingResult {
                passed: false,
                offset_x: 1.0,
                offset_y: 1.0,
            };
        };

        let offset_x = (candidate.center_x - width as f64 / 2.0).abs() / width as f64;
        let offset_y = (candidate.center_y - height as f64 / 2.0).abs() / height as f64;
        let max = self.thresholds.max_offset_fraction;

        FramingResult {
            passed: offset_x < max && offset_y < max,
            offset_x,
            offset_y,
        }
    }
}
