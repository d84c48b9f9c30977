use log::{debug, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::analysis::blur::BlurDetector;
use crate::analysis::face::FacePresenceDetector;
use crate::analysis::framing::FramingChecker;
use crate::analysis::lighting::{BrightnessAnalyzer, LightingCondition};
use crate::analysis::liveness::LivenessEstimator;
use crate::analysis::object::ObjectEdgeDetector;
use crate::analysis::screenshot::ScreenshotDetector;
use crate::config::GateConfig;
use crate::pixels::PixelBuffer;
use crate::{RejectionReason, ValidationVerdict};

/// Gating stages in execution order. The order is part of the contract:
/// rejection reasons must be deterministic, so the first failing stage wins
/// and nothing after it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateStage {
    Brightness,
    Screenshot,
    Face,
    Object,
    Blur,
    Framing,
    Liveness,
}

pub struct ValidationPipeline<'a> {
    config: &'a GateConfig,
}

impl<'a> ValidationPipeline<'a> {
    pub fn new(config: &'a GateConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, buffer: &PixelBuffer) -> ValidationVerdict {
        let config = self.config;
        // Fresh PRNG per call: byte-identical input gives identical verdicts.
        let mut rng = StdRng::seed_from_u64(config.sample_seed);

        let profile = BrightnessAnalyzer::new(config.brightness.clone()).analyze(buffer);
        debug!(
            "{:?}: avg={:.1} min={:.1} max={:.1} -> {:?}",
            GateStage::Brightness,
            profile.avg_brightness,
            profile.min_brightness,
            profile.max_brightness,
            profile.condition
        );
        match profile.condition {
            LightingCondition::VeryDark => return self.reject(RejectionReason::TooDark),
            LightingCondition::OverExposed => return self.reject(RejectionReason::TooBright),
            _ => {}
        }
        let condition = profile.condition;

        let shot =
            ScreenshotDetector::new(config.screenshot.clone()).analyze(buffer, condition);
        debug!(
            "{:?}: score={:.2} confidence={:.2} flagged={}",
            GateStage::Screenshot,
            shot.score,
            shot.confidence,
            shot.flagged
        );
        if shot.flagged && shot.confidence > config.screenshot.reject_confidence {
            return self.reject(RejectionReason::ScreenshotSuspected);
        }

        let face =
            FacePresenceDetector::new(config.face.clone()).analyze(buffer, condition, &mut rng);
        debug!(
            "{:?}: skin={:.2} eyes={:.2} symmetry={:.2} confidence={:.2} passed={}",
            GateStage::Face,
            face.skin_ratio,
            face.eye_ratio,
            face.symmetry_score,
            face.confidence,
            face.passed
        );
        if !face.passed {
            let reason = if condition.is_low_light() {
                RejectionReason::FaceNotDetectedLowLight
            } else {
                RejectionReason::FaceNotDetected
            };
            return self.reject(reason);
        }

        let object =
            ObjectEdgeDetector::new(config.object.clone()).analyze(buffer, condition, &mut rng);
        debug!(
            "{:?}: sharp_ratio={:.2} skipped={}",
            GateStage::Object,
            object.sharp_ratio,
            object.skipped
        );
        if !object.passed {
            return self.reject(RejectionReason::ObjectDetected);
        }

        let blur = BlurDetector::new(config.blur.clone()).analyze(buffer, condition, &mut rng);
        debug!(
            "{:?}: mean_delta={:.2} skipped={}",
            GateStage::Blur,
            blur.mean_delta,
            blur.skipped
        );
        if !blur.passed {
            return self.reject(RejectionReason::Blurry);
        }

        let framing = FramingChecker::new(config.framing.clone()).check(
            face.candidate.as_ref(),
            buffer.width(),
            buffer.height(),
        );
        debug!(
            "{:?}: offset=({:.2}, {:.2}) passed={}",
            GateStage::Framing,
            framing.offset_x,
            framing.offset_y,
            framing.passed
        );
        if !framing.passed {
            return self.reject(RejectionReason::NotCentered);
        }

        let liveness =
            LivenessEstimator::new(config.liveness.clone()).analyze(buffer, condition, &mut rng);
        debug!(
            "{:?}: variation={:.2} exempted={} live={}",
            GateStage::Liveness,
            liveness.variation_ratio,
            liveness.exempted,
            liveness.is_live
        );
        if !liveness.is_live {
            return self.reject(RejectionReason::NotLive);
        }

        ValidationVerdict::accepted(face.confidence, liveness.is_live)
    }

    fn reject(&self, reason: RejectionReason) -> ValidationVerdict {
        warn!("rejected: {}", reason.message());
        ValidationVerdict::rejected(reason)
    }
}
