use serde::{Deserialize, Serialize};

use crate::error::GateError;
use crate::loader::{ImageDecoder, PixelDecoder};
use crate::pipeline::ValidationPipeline;

pub mod analysis;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod pixels;

pub use config::GateConfig;
pub use error::Result;

/// Why a photograph was turned away. The message text is a contract with the
/// calling UI layer and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    TooDark,
    TooBright,
    ScreenshotSuspected,
    FaceNotDetected,
    FaceNotDetectedLowLight,
    ObjectDetected,
    Blurry,
    NotCentered,
    NotLive,
    PlatformUnsupported,
}

impl RejectionReason {
    pub fn message(self) -> &'static str {
        match self {
            RejectionReason::TooDark => "Photo is too dark. Please retake in better lighting.",
            RejectionReason::TooBright => {
                "Photo is overexposed. Please retake away from direct light."
            }
            RejectionReason::ScreenshotSuspected => {
                "Photo looks like a screen capture. Please use the camera directly."
            }
            RejectionReason::FaceNotDetected => "No face detected. Please face the camera.",
            RejectionReason::FaceNotDetectedLowLight => {
                "No face detected. Please move somewhere brighter and face the camera."
            }
            RejectionReason::ObjectDetected => {
                "An object was detected instead of a face. Please face the camera."
            }
            RejectionReason::Blurry => "Photo is blurry. Please hold the camera steady.",
            RejectionReason::NotCentered => {
                "Face is not centered. Please align your face with the frame."
            }
            RejectionReason::NotLive => "Photo does not appear to be a live camera capture.",
            RejectionReason::PlatformUnsupported => {
                "Photo validation is not supported on this device."
            }
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Face center and size estimate produced by the face stage and consumed by
/// the framing check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FaceCandidate {
    pub center_x: f64,
    pub center_y: f64,
    pub approximate_size: f64,
    pub confidence: f64,
}

/// The only type crossing the module boundary. A rejection is an ordinary
/// outcome carried as data; `Err` is reserved for unreadable input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub valid: bool,
    pub reason: Option<RejectionReason>,
    pub confidence: Option<f64>,
    pub is_live: Option<bool>,
}

impl ValidationVerdict {
    pub fn accepted(confidence: f64, is_live: bool) -> Self {
        Self {
            valid: true,
            reason: None,
            confidence: Some(confidence),
            is_live: Some(is_live),
        }
    }

    pub fn rejected(reason: RejectionReason) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
            confidence: None,
            is_live: None,
        }
    }

    pub fn error_reason(&self) -> Option<&'static str> {
        self.reason.map(RejectionReason::message)
    }
}

/// Entry point: decodes one captured photograph and runs the gating pipeline.
///
/// Holds no state between calls; concurrent validations are safe because each
/// call owns its own pixel buffer and PRNG.
pub struct CaptureValidator {
    config: GateConfig,
    decoder: Box<dyn PixelDecoder + Send + Sync>,
}

impl CaptureValidator {
    pub fn new() -> Self {
        Self {
            config: GateConfig::default(),
            decoder: Box::new(ImageDecoder::new()),
        }
    }

    pub fn with_config(mut self, config: GateConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_decoder(mut self, decoder: Box<dyn PixelDecoder + Send + Sync>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Validates one encoded photograph (raw bytes or base64 text).
    ///
    /// Every analysis outcome, pass or rejection, comes back as a verdict.
    /// `Err` means the input could not be read at all; callers must treat
    /// that as a rejection too (fail closed).
    pub async fn validate(&self, bytes: &[u8]) -> Result<ValidationVerdict> {
        self.validate_blocking(bytes)
    }

    /// Synchronous core of [`validate`](Self::validate). The computation is
    /// bounded by fixed sample counts, so there is nothing to await.
    pub fn validate_blocking(&self, bytes: &[u8]) -> Result<ValidationVerdict> {
        let buffer = match self.decoder.decode(bytes) {
            Ok(buffer) => buffer,
            // A platform without decode capability rejects rather than
            // silently approving the only fraud check in the flow.
            Err(GateError::UnsupportedPlatform) => {
                return Ok(ValidationVerdict::rejected(
                    RejectionReason::PlatformUnsupported,
                ));
            }
            Err(err) => return Err(err),
        };

        Ok(ValidationPipeline::new(&self.config).run(&buffer))
    }
}

impl Default for CaptureValidator {
    fn default() -> Self {
        Self::new()
    }
}
