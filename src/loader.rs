use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::debug;

use crate::error::{GateError, Result};
use crate::pixels::PixelBuffer;

/// Platform decode capability. The pipeline only ever talks to this trait, so
/// a target without image support plugs in [`UnsupportedDecoder`] and the
/// verdict fails closed instead of approving unchecked bytes.
pub trait PixelDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer>;
}

/// Default decoder backed by the `image` crate. Accepts raw encoded bytes or
/// base64 text (with or without a `data:` URL prefix).
pub struct ImageDecoder {
    min_dimension: u32,
}

impl ImageDecoder {
    pub fn new() -> Self {
        Self { min_dimension: 32 }
    }

    pub fn with_min_dimension(mut self, min: u32) -> Self {
        self.min_dimension = min;
        self
    }
}

impl PixelDecoder for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer> {
        let image = match image::load_from_memory(bytes) {
            Ok(image) => image,
            Err(err) => match base64_payload(bytes) {
                Some(raw) => image::load_from_memory(&raw)?,
                None => return Err(err.into()),
            },
        };

        let (width, height) = (image.width(), image.height());
        if width < self.min_dimension || height < self.min_dimension {
            return Err(GateError::ImageTooSmall(self.min_dimension));
        }
        debug!("decoded {}x{} frame", width, height);

        PixelBuffer::new(image.to_rgba8())
    }
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoder for targets with no image support. Always fails, never approves.
pub struct UnsupportedDecoder;

impl PixelDecoder for UnsupportedDecoder {
    fn decode(&self, _bytes: &[u8]) -> Result<PixelBuffer> {
        Err(GateError::UnsupportedPlatform)
    }
}

fn base64_payload(bytes: &[u8]) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(bytes).ok()?;
    let text = text.trim();

    // data:image/png;base64,...
    let payload = match text.split_once(',') {
        Some((head, rest)) if head.starts_with("data:") => rest,
        _ => text,
    };

    let compact = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>();
    STANDARD.decode(compact).ok()
}
