use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("Image decoding error: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Base64 decoding error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Decoded buffer is inconsistent: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Image too small for analysis (minimum: {0}x{0})")]
    ImageTooSmall(u32),

    #[error("No pixel decoding capability on this platform")]
    UnsupportedPlatform,
}

pub type Result<T> = std::result::Result<T, GateError>;
