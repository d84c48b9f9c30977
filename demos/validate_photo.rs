//! Validate a captured photo from disk.
//!
//! Run with: cargo run --example validate_photo -- <image_path>

use std::env;
use std::fs;

use capture_gate::{CaptureValidator, error::Result};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Capture Gate - Photo Validation");
        println!("================================");
        println!();
        println!("Usage: {} <image_path>", args[0]);
        println!();
        println!("The image may be any format the `image` crate decodes, or a");
        println!("base64-encoded payload (with or without a data: URL prefix).");
        return Ok(());
    }

    let bytes = fs::read(&args[1])?;
    let verdict = CaptureValidator::new().validate_blocking(&bytes)?;

    println!("valid:      {}", verdict.valid);
    if let Some(reason) = verdict.error_reason() {
        println!("reason:     {reason}");
    }
    if let Some(confidence) = verdict.confidence {
        println!("confidence: {confidence:.2}");
    }
    if let Some(is_live) = verdict.is_live {
        println!("live:       {is_live}");
    }

    Ok(())
}
