//! Render a synthetic face frame, run it through the pipeline, and print the
//! per-stage numbers. Useful when retuning thresholds.
//!
//! Run with: cargo run --example synthetic_face

use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng, rngs::StdRng};

use capture_gate::analysis::face::FacePresenceDetector;
use capture_gate::analysis::lighting::BrightnessAnalyzer;
use capture_gate::analysis::screenshot::ScreenshotDetector;
use capture_gate::config::GateConfig;
use capture_gate::pixels::PixelBuffer;
use capture_gate::{CaptureValidator, error::Result};

fn draw_face(factor: f64) -> RgbaImage {
    let mut rng = StdRng::seed_from_u64(9);
    RgbaImage::from_fn(200, 200, |x, y| {
        let dx = x as f64 - 100.0;
        let dy = y as f64 - 100.0;
        let in_disc = (dx * dx + dy * dy).sqrt() < 70.0;
        let in_eye =
            (80..=92).contains(&y) && ((70..=85).contains(&x) || (115..=130).contains(&x));

        let base: [i32; 3] = if in_eye {
            [40, 30, 30]
        } else if in_disc {
            [210, 150, 120]
        } else {
            [90, 90, 90]
        };

        let mut px = [0u8; 4];
        px[3] = 255;
        for c in 0..3 {
            let n: i32 = rng.gen_range(-25..=25);
            px[c] = (((base[c] + n) as f64 * factor).round()).clamp(0.0, 255.0) as u8;
        }
        Rgba(px)
    })
}

fn main() -> Result<()> {
    let config = GateConfig::default();

    for (label, factor) in [("normal light", 1.0), ("low light", 0.25)] {
        let image = draw_face(factor);
        let buffer = PixelBuffer::new(image.clone())?;

        let profile = BrightnessAnalyzer::new(config.brightness.clone()).analyze(&buffer);
        println!("--- {label} ---");
        println!(
            "lighting:   avg={:.1} -> {:?}",
            profile.avg_brightness, profile.condition
        );

        let shot =
            ScreenshotDetector::new(config.screenshot.clone()).analyze(&buffer, profile.condition);
        println!("screenshot: score={:.2} flagged={}", shot.score, shot.flagged);

        let mut rng = StdRng::seed_from_u64(config.sample_seed);
        let face = FacePresenceDetector::new(config.face.clone()).analyze(
            &buffer,
            profile.condition,
            &mut rng,
        );
        println!(
            "face:       skin={:.2} eyes={:.2} symmetry={:.2} confidence={:.2}",
            face.skin_ratio, face.eye_ratio, face.symmetry_score, face.confidence
        );

        let mut bytes = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, image::ImageFormat::Png)
            .map_err(capture_gate::error::GateError::from)?;
        let verdict = CaptureValidator::new().validate_blocking(&bytes.into_inner())?;
        println!("verdict:    {verdict:?}");
        println!();
    }

    Ok(())
}
