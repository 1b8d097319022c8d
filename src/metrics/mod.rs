//! Reconstruction quality metrics.
//!
//! Both metrics compare a decoded source image against a decoded target
//! image of identical shape:
//!
//! - **SSIM**: windowed structural similarity, averaged over channels
//!   (higher is better, 1.0 = identical)
//! - **PSNR**: peak signal-to-noise ratio over all samples with a fixed
//!   data range of 255 (higher is better)
//!
//! ## Identical images
//!
//! | Metric | Value |
//! |--------|-------|
//! | SSIM | 1.0 |
//! | PSNR | `f64::INFINITY` |
//!
//! PSNR is undefined when the mean squared error is zero. This crate
//! reports `f64::INFINITY` for that case rather than an error, so identical
//! pairs stay part of the results and group means.

pub mod ssim;

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;
use crate::error::{Error, Result};
use crate::scan::ImagePath;

pub use ssim::calculate_ssim;

/// Peak value of an 8-bit sample.
pub const DATA_RANGE: f64 = 255.0;

/// Quality of one reconstructed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Relative path of the image in both trees.
    pub path: ImagePath,
    /// Mean structural similarity across channels.
    pub ssim: f64,
    /// PSNR in decibels, `f64::INFINITY` for pixel-identical images.
    pub psnr: f64,
}

impl MetricRecord {
    /// Whether the pair was pixel-identical.
    #[must_use]
    pub fn is_lossless(&self) -> bool {
        self.psnr.is_infinite()
    }
}

/// Calculate PSNR between two images.
///
/// # Returns
///
/// PSNR value in decibels. Returns `f64::INFINITY` if the images are
/// identical.
pub fn calculate_psnr(reference: &DecodedImage, test: &DecodedImage) -> Result<f64> {
    ensure_same_shape("PSNR", reference, test)?;

    let sample_count = reference.shape().sample_count();
    if sample_count == 0 {
        return Err(Error::MetricCalculation {
            metric: "PSNR".to_string(),
            reason: "image has no samples".to_string(),
        });
    }

    let mut squared_error: u64 = 0;
    for (r, t) in reference.planes().zip(test.planes()) {
        for (a, b) in r.pixels().zip(t.pixels()) {
            let diff = u64::from(a.abs_diff(b));
            squared_error += diff * diff;
        }
    }

    Ok(psnr_from_mse(squared_error as f64 / sample_count as f64))
}

/// Convert a mean squared error into PSNR.
#[must_use]
pub fn psnr_from_mse(mse: f64) -> f64 {
    if mse == 0.0 {
        f64::INFINITY
    } else {
        10.0 * (DATA_RANGE * DATA_RANGE / mse).log10()
    }
}

fn ensure_same_shape(metric: &str, reference: &DecodedImage, test: &DecodedImage) -> Result<()> {
    if reference.shape() != test.shape() {
        return Err(Error::MetricCalculation {
            metric: metric.to_string(),
            reason: format!(
                "shape mismatch: {} vs {}",
                reference.shape(),
                test.shape()
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: u8, width: usize, height: usize, channels: usize) -> DecodedImage {
        DecodedImage::from_interleaved(&vec![value; width * height * channels], width, height, channels)
            .unwrap()
    }

    #[test]
    fn test_psnr_identical() {
        let img = constant(128, 100, 100, 3);
        let psnr = calculate_psnr(&img, &img).unwrap();
        assert!(psnr.is_infinite() && psnr > 0.0);
    }

    #[test]
    fn test_psnr_different() {
        let reference = constant(100, 100, 100, 3);
        let test = constant(110, 100, 100, 3);
        let psnr = calculate_psnr(&reference, &test).unwrap();
        // 10 * log10(255^2 / 100) ≈ 28.13
        assert!((psnr - 28.130_803_608_679_1).abs() < 1e-9);
    }

    #[test]
    fn test_psnr_reference_pattern() {
        let (reference, test) = ssim::tests::pattern_pair();
        let psnr = calculate_psnr(&reference, &test).unwrap();
        assert!((psnr - 11.935_398_417_871_34).abs() < 1e-9);
    }

    #[test]
    fn test_psnr_shape_mismatch() {
        let result = calculate_psnr(&constant(0, 4, 4, 3), &constant(0, 4, 4, 1));
        assert!(matches!(result, Err(Error::MetricCalculation { .. })));
    }

    #[test]
    fn test_psnr_from_mse() {
        assert!(psnr_from_mse(0.0).is_infinite());
        assert!((psnr_from_mse(DATA_RANGE * DATA_RANGE) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_record_lossless() {
        let record = MetricRecord {
            path: ImagePath::from("a.png"),
            ssim: 1.0,
            psnr: f64::INFINITY,
        };
        assert!(record.is_lossless());
    }
}
