//! Evaluation of a single source/target image pair.

use std::path::PathBuf;

use crate::decode::decode_file;
use crate::error::{Error, Result};
use crate::eval::session::CompareConfig;
use crate::metrics::{MetricRecord, calculate_psnr, calculate_ssim};
use crate::scan::ImagePath;

/// Computes a [`MetricRecord`] for one relative path.
///
/// Holds only the two roots and the SSIM window, so a single evaluator can
/// be shared by every worker of a batch.
#[derive(Debug, Clone)]
pub struct PairEvaluator {
    source_root: PathBuf,
    target_root: PathBuf,
    ssim_window: usize,
}

impl PairEvaluator {
    /// Create an evaluator. `ssim_window` is assumed to be validated already.
    #[must_use]
    pub fn new(source_root: impl Into<PathBuf>, target_root: impl Into<PathBuf>, ssim_window: usize) -> Self {
        Self {
            source_root: source_root.into(),
            target_root: target_root.into(),
            ssim_window,
        }
    }

    /// Create an evaluator from a validated configuration.
    #[must_use]
    pub fn from_config(config: &CompareConfig) -> Self {
        Self::new(&config.source, &config.target, config.ssim_window)
    }

    /// Validate and measure the pair stored under `image` in both trees.
    ///
    /// # Errors
    ///
    /// - [`Error::SourceImageMissing`] / [`Error::TargetImageMissing`] if
    ///   either file does not exist
    /// - [`Error::ImageLoad`] / [`Error::UnsupportedFormat`] if decoding fails
    /// - [`Error::ShapeMismatch`] if the decoded shapes differ
    /// - [`Error::MetricCalculation`] if the SSIM window does not fit
    pub fn evaluate(&self, image: &ImagePath) -> Result<MetricRecord> {
        let source_path = image.resolve(&self.source_root);
        let target_path = image.resolve(&self.target_root);

        if !source_path.exists() {
            return Err(Error::SourceImageMissing {
                image: image.clone(),
                path: source_path,
            });
        }
        if !target_path.exists() {
            return Err(Error::TargetImageMissing {
                image: image.clone(),
                path: target_path,
            });
        }

        let source = decode_file(&source_path)?;
        let target = decode_file(&target_path)?;

        if source.shape() != target.shape() {
            return Err(Error::ShapeMismatch {
                image: image.clone(),
                source_shape: source.shape(),
                target_shape: target.shape(),
            });
        }

        let ssim = calculate_ssim(&source, &target, self.ssim_window)?;
        let psnr = calculate_psnr(&source, &target)?;
        log::debug!("{image}: ssim={ssim:.6} psnr={psnr:.4}");

        Ok(MetricRecord {
            path: image.clone(),
            ssim,
            psnr,
        })
    }
}
