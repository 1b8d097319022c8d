//! Comparison configuration and the end-to-end pipeline.
//!
//! [`compare`] scans the source tree, evaluates every pair on a worker pool
//! and summarizes the records. Callers that need only part of the pipeline
//! can use [`crate::scan::scan`], [`crate::eval::dispatch::run`] and
//! [`crate::report::summarize`] directly.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::eval::dispatch;
use crate::eval::pair::PairEvaluator;
use crate::metrics::MetricRecord;
use crate::report::{SummaryTable, summarize};
use crate::scan::scan;

/// Default number of parallel workers.
pub const DEFAULT_WORKERS: usize = 8;

/// Default SSIM window size.
pub const DEFAULT_SSIM_WINDOW: usize = 11;

/// Configuration for a comparison run.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// Root of the tree that is scanned for images.
    pub source: PathBuf,

    /// Root of the tree holding the reconstructions.
    pub target: PathBuf,

    /// Number of parallel workers.
    pub workers: usize,

    /// SSIM window size (positive, odd).
    pub ssim_window: usize,
}

impl CompareConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> CompareConfigBuilder {
        CompareConfigBuilder::default()
    }
}

/// Builder for [`CompareConfig`].
#[derive(Debug, Default)]
pub struct CompareConfigBuilder {
    source: Option<PathBuf>,
    target: Option<PathBuf>,
    workers: Option<usize>,
    ssim_window: Option<usize>,
}

impl CompareConfigBuilder {
    /// Set the source tree root.
    #[must_use]
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Set the target tree root.
    #[must_use]
    pub fn target(mut self, path: impl Into<PathBuf>) -> Self {
        self.target = Some(path.into());
        self
    }

    /// Set the number of parallel workers.
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Set the SSIM window size.
    #[must_use]
    pub fn ssim_window(mut self, window: usize) -> Self {
        self.ssim_window = Some(window);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if a root is missing, the
    /// worker count is zero, or the window is zero or even.
    pub fn build(self) -> Result<CompareConfig> {
        let source = self
            .source
            .ok_or_else(|| Error::InvalidConfiguration("source root is required".to_string()))?;
        let target = self
            .target
            .ok_or_else(|| Error::InvalidConfiguration("target root is required".to_string()))?;

        let workers = self.workers.unwrap_or(DEFAULT_WORKERS);
        if workers == 0 {
            return Err(Error::InvalidConfiguration(
                "worker count must be at least 1".to_string(),
            ));
        }

        let ssim_window = self.ssim_window.unwrap_or(DEFAULT_SSIM_WINDOW);
        if ssim_window == 0 || ssim_window % 2 == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "ssim window must be a positive odd integer, got {ssim_window}"
            )));
        }

        Ok(CompareConfig {
            source,
            target,
            workers,
            ssim_window,
        })
    }
}

/// Output of a comparison run.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    /// One record per discovered image, in discovery order.
    pub records: Vec<MetricRecord>,

    /// Per-directory and overall means.
    pub summary: SummaryTable,
}

/// Scan, evaluate and summarize the two trees described by `config`.
pub fn compare(config: &CompareConfig) -> Result<Comparison> {
    let paths = scan(&config.source)?;
    log::info!(
        "Found {} images under {}",
        paths.len(),
        config.source.display()
    );

    let evaluator = PairEvaluator::from_config(config);
    let records = dispatch::run(&paths, config.workers, &evaluator)?;
    log::info!(
        "{} of {} pairs are pixel-identical",
        records.iter().filter(|r| r.is_lossless()).count(),
        records.len()
    );
    let summary = summarize(&records);

    Ok(Comparison { records, summary })
}
