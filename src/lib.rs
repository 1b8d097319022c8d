//! # reconstruct-quality
//!
//! Reconstruction quality between two mirrored image trees.
//!
//! A *source* tree is scanned for images; each image is expected under the
//! same relative path in a *target* tree holding its reconstruction. Every
//! pair is measured with SSIM and PSNR on a bounded worker pool, and the
//! records are summarized per directory and overall.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reconstruct_quality::{CompareConfig, compare};
//!
//! let config = CompareConfig::builder()
//!     .source("renders/ground_truth")
//!     .target("renders/reconstruction")
//!     .workers(8)
//!     .ssim_window(11)
//!     .build()?;
//!
//! let comparison = compare(&config)?;
//! for record in &comparison.records {
//!     println!("{}: ssim={:.4} psnr={:.2}", record.path, record.ssim, record.psnr);
//! }
//! if let Some(overall) = comparison.summary.overall() {
//!     println!("mean ssim {:.4} over {} images", overall.mean_ssim, overall.count);
//! }
//! # Ok::<(), reconstruct_quality::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`scan`]: Image discovery and relative image paths
//! - [`decode`]: PNG / JPEG decoding into 8-bit planes
//! - [`metrics`]: SSIM and PSNR
//! - [`eval`]: Pair evaluation, parallel dispatch, end-to-end session
//! - [`report`]: Per-directory and overall summaries
//! - [`export`]: CSV export

pub mod decode;
pub mod error;
pub mod eval;
pub mod export;
pub mod metrics;
pub mod report;
pub mod scan;

// Re-export commonly used types
pub use decode::{DecodedImage, Shape};
pub use error::{Error, Result};
pub use eval::{CompareConfig, CompareConfigBuilder, Comparison, PairEvaluator, compare};
pub use metrics::{MetricRecord, calculate_psnr, calculate_ssim};
pub use report::{GroupSummary, SummaryTable, summarize};
pub use scan::{ImagePath, scan};
