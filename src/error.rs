//! Error types for reconstruction-quality operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::decode::Shape;
use crate::scan::ImagePath;

/// Result type alias for reconstruction-quality operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scanning, evaluating, or exporting.
///
/// Every variant is fatal for a batch: the dispatcher stops at the first
/// failure and no partial result is handed back.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A directory to be scanned does not exist.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The missing directory.
        path: PathBuf,
    },

    /// The scan root exists but is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// A directory could not be listed.
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// The directory that could not be read.
        path: PathBuf,
    },

    /// A discovered file has a path that is not valid UTF-8 and so cannot
    /// serve as a join key between the two trees.
    #[error("Path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// The image is missing under the source root.
    #[error("Cannot find source image {image} ({path})")]
    SourceImageMissing {
        /// Relative path of the image.
        image: ImagePath,
        /// Resolved path under the source root.
        path: PathBuf,
    },

    /// The image is missing under the target root.
    #[error("Cannot find target image {image} ({path})")]
    TargetImageMissing {
        /// Relative path of the image.
        image: ImagePath,
        /// Resolved path under the target root.
        path: PathBuf,
    },

    /// Failed to read or decode an image file.
    #[error("Image load failed: {path}: {reason}")]
    ImageLoad {
        /// Path to the image that failed to load.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Error reported by an image decoder.
    #[error("Codec error ({codec}): {message}")]
    Codec {
        /// Decoder identifier.
        codec: String,
        /// Error message from the decoder.
        message: String,
    },

    /// Unsupported image container or pixel format.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The two images of a pair decode to different shapes.
    #[error("{image}: source is {source_shape} but target is {target_shape}, images should have the same size")]
    ShapeMismatch {
        /// Relative path of the image.
        image: ImagePath,
        /// Decoded shape of the source image.
        source_shape: Shape,
        /// Decoded shape of the target image.
        target_shape: Shape,
    },

    /// Failed to calculate a quality metric.
    #[error("Metric calculation failed: {metric}: {reason}")]
    MetricCalculation {
        /// Name of the metric that failed.
        metric: String,
        /// Reason for the failure.
        reason: String,
    },

    /// Configuration rejected before any work was dispatched.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The per-batch worker pool could not be created.
    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
