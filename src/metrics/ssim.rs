//! Windowed SSIM (Wang et al., 2004) with a uniform window.
//!
//! For every window position fully inside the image the local means,
//! sample variances and covariance are taken over the `w x w` window, and
//! the SSIM map value is
//!
//! ```text
//! (2 ux uy + C1)(2 vxy + C2) / ((ux² + uy² + C1)(vx + vy + C2))
//! ```
//!
//! with `C1 = (0.01 L)²`, `C2 = (0.03 L)²` and `L = 255`. The score of a
//! channel is the mean of the map; the border of width `(w - 1) / 2` has no
//! full window and is excluded. Multi-channel images average the
//! per-channel scores.
//!
//! Window sums come from summed-area tables over exact integer sums, so
//! each position costs O(1) regardless of the window size.

use imgref::ImgRef;

use crate::decode::DecodedImage;
use crate::error::{Error, Result};
use crate::metrics::{DATA_RANGE, ensure_same_shape};

/// Luminance stabilization factor.
pub const K1: f64 = 0.01;
/// Contrast stabilization factor.
pub const K2: f64 = 0.03;

/// Calculate SSIM between two images with a `window x window` uniform window.
///
/// # Errors
///
/// Returns an error if the shapes differ, the window is even or zero, or
/// the window does not fit inside the image.
pub fn calculate_ssim(reference: &DecodedImage, test: &DecodedImage, window: usize) -> Result<f64> {
    ensure_same_shape("SSIM", reference, test)?;

    if window == 0 || window % 2 == 0 {
        return Err(ssim_error(format!("window size must be a positive odd integer, got {window}")));
    }

    let shape = reference.shape();
    if window > shape.width || window > shape.height {
        return Err(ssim_error(format!(
            "window size {window} exceeds image extent {}x{}",
            shape.height, shape.width
        )));
    }
    if shape.channels == 0 {
        return Err(ssim_error("image has no channels".to_string()));
    }

    let total: f64 = reference
        .planes()
        .zip(test.planes())
        .map(|(r, t)| plane_ssim(r, t, window))
        .sum();

    Ok(total / shape.channels as f64)
}

fn ssim_error(reason: String) -> Error {
    Error::MetricCalculation {
        metric: "SSIM".to_string(),
        reason,
    }
}

/// Mean SSIM of one channel. The window must fit inside the plane.
fn plane_ssim(reference: ImgRef<'_, u8>, test: ImgRef<'_, u8>, window: usize) -> f64 {
    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);

    let areas = SummedAreas::new(reference, test);
    let np = (window * window) as i128;
    let n = np as f64;
    // Sample covariance normalization; a 1x1 window has no spread at all.
    let cov_denominator = (np * (np - 1)) as f64;

    let rows = reference.height() - window + 1;
    let cols = reference.width() - window + 1;

    let mut sum = 0.0;
    for top in 0..rows {
        for left in 0..cols {
            let [sx, sy, sxx, syy, sxy] = areas.window(top, left, window).map(i128::from);

            let ux = sx as f64 / n;
            let uy = sy as f64 / n;
            let (vx, vy, vxy) = if np > 1 {
                (
                    (np * sxx - sx * sx) as f64 / cov_denominator,
                    (np * syy - sy * sy) as f64 / cov_denominator,
                    (np * sxy - sx * sy) as f64 / cov_denominator,
                )
            } else {
                (0.0, 0.0, 0.0)
            };

            let numerator = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
            let denominator = (ux * ux + uy * uy + c1) * (vx + vy + c2);
            sum += numerator / denominator;
        }
    }

    sum / (rows * cols) as f64
}

/// Summed-area tables of `x`, `y`, `x²`, `y²` and `xy` for a plane pair.
struct SummedAreas {
    stride: usize,
    sums: Vec<[u64; 5]>,
}

impl SummedAreas {
    fn new(reference: ImgRef<'_, u8>, test: ImgRef<'_, u8>) -> Self {
        let stride = reference.width() + 1;
        let mut sums = vec![[0u64; 5]; stride * (reference.height() + 1)];

        for (row, (ref_row, test_row)) in reference.rows().zip(test.rows()).enumerate() {
            let mut running = [0u64; 5];
            for (col, (&x, &y)) in ref_row.iter().zip(test_row).enumerate() {
                let (x, y) = (u64::from(x), u64::from(y));
                for (acc, value) in running.iter_mut().zip([x, y, x * x, y * y, x * y]) {
                    *acc += value;
                }
                let above = sums[row * stride + col + 1];
                sums[(row + 1) * stride + col + 1] = std::array::from_fn(|i| above[i] + running[i]);
            }
        }

        Self { stride, sums }
    }

    /// Sums over the `size x size` window with its top-left corner at `(top, left)`.
    fn window(&self, top: usize, left: usize, size: usize) -> [u64; 5] {
        let at = |row: usize, col: usize| self.sums[row * self.stride + col];
        let a = at(top, left);
        let b = at(top, left + size);
        let c = at(top + size, left);
        let d = at(top + size, left + size);
        std::array::from_fn(|i| (d[i] + a[i]) - (b[i] + c[i]))
    }
}
