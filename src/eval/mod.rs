//! Pair evaluation and batch dispatch.
//!
//! - [`pair::PairEvaluator`]: validates and measures one image pair
//! - [`dispatch::run`]: fans evaluations out over a bounded worker pool
//! - [`session::compare`]: scan, evaluate and summarize in one call
//! - [`session::CompareConfig`]: validated run configuration

pub mod dispatch;
pub mod pair;
pub mod session;

pub use pair::PairEvaluator;
pub use session::{CompareConfig, CompareConfigBuilder, Comparison, compare};

#[cfg(test)]
pub(crate) mod fixtures {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use crate::decode::tests::encode_png;

    /// Write an 8-bit PNG at `root/relative`, creating parent directories.
    pub(crate) fn write_png(
        root: &Path,
        relative: &str,
        data: &[u8],
        width: u32,
        height: u32,
        channels: usize,
    ) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, encode_png(data, width, height, channels)).unwrap();
    }

    /// Deterministically perturb every sample by up to `amplitude`.
    pub(crate) fn noisy_copy(data: &[u8], amplitude: u8) -> Vec<u8> {
        data.iter()
            .enumerate()
            .map(|(i, &v)| {
                let delta = (i * 31 % (usize::from(amplitude) * 2 + 1)) as i16 - i16::from(amplitude);
                (i16::from(v) + delta).clamp(0, 255) as u8
            })
            .collect()
    }

    /// Source and target trees with `count` 8x8 RGB images spread over
    /// `a/`, `b/` and the root. Every third target image is identical to
    /// its source, the rest are perturbed.
    pub(crate) fn mirrored_trees(count: usize) -> (TempDir, TempDir) {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();

        for i in 0..count {
            let relative = match i % 3 {
                0 => format!("a/{i:02}.png"),
                1 => format!("b/{i:02}.png"),
                _ => format!("{i:02}.png"),
            };
            let pixels: Vec<u8> = (0..8 * 8 * 3).map(|p| ((p * (i + 3) + i * 17) % 256) as u8).collect();
            let reconstruction = if i % 3 == 0 {
                pixels.clone()
            } else {
                noisy_copy(&pixels, (i % 7 + 1) as u8)
            };
            write_png(source.path(), &relative, &pixels, 8, 8, 3);
            write_png(target.path(), &relative, &reconstruction, 8, 8, 3);
        }

        (source, target)
    }
}
