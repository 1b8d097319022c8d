//! Parallel fan-out of pair evaluations.
//!
//! Each batch gets its own bounded rayon pool which is torn down when the
//! batch returns. Results are collected positionally, so `records[i]`
//! always belongs to `paths[i]` whatever order the workers finish in.
//!
//! Failure is fail-fast: after the first error no further pairs are
//! started, pairs already in flight run to completion and are discarded,
//! and the first error observed is returned. A batch never yields a
//! partial result.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::eval::pair::PairEvaluator;
use crate::metrics::MetricRecord;
use crate::scan::ImagePath;

/// Evaluate every path on a pool of `worker_count` threads.
pub fn run(
    paths: &[ImagePath],
    worker_count: usize,
    evaluator: &PairEvaluator,
) -> Result<Vec<MetricRecord>> {
    if worker_count == 0 {
        return Err(Error::InvalidConfiguration(
            "worker count must be at least 1".to_string(),
        ));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .thread_name(|i| format!("rq-worker-{i}"))
        .build()?;

    log::info!(
        "Evaluating {} image pairs with {} workers",
        paths.len(),
        worker_count
    );

    let records = pool.install(|| {
        paths
            .par_iter()
            .map(|path| evaluator.evaluate(path))
            .collect::<Result<Vec<_>>>()
    })?;

    debug_assert_eq!(records.len(), paths.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::fixtures::{mirrored_trees, write_png};
    use crate::scan::scan;

    #[test]
    fn test_order_independent_of_worker_count() {
        let (source, target) = mirrored_trees(12);
        let paths = scan(source.path()).unwrap();
        let evaluator = PairEvaluator::new(source.path(), target.path(), 3);

        let single = run(&paths, 1, &evaluator).unwrap();
        assert_eq!(single.len(), paths.len());
        for (record, path) in single.iter().zip(&paths) {
            assert_eq!(&record.path, path);
        }

        for workers in [2, 8] {
            let parallel = run(&paths, workers, &evaluator).unwrap();
            assert_eq!(parallel, single, "worker count {workers} changed the results");
        }
    }

    #[test]
    fn test_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let evaluator = PairEvaluator::new(dir.path(), dir.path(), 3);
        assert!(run(&[], 4, &evaluator).unwrap().is_empty());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let evaluator = PairEvaluator::new(dir.path(), dir.path(), 3);
        let result = run(&[], 0, &evaluator);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_single_failure_fails_batch() {
        let (source, target) = mirrored_trees(6);
        // Present in the source only.
        write_png(source.path(), "extra/orphan.png", &[0u8; 64], 8, 8, 1);

        let paths = scan(source.path()).unwrap();
        let evaluator = PairEvaluator::new(source.path(), target.path(), 3);

        for workers in [1, 2, 8] {
            let err = run(&paths, workers, &evaluator).unwrap_err();
            assert!(
                matches!(err, Error::TargetImageMissing { ref image, .. } if image.as_str() == "extra/orphan.png"),
                "unexpected error: {err}"
            );
        }
    }
}
