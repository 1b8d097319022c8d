//! Aggregation of per-image records into per-directory and overall means.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metrics::MetricRecord;

/// Mean quality of a group of images.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Mean SSIM.
    pub mean_ssim: f64,
    /// Mean PSNR in dB; `f64::INFINITY` if any image in the group is lossless.
    pub mean_psnr: f64,
    /// Number of images.
    pub count: usize,
}

/// Per-directory summaries plus an overall entry.
///
/// Directories are keyed by the parent portion of each image path (`""`
/// for images directly under the root) and iterate in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    groups: BTreeMap<String, GroupSummary>,
    overall: Option<GroupSummary>,
}

impl SummaryTable {
    /// Iterate over `(directory, summary)` pairs.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &GroupSummary)> {
        self.groups.iter().map(|(dir, summary)| (dir.as_str(), summary))
    }

    /// Summary of one directory.
    #[must_use]
    pub fn group(&self, directory: &str) -> Option<&GroupSummary> {
        self.groups.get(directory)
    }

    /// Summary across all records, `None` when there were no records.
    #[must_use]
    pub fn overall(&self) -> Option<&GroupSummary> {
        self.overall.as_ref()
    }

    /// Number of directory groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if the table has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Default)]
struct Accumulator {
    ssim: f64,
    psnr: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, record: &MetricRecord) {
        self.ssim += record.ssim;
        self.psnr += record.psnr;
        self.count += 1;
    }

    fn finish(&self) -> GroupSummary {
        let n = self.count as f64;
        GroupSummary {
            mean_ssim: self.ssim / n,
            mean_psnr: self.psnr / n,
            count: self.count,
        }
    }
}

/// Group records by parent directory and compute arithmetic means.
///
/// An empty input yields an empty table with no overall entry.
#[must_use]
pub fn summarize(records: &[MetricRecord]) -> SummaryTable {
    if records.is_empty() {
        return SummaryTable::default();
    }

    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    let mut overall = Accumulator::default();

    for record in records {
        groups.entry(record.path.parent()).or_default().add(record);
        overall.add(record);
    }

    SummaryTable {
        groups: groups
            .into_iter()
            .map(|(dir, acc)| (dir.to_string(), acc.finish()))
            .collect(),
        overall: Some(overall.finish()),
    }
}
