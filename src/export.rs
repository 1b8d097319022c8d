//! CSV export of records and summaries.
//!
//! Infinite PSNR values (lossless pairs) are written as `inf`.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::metrics::MetricRecord;
use crate::report::{GroupSummary, SummaryTable};

/// `scope` of a per-directory row in the summary CSV.
pub const DIRECTORY_SCOPE: &str = "directory";
/// `scope` of the overall row in the summary CSV. Its `directory` is empty.
pub const OVERALL_SCOPE: &str = "overall";

#[derive(Serialize)]
struct RecordRow<'a> {
    image: &'a str,
    psnr: String,
    ssim: f64,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    scope: &'static str,
    directory: &'a str,
    count: usize,
    mean_psnr: String,
    mean_ssim: f64,
}

impl<'a> SummaryRow<'a> {
    fn new(scope: &'static str, directory: &'a str, summary: &GroupSummary) -> Self {
        Self {
            scope,
            directory,
            count: summary.count,
            mean_psnr: format_psnr(summary.mean_psnr),
            mean_ssim: summary.mean_ssim,
        }
    }
}

/// Format a PSNR value, using `inf` for lossless pairs.
#[must_use]
pub fn format_psnr(psnr: f64) -> String {
    if psnr.is_infinite() {
        "inf".to_string()
    } else {
        psnr.to_string()
    }
}

/// Write one `image,psnr,ssim` row per record, in the given order.
pub fn write_records<W: Write>(writer: W, records: &[MetricRecord]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(["image", "psnr", "ssim"])?;

    for record in records {
        wtr.serialize(RecordRow {
            image: record.path.as_str(),
            psnr: format_psnr(record.psnr),
            ssim: record.ssim,
        })?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write per-record CSV to a file.
pub fn write_records_to_path(path: &Path, records: &[MetricRecord]) -> Result<()> {
    write_records(std::fs::File::create(path)?, records)
}

/// Write one row per directory followed by the overall row.
///
/// The leading `scope` column tells the overall row apart from a directory
/// that happens to share its label; the root directory has an empty
/// `directory` cell.
pub fn write_summary<W: Write>(writer: W, summary: &SummaryTable) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(["scope", "directory", "count", "mean_psnr", "mean_ssim"])?;

    for (directory, group) in summary.groups() {
        wtr.serialize(SummaryRow::new(DIRECTORY_SCOPE, directory, group))?;
    }
    if let Some(overall) = summary.overall() {
        wtr.serialize(SummaryRow::new(OVERALL_SCOPE, "", overall))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the summary CSV to a file.
pub fn write_summary_to_path(path: &Path, summary: &SummaryTable) -> Result<()> {
    write_summary(std::fs::File::create(path)?, summary)
}
