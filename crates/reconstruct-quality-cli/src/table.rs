//! Console tables.

use std::fmt::Write;

use reconstruct_quality::export::format_psnr;
use reconstruct_quality::{GroupSummary, MetricRecord, SummaryTable};

const RULE_WIDTH: usize = 64;

fn rule(out: &mut String) {
    let _ = writeln!(out, "{:-<RULE_WIDTH$}", "");
}

fn fit(name: &str, width: usize) -> String {
    let len = name.chars().count();
    if len > width {
        let tail: String = name.chars().skip(len - (width - 3)).collect();
        format!("...{tail}")
    } else {
        name.to_string()
    }
}

fn summary_row(out: &mut String, label: &str, summary: &GroupSummary) {
    let _ = writeln!(
        out,
        "{:<34} {:>7} {:>10} {:>10.4}",
        fit(label, 34),
        summary.count,
        format_psnr_cell(summary.mean_psnr),
        summary.mean_ssim
    );
}

fn format_psnr_cell(psnr: f64) -> String {
    if psnr.is_finite() {
        format!("{psnr:.2}")
    } else {
        format_psnr(psnr)
    }
}

/// Render the per-directory table followed by the overall row.
pub fn render_summary(summary: &SummaryTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<34} {:>7} {:>10} {:>10}", "Directory", "Images", "PSNR", "SSIM");
    rule(&mut out);

    for (directory, group) in summary.groups() {
        let label = if directory.is_empty() { "." } else { directory };
        summary_row(&mut out, label, group);
    }

    if let Some(overall) = summary.overall() {
        rule(&mut out);
        summary_row(&mut out, "Overall", overall);
    }

    out
}

/// Render one row per image in dispatch order.
pub fn render_records(records: &[MetricRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<42} {:>10} {:>10}", "Image", "PSNR", "SSIM");
    rule(&mut out);

    for record in records {
        let _ = writeln!(
            out,
            "{:<42} {:>10} {:>10.4}",
            fit(record.path.as_str(), 42),
            format_psnr_cell(record.psnr),
            record.ssim
        );
    }

    out
}
