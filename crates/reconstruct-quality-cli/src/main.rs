//! reconstructquality CLI - SSIM / PSNR between two mirrored image trees

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use reconstruct_quality::{CompareConfig, compare, export};

mod logging;
mod table;

/// Calculate reconstruction quality between a source and a target image tree.
#[derive(Parser)]
#[command(name = "reconstructquality")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source directory to compare images from
    #[arg(long)]
    source: PathBuf,

    /// Target directory holding the reconstructed images
    #[arg(long)]
    target: PathBuf,

    /// Output path of a per-image CSV file (image, psnr, ssim)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Output path of a per-directory summary CSV file
    #[arg(long)]
    summary_csv: Option<PathBuf>,

    /// Number of parallel threads
    #[arg(long, default_value_t = reconstruct_quality::eval::session::DEFAULT_WORKERS, env = "RQ_THREADS")]
    threads: usize,

    /// SSIM window size (odd integer only)
    #[arg(long, default_value_t = reconstruct_quality::eval::session::DEFAULT_SSIM_WINDOW, env = "RQ_SSIM_WINDOW")]
    ssim_window: usize,

    /// Also print one row per image
    #[arg(long)]
    per_image: bool,

    /// Mute standard output
    #[arg(long)]
    mute: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = CompareConfig::builder()
        .source(&cli.source)
        .target(&cli.target)
        .workers(cli.threads)
        .ssim_window(cli.ssim_window)
        .build()
        .context("Invalid arguments")?;

    let comparison = compare(&config).with_context(|| {
        format!(
            "Failed to compare {} against {}",
            cli.source.display(),
            cli.target.display()
        )
    })?;

    if let Some(path) = &cli.csv {
        export::write_records_to_path(path, &comparison.records)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Wrote {} records to {}", comparison.records.len(), path.display());
    }

    if let Some(path) = &cli.summary_csv {
        export::write_summary_to_path(path, &comparison.summary)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Wrote summary to {}", path.display());
    }

    if !cli.mute {
        if comparison.records.is_empty() {
            println!("No images found under {}", cli.source.display());
            return Ok(());
        }
        if cli.per_image {
            print!("{}", table::render_records(&comparison.records));
            println!();
        }
        print!("{}", table::render_summary(&comparison.summary));
    }

    Ok(())
}
