//! Command-line interface for SMF extraction.
//!
//! The CLI is the host side of an extraction: it picks the archive and the
//! destination, polls the running job every 100 ms, and renders its log and
//! progress.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use smf_extractor::{
    begin_extraction, open_archive, parse_index, probe, ExtractOptions, LogBuffer,
};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "smf-extract")]
#[command(version, about = "Extract SMF archives from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every entry of an archive
    Extract {
        /// Archive file to extract
        archive: PathBuf,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// Worker threads (default: number of CPUs, at least 2)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Only print failures and the summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Probe archive metadata
    Probe {
        /// Archive file to probe
        archive: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            archive,
            out,
            workers,
            quiet,
        } => handle_extract(archive, out, workers, quiet).await,
        Commands::Probe { archive, json } => handle_probe(archive, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn handle_extract(
    archive_path: PathBuf,
    out: PathBuf,
    workers: Option<usize>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let archive = Arc::new(open_archive(&archive_path)?);
    let index = Arc::new(parse_index(&archive)?);
    let log = Arc::new(LogBuffer::new());

    let options = ExtractOptions { workers };
    let job = begin_extraction(archive, index, &out, &options, log.clone())?;

    let bar = ProgressBar::new(job.poll_progress().total as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} ({elapsed})")?
            .progress_chars("=> "),
    );

    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    loop {
        ticker.tick().await;
        let progress = job.poll_progress();
        print_log(&bar, &log.drain(), quiet);
        bar.set_position(progress.completed as u64);
        if progress.finished || job.is_finished() {
            break;
        }
    }

    let stats = tokio::task::spawn_blocking(move || job.join()).await?;
    print_log(&bar, &log.drain(), quiet);
    bar.finish_and_clear();

    tracing::info!(
        extracted = stats.files_extracted,
        failed = stats.files_failed,
        "done"
    );
    println!(
        "Extracted {} files ({} bytes) in {:.2}s, {} failed",
        stats.files_extracted,
        stats.bytes_written,
        stats.duration.as_secs_f64(),
        stats.files_failed
    );
    Ok(())
}

fn print_log(bar: &ProgressBar, text: &str, quiet: bool) {
    for line in text.lines() {
        if quiet && !is_failure(line) {
            continue;
        }
        bar.println(line);
    }
}

fn is_failure(line: &str) -> bool {
    line.starts_with("Failed") || line.starts_with("Invalid") || line.starts_with("Not enough")
}

fn handle_probe(archive: PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let info = probe(&archive)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let compression = info
        .compression
        .map_or_else(|| format!("unknown ({:#04x})", info.flags), |c| c.to_string());
    println!("Compression: {}", compression);
    println!(
        "Entries:     {} (declared {}{})",
        info.entries,
        info.declared_entries,
        if info.truncated { ", index truncated" } else { "" }
    );
    println!("Archive:     {} bytes", info.archive_bytes);
    println!("Stored:      {} bytes", info.compressed_bytes);
    println!("Unpacked:    {} bytes", info.uncompressed_bytes);
    println!();
    for entry in &info.entry_list {
        println!(
            "{:>12} {:>12}  {}",
            entry.compressed_size, entry.size, entry.path
        );
    }
    Ok(())
}
