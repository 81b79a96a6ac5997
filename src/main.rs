//! Main entry point for the mkzip CLI application.
//!
//! Builds an archive in memory with the library and writes it to a file or
//! to stdout.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::Read;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zip::ZipArchive;

use mkzip::{
    CancellationToken, Cli, DirectoryHandle, FileHandle, LocalFileSystem, ZipBuilder, ZipStream,
};

/// Application entry point.
///
/// Parses command-line arguments, wires Ctrl-C to the cancellation token and
/// dispatches to the flat or recursive build.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_filter().into()),
        )
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling archive build");
            on_interrupt.cancel();
        }
    });

    let builder = ZipBuilder::with_options(Arc::new(LocalFileSystem::new()), cli.archive_options());

    // Files go through the byte-buffer variant, trees through the stream variant
    let stream = if cli.recurse {
        let dirs = cli.paths.iter().map(DirectoryHandle::new);
        builder
            .directories_to_stream(dirs, &cancel)
            .await
            .context("failed to archive directories")?
    } else {
        let files = cli.paths.iter().map(FileHandle::new);
        let bytes = builder
            .files_to_bytes(files, &cancel)
            .await
            .context("failed to archive files")?;
        ZipStream::new(bytes)
    };

    if stream.get_ref().is_empty() {
        bail!("nothing to do: none of the given paths exist");
    }

    write_output(&cli, stream.get_ref()).await?;
    info!(output = %cli.output, bytes = stream.get_ref().len(), "archive written");

    if cli.verbose && !cli.to_stdout() {
        list_entries(stream)?;
    } else if !cli.is_quiet() {
        println!(
            "  created: {} ({})",
            cli.output,
            format_size(stream.get_ref().len() as u64)
        );
    }

    Ok(())
}

/// Write the finished archive to the output file or stdout.
async fn write_output(cli: &Cli, data: &[u8]) -> Result<()> {
    if cli.to_stdout() {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(data).await?;
        stdout.flush().await?;
        return Ok(());
    }

    tokio::fs::write(&cli.output, data)
        .await
        .with_context(|| format!("cannot write {}", cli.output))
}

/// Print a table of the archive's entries, read back from the finished stream.
///
/// Columns are uncompressed length, compressed size and the space saved.
fn list_entries(stream: ZipStream) -> Result<()> {
    let mut archive = ZipArchive::new(stream).context("cannot reopen created archive")?;

    println!("{:>10}  {:>10}  {:>5}  Name", "Length", "Size", "Cmpr");
    println!("{}", "-".repeat(50));

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        // Reading the entry verifies its CRC against the stored checksum
        let mut sink = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut sink)
            .with_context(|| format!("entry {} is corrupt", entry.name()))?;

        println!(
            "{:>10}  {:>10}  {}  {}",
            entry.size(),
            entry.compressed_size(),
            ratio(entry.compressed_size(), entry.size()),
            entry.name()
        );

        total_uncompressed += entry.size();
        total_compressed += entry.compressed_size();
    }

    println!("{}", "-".repeat(50));
    println!(
        "{:>10}  {:>10}  {}  {} files",
        total_uncompressed,
        total_compressed,
        ratio(total_compressed, total_uncompressed),
        archive.len()
    );

    Ok(())
}

/// Compression ratio as percentage saved, right-aligned to 5 columns.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 && compressed <= uncompressed {
        format!("{:>4}%", 100 - (compressed * 100 / uncompressed))
    } else {
        "  0%".to_string()
    }
}

/// Format a byte size into a human-readable string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
