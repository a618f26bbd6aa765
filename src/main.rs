//! yarch CLI - pack files into a container and extract them again.
//!
//! This is the main entry point for the yarch command-line application.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use yarch::prelude::*;

/// yarch - simple file container with optional run-length encoding
#[derive(Parser)]
#[command(name = "yarch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log each file as it is archived or extracted
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack files into a new container
    Compress {
        /// Container file to create
        #[arg(short, long, env = "YARCH_ARCHIVE")]
        archive: PathBuf,

        /// Store payloads run-length encoded
        #[arg(long)]
        rle: bool,

        /// Files to pack, stored in this order under their base names
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Extract every file of a container into a directory
    Extract {
        /// Container file to read
        #[arg(short, long, env = "YARCH_ARCHIVE")]
        archive: PathBuf,

        /// Existing output directory
        #[arg(short, long, env = "YARCH_OUTPUT")]
        output: PathBuf,

        /// Payloads were stored run-length encoded
        #[arg(long)]
        rle: bool,
    },

    /// List the contents of a container
    List {
        /// Container file to read
        #[arg(short, long, env = "YARCH_ARCHIVE")]
        archive: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show sizes and header offsets
        #[arg(short, long)]
        detailed: bool,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version also arrive here.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Exit code for a failed command. Errors from outside the library are
/// argument problems.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<yarch::archive::Error>()
        .map(|e| e.kind().exit_code())
        .unwrap_or(1)
}

fn encoding(rle: bool) -> Encoding {
    if rle {
        Encoding::Rle
    } else {
        Encoding::Raw
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Compress { archive, rle, files } => cmd_compress(&archive, &files, encoding(rle)),
        Commands::Extract {
            archive,
            output,
            rle,
        } => cmd_extract(&archive, &output, encoding(rle)),
        Commands::List {
            archive,
            filter,
            detailed,
        } => cmd_list(&archive, filter.as_deref(), detailed),
    }
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn cmd_compress(archive: &Path, files: &[PathBuf], encoding: Encoding) -> Result<()> {
    println!("Archiving {} files into {} ({})", files.len(), archive.display(), encoding);

    let pb = progress_bar(files.len() as u64)?;
    let start = Instant::now();

    let summary = write_archive_with(archive, files, encoding, |_, _| pb.inc(1))
        .with_context(|| format!("Failed to write archive '{}'", archive.display()))?;

    pb.finish_and_clear();
    println!(
        "The '{}' archive is ready: {} files, {} bytes ({} raw) in {:?}",
        archive.display(),
        summary.files,
        summary.archive_len(),
        summary.raw_bytes,
        start.elapsed()
    );

    Ok(())
}

fn cmd_extract(archive: &Path, output: &Path, encoding: Encoding) -> Result<()> {
    println!("Opening archive: {}", archive.display());

    let mut reader = ArchiveReader::open(archive).context("Failed to open archive")?;
    println!("Extracting {} entries ({})...", reader.files_count(), encoding);

    let pb = progress_bar(reader.files_count())?;
    let start = Instant::now();

    let summary = reader
        .extract_with(output, ExtractOptions::new(encoding), |_, _| pb.inc(1))
        .with_context(|| format!("Failed to extract into '{}'", output.display()))?;

    pb.finish_and_clear();
    println!(
        "The files from the '{}' archive have been extracted: {} files, {} bytes in {:?}",
        archive.display(),
        summary.files,
        summary.raw_bytes,
        start.elapsed()
    );

    Ok(())
}

fn cmd_list(archive: &Path, filter: Option<&str>, detailed: bool) -> Result<()> {
    let pattern = filter
        .map(glob::Pattern::new)
        .transpose()
        .context("Invalid filter pattern")?;

    let mut reader = ArchiveReader::open(archive).context("Failed to open archive")?;
    let entries = reader.entries().context("Failed to read archive header")?;

    if detailed {
        println!("Header size: {} bytes", reader.header_size());
    }

    let mut count = 0;
    for entry in &entries {
        let name = entry.name_lossy();
        if let Some(pattern) = &pattern {
            if !pattern.matches(&name) {
                continue;
            }
        }

        if detailed {
            println!("{:>12} {}", entry.payload_len(), name);
        } else {
            println!("{}", name);
        }
        count += 1;
    }

    println!("\nTotal: {} entries", count);

    Ok(())
}
