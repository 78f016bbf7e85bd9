use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use filelist_split_core::input::{count_lines, ItemReader};
use filelist_split_core::partition::Partitioner;
use filelist_split_core::progress::Progress;
use filelist_split_core::writer::FilelistWriter;
use tracing::{info, warn};

use crate::load_config::{resolve_config, SplitConfig};
use crate::report::{render_json, render_text, SummaryFormat};

/// CLI for filelist-split: pack a (size, path) file list into bounded bins.
#[derive(Parser)]
#[clap(
    name = "filelist-split",
    version,
    about = "Split a file list into bins bounded by total size and file count"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split INFILE into <outdir>/<bin-id>.filelist files
    Split(SplitArgs),
}

#[derive(Args, Debug, Default)]
pub struct SplitArgs {
    /// Input file list with one "<size><sep><path>" record per line, '-' for stdin
    pub infile: PathBuf,

    /// Path to a YAML config file; flags override its values
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Max size, in bytes, of the sum of all file sizes in each bin
    #[clap(short = 's', long)]
    pub size_max: Option<u64>,

    /// Max number of files in each bin
    #[clap(short = 'n', long)]
    pub numfiles_max: Option<usize>,

    /// Output directory, must already exist
    #[clap(short, long)]
    pub outdir: Option<PathBuf>,

    /// Close a bin once it holds this fraction of --size-max
    #[clap(long)]
    pub fill_ratio: Option<f64>,

    /// Fail on files larger than --size-max instead of giving each its own bin
    #[clap(long)]
    pub no_oversized: bool,

    /// Field separator between size and path (default: whitespace)
    #[clap(short = 'F', long, conflicts_with = "null_sep")]
    pub field_sep: Option<String>,

    /// Use NUL as the field separator
    #[clap(short = '0', long)]
    pub null_sep: bool,

    /// Print a summary of the bins after the run
    #[clap(long)]
    pub with_summary: bool,

    #[clap(long, value_enum)]
    pub summary_format: Option<SummaryFormat>,

    /// Records between progress reports (0 disables them)
    #[clap(long)]
    pub progress_interval: Option<u64>,

    #[clap(short, long)]
    pub verbose: bool,

    #[clap(short, long)]
    pub debug: bool,
}

impl Cli {
    /// Default log filter for the selected verbosity; `RUST_LOG` takes precedence.
    pub fn log_directives(&self) -> &'static str {
        match &self.command {
            Commands::Split(args) if args.debug => "debug",
            Commands::Split(args) if args.verbose => "info",
            Commands::Split(_) => "warn",
        }
    }
}

/// Extracted CLI logic entrypoint for integration tests and main()
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Split(args) => split(&args),
    }
}

fn split(args: &SplitArgs) -> Result<()> {
    let config = resolve_config(args)?;
    config.trace_loaded();

    // Preconditions first: nothing is read before the output directory and
    // the bin limits have been checked.
    let writer = FilelistWriter::new(&config.output_dir).context("Invalid output directory")?;
    let partitioner = Partitioner::new(config.bins.clone(), writer).context("Invalid bin configuration")?;

    let (input, total) = open_input(&args.infile, &config)?;
    let reader = ItemReader::new(input, config.field_separator);
    let progress = Progress::new(config.progress_interval, total);

    info!(infile = %args.infile.display(), total_lines = ?total, "Splitting file list");
    let outcome = partitioner
        .with_progress(progress)
        .run(reader)
        .with_context(|| format!("Failed to split {}", args.infile.display()))?;

    if config.summary {
        let stats = outcome.stats.summarize();
        if let Err(e) = &stats {
            warn!(error = %e, "Skipping bin statistics");
        }
        let rendered = match config.summary_format {
            SummaryFormat::Text => render_text(&outcome, stats.as_ref().ok()),
            SummaryFormat::Json => render_json(&outcome, stats.as_ref().ok())?,
        };
        println!("{rendered}");
    }
    Ok(())
}

/// Open the input; for a regular file, also count its records so progress
/// reports can estimate the remaining time.
fn open_input(infile: &Path, config: &SplitConfig) -> Result<(Box<dyn BufRead>, Option<u64>)> {
    if infile == Path::new("-") {
        return Ok((Box::new(BufReader::new(io::stdin())), None));
    }
    let open = || {
        File::open(infile).with_context(|| format!("Failed to open input file {}", infile.display()))
    };
    let total = if config.progress_interval > 0 {
        let lines = count_lines(BufReader::new(open()?))
            .with_context(|| format!("Failed to read input file {}", infile.display()))?;
        Some(lines)
    } else {
        None
    };
    Ok((Box::new(BufReader::new(open()?)), total))
}
