use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use filelist_split_core::contract::BinConfig;
use filelist_split_core::input::FieldSeparator;
use filelist_split_core::progress::DEFAULT_PROGRESS_INTERVAL;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::cli::SplitArgs;
use crate::report::SummaryFormat;

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct StaticConfig {
    bins: BinConfig,
    input: InputSection,
    output: OutputSection,
    progress_interval: Option<u64>,
}

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct InputSection {
    field_separator: FieldSeparator,
}

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct OutputSection {
    dir: Option<PathBuf>,
    summary: bool,
    summary_format: SummaryFormat,
}

/// Fully merged settings for one split run.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitConfig {
    pub bins: BinConfig,
    pub field_separator: FieldSeparator,
    pub output_dir: PathBuf,
    pub summary: bool,
    pub summary_format: SummaryFormat,
    pub progress_interval: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            bins: BinConfig::default(),
            field_separator: FieldSeparator::default(),
            output_dir: PathBuf::from("."),
            summary: false,
            summary_format: SummaryFormat::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl SplitConfig {
    /// Override file/default values with whatever was given on the command line.
    pub fn apply_args(mut self, args: &SplitArgs) -> Result<Self> {
        if let Some(size) = args.size_max {
            self.bins.max_size = size;
        }
        if let Some(count) = args.numfiles_max {
            self.bins.max_count = count;
        }
        if let Some(ratio) = args.fill_ratio {
            self.bins.fill_ratio = ratio;
        }
        if args.no_oversized {
            self.bins.allow_oversized = false;
        }
        if let Some(dir) = &args.outdir {
            self.output_dir = dir.clone();
        }
        if args.null_sep {
            self.field_separator = FieldSeparator::Nul;
        } else if let Some(sep) = &args.field_sep {
            self.field_separator = sep
                .parse()
                .map_err(|e: String| anyhow::anyhow!("Invalid --field-sep: {e}"))?;
        }
        if args.with_summary {
            self.summary = true;
        }
        if let Some(format) = args.summary_format {
            self.summary_format = format;
        }
        if let Some(interval) = args.progress_interval {
            self.progress_interval = interval;
        }
        Ok(self)
    }

    pub fn trace_loaded(&self) {
        info!(
            output_dir = %self.output_dir.display(),
            field_separator = %self.field_separator,
            summary = self.summary,
            progress_interval = self.progress_interval,
            "Loaded SplitConfig"
        );
        self.bins.trace_loaded();
        debug!(?self, "SplitConfig loaded (full debug)");
    }
}

/// Loads a YAML config file. Keys that are absent keep their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SplitConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        anyhow::anyhow!("Failed to read config file {:?}: {}", path_ref, e)
    })?;

    let static_conf: StaticConfig = serde_yaml::from_str(&config_content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
        anyhow::anyhow!("Failed to parse config YAML {:?}: {e}", path_ref)
    })?;

    let defaults = SplitConfig::default();
    Ok(SplitConfig {
        bins: static_conf.bins,
        field_separator: static_conf.input.field_separator,
        output_dir: static_conf.output.dir.unwrap_or(defaults.output_dir),
        summary: static_conf.output.summary,
        summary_format: static_conf.output.summary_format,
        progress_interval: static_conf
            .progress_interval
            .unwrap_or(defaults.progress_interval),
    })
}

/// Defaults, then the config file (if any), then command-line flags.
pub fn resolve_config(args: &SplitArgs) -> Result<SplitConfig> {
    let base = match &args.config {
        Some(path) => load_config(path)?,
        None => SplitConfig::default(),
    };
    base.apply_args(args)
        .context("Failed to apply command-line options")
}
