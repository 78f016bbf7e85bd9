use std::path::PathBuf;

use thiserror::Error;

use crate::bins::BinId;

/// A record in the input stream could not be turned into an item.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("line {line}: no field separator found")]
    MissingSeparator { line: u64 },

    #[error("line {line}: invalid size {value:?}")]
    InvalidSize { line: u64, value: String },

    #[error("line {line}: empty path")]
    EmptyPath { line: u64 },

    #[error("line {line}: failed to read input: {source}")]
    Io {
        line: u64,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum PartitionError {
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("output directory {0:?} does not exist")]
    MissingOutputDir(PathBuf),

    #[error("item {path:?} ({size} bytes) does not fit an empty bin of {max_size} bytes and oversized items are disabled")]
    Unplaceable {
        path: String,
        size: u64,
        max_size: u64,
    },

    #[error("failed to write bin {bin}: {source}")]
    Write {
        bin: BinId,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Input(#[from] InputError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StatsError {
    #[error("insufficient data: no finalised bins to summarise")]
    InsufficientData,
}
