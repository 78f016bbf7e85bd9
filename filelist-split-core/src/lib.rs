#![doc = "filelist-split-core: streaming bin-packing engine for filelist-split."]

//! This crate contains the packing logic, data models and writer contract for
//! filelist-split. It reads `(size, path)` records one at a time, groups them
//! into bins bounded by cumulative size and item count, and hands every closed
//! bin to a [`contract::BinWriter`].
//!
//! # Usage
//! Build a [`contract::BinConfig`], pick a writer (usually
//! [`writer::FilelistWriter`]) and drive a [`partition::Partitioner`], or call
//! [`partition::partition`] with an [`input::ItemReader`].

pub mod bins;
pub mod contract;
pub mod error;
pub mod input;
pub mod partition;
pub mod progress;
pub mod stats;
pub mod writer;

pub use bins::{Bin, BinId, BinSet};
pub use contract::{BinConfig, BinWriter, Item};
pub use error::{InputError, PartitionError, StatsError};
pub use partition::{partition, PartitionOutcome, Partitioner};
pub use stats::{BinStats, Distribution, Extremes, StatsCollector};
pub use writer::FilelistWriter;
