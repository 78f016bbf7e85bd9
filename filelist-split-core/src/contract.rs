//! # contract: shared data model and the bin writer interface
//!
//! This module defines the plain data passed between the reader, the
//! partitioner and the writer, plus the single trait ([`BinWriter`]) through
//! which closed bins leave the engine.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so tests can assert exactly which
//!   bins were written, and in what order, without touching the filesystem.
//!
//! ## Adding New Destinations
//! - Implement [`BinWriter`] for your destination.
//! - Return an `io::Error` for anything that prevents the bin from being
//!   persisted; the partitioner aborts the run on the first failure.

use std::path::PathBuf;

use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::bins::Bin;
use crate::error::PartitionError;

/// A single `(path, size)` record to be packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    path: String,
    size: u64,
}

impl Item {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Default maximum cumulative size of a bin: 1 GiB.
pub const DEFAULT_MAX_SIZE: u64 = 1_073_741_824;
/// Default maximum number of items in a bin.
pub const DEFAULT_MAX_COUNT: usize = 1_048_576;
/// Default soft closure threshold, as a fraction of `max_size`.
pub const DEFAULT_FILL_RATIO: f64 = 0.9;

/// Capacity and policy settings shared by every bin of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BinConfig {
    /// Hard limit on the cumulative size of a bin, in bytes.
    pub max_size: u64,
    /// Hard limit on the number of items in a bin.
    pub max_count: usize,
    /// Fraction of `max_size` at which a bin is closed early.
    pub fill_ratio: f64,
    /// Let a single item larger than `max_size` occupy its own bin.
    pub allow_oversized: bool,
}

impl Default for BinConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            max_count: DEFAULT_MAX_COUNT,
            fill_ratio: DEFAULT_FILL_RATIO,
            allow_oversized: true,
        }
    }
}

impl BinConfig {
    /// Reject capacities that would make every insertion fail or every bin
    /// close immediately.
    pub fn validate(&self) -> Result<(), PartitionError> {
        if self.max_size == 0 {
            return Err(PartitionError::InvalidConfig {
                field: "max_size",
                reason: "must be greater than zero".into(),
            });
        }
        if self.max_count == 0 {
            return Err(PartitionError::InvalidConfig {
                field: "max_count",
                reason: "must be greater than zero".into(),
            });
        }
        if !self.fill_ratio.is_finite() || self.fill_ratio <= 0.0 {
            return Err(PartitionError::InvalidConfig {
                field: "fill_ratio",
                reason: format!("must be a positive number, got {}", self.fill_ratio),
            });
        }
        if self.fill_ratio > 1.0 {
            tracing::warn!(
                fill_ratio = self.fill_ratio,
                "fill_ratio above 1.0, bins will only close on hard limits"
            );
        }
        Ok(())
    }

    pub fn trace_loaded(&self) {
        tracing::info!(
            max_size = self.max_size,
            max_count = self.max_count,
            fill_ratio = self.fill_ratio,
            allow_oversized = self.allow_oversized,
            "Loaded BinConfig"
        );
    }
}

/// Trait for persisting a finalised bin.
///
/// Called exactly once per bin, after the bin has been removed from the open
/// set. Implementations must keep the bin's item order.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait BinWriter {
    /// Persist the bin's membership and return where it was written.
    fn write_bin(&mut self, bin: &Bin) -> std::io::Result<PathBuf>;
}

impl<T: BinWriter + ?Sized> BinWriter for &mut T {
    fn write_bin(&mut self, bin: &Bin) -> std::io::Result<PathBuf> {
        (**self).write_bin(bin)
    }
}
