//! Streaming first-fit partitioning of items into bins.
//!
//! This module owns the main loop of the engine. For every item, in input
//! order, it:
//!   - Offers the item to each open bin, oldest first, until one accepts it
//!   - Marks every bin it visited that now reports itself full
//!   - Closes the marked bins once the scan is over: each is written, recorded
//!     for statistics and dropped
//!   - Opens a new bin when no open bin accepted the item
//!
//! At the end of the stream every remaining open bin is closed, full or not.
//!
//! # Resource model
//! Only open bins are held in memory. A closed bin is handed to the
//! [`BinWriter`] immediately and released, so memory does not grow with the
//! size of the input.
//!
//! # Error Handling
//! Every error is fatal for the run: invalid configuration (checked in
//! [`Partitioner::new`]), malformed input, a failed write, or an item that an
//! empty bin refuses (oversized items with `allow_oversized` off).
//!
//! # Navigation
//! - Main entrypoints: [`Partitioner`], [`partition`]
//! - Result: [`PartitionOutcome`]

use std::time::{Duration, Instant};

use tracing::{debug, error, info, info_span};

use crate::bins::{Bin, BinId, BinSet};
use crate::contract::{BinConfig, BinWriter, Item};
use crate::error::{InputError, PartitionError};
use crate::progress::Progress;
use crate::stats::StatsCollector;

/// Totals of a completed run.
#[derive(Debug)]
pub struct PartitionOutcome {
    /// Number of items placed.
    pub items: u64,
    /// Sum of the sizes of all items placed.
    pub total_bytes: u64,
    pub bins_written: usize,
    pub elapsed: Duration,
    pub stats: StatsCollector,
}

/// Assigns a stream of items to bins, first-fit in bin creation order.
pub struct Partitioner<W> {
    config: BinConfig,
    open: BinSet,
    writer: W,
    stats: StatsCollector,
    progress: Option<Progress>,
    items: u64,
    total_bytes: u64,
    started: Instant,
}

impl<W: BinWriter> Partitioner<W> {
    /// Validates `config` before anything is processed.
    pub fn new(config: BinConfig, writer: W) -> Result<Self, PartitionError> {
        config.validate()?;
        Ok(Self {
            config,
            open: BinSet::new(),
            writer,
            stats: StatsCollector::new(),
            progress: None,
            items: 0,
            total_bytes: 0,
            started: Instant::now(),
        })
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Bins that are still accepting items, oldest first.
    pub fn open_bins(&self) -> &BinSet {
        &self.open
    }

    /// Place a single item.
    pub fn push(&mut self, item: Item) -> Result<(), PartitionError> {
        let size = item.size();
        let mut pending = Some(item);
        let mut marked: Vec<BinId> = Vec::new();

        for bin in self.open.iter_mut() {
            let Some(item) = pending.take() else {
                break;
            };
            if let Err(rejected) = bin.insert(item) {
                pending = Some(rejected);
            }
            if bin.is_full() {
                marked.push(bin.id());
            }
        }

        for bin in self.open.remove_marked(&marked) {
            self.close(bin)?;
        }

        if let Some(item) = pending {
            self.open_new_bin(item)?;
        }

        self.items += 1;
        self.total_bytes = self.total_bytes.saturating_add(size);
        if let Some(progress) = self.progress.as_mut() {
            progress.tick(self.open.len());
        }
        Ok(())
    }

    /// Place every item of `items`, then close all remaining bins.
    ///
    /// Stops at the first input error without writing the bins still open.
    pub fn run<I>(mut self, items: I) -> Result<PartitionOutcome, PartitionError>
    where
        I: IntoIterator<Item = Result<Item, InputError>>,
    {
        let span = info_span!(
            "partition",
            max_size = self.config.max_size,
            max_count = self.config.max_count
        );
        let _guard = span.enter();

        for item in items {
            let item = item.map_err(|e| {
                error!(error = %e, "Malformed input, aborting");
                PartitionError::from(e)
            })?;
            self.push(item)?;
        }
        self.finish()
    }

    /// Close every open bin and return the run totals.
    pub fn finish(mut self) -> Result<PartitionOutcome, PartitionError> {
        for bin in self.open.drain() {
            self.close(bin)?;
        }
        let outcome = PartitionOutcome {
            items: self.items,
            total_bytes: self.total_bytes,
            bins_written: self.stats.bin_count(),
            elapsed: self.started.elapsed(),
            stats: self.stats,
        };
        info!(
            items = outcome.items,
            total_bytes = outcome.total_bytes,
            bins = outcome.bins_written,
            elapsed_secs = outcome.elapsed.as_secs_f64(),
            "Partitioning complete"
        );
        Ok(outcome)
    }

    fn open_new_bin(&mut self, item: Item) -> Result<(), PartitionError> {
        let mut bin = Bin::new(&self.config);
        if let Err(item) = bin.insert(item) {
            error!(
                path = item.path(),
                size = item.size(),
                max_size = self.config.max_size,
                "Item rejected by an empty bin"
            );
            return Err(PartitionError::Unplaceable {
                path: item.path().to_owned(),
                size: item.size(),
                max_size: self.config.max_size,
            });
        }
        debug!(
            bin = %bin.id(),
            oversized = bin.is_oversized(),
            open_bins = self.open.len() + 1,
            "New bin"
        );
        // A first item can already reach the soft threshold or pin the bin
        // as oversized; such a bin never joins the open set.
        if bin.is_full() {
            return self.close(bin);
        }
        self.open.insert(bin);
        Ok(())
    }

    fn close(&mut self, bin: Bin) -> Result<(), PartitionError> {
        let path = self.writer.write_bin(&bin).map_err(|source| {
            error!(bin = %bin.id(), error = %source, "Failed to write bin");
            PartitionError::Write {
                bin: bin.id(),
                source,
            }
        })?;
        debug!(
            bin = %bin.id(),
            items = bin.len(),
            size = bin.cumulative_size(),
            path = %path.display(),
            "Closed bin"
        );
        self.stats.record(&bin);
        Ok(())
    }
}

/// Partition `items` with a fresh [`Partitioner`].
pub fn partition<I, W>(
    items: I,
    config: BinConfig,
    writer: W,
) -> Result<PartitionOutcome, PartitionError>
where
    I: IntoIterator<Item = Result<Item, InputError>>,
    W: BinWriter,
{
    Partitioner::new(config, writer)?.run(items)
}
