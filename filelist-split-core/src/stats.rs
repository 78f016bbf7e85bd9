//! Aggregate statistics over finalised bins.
//!
//! The collector keeps one small record per bin (size, length, capacity),
//! never the items themselves, so memory stays proportional to the number of
//! bins written rather than the size of the input.

use serde::Serialize;

use crate::bins::Bin;
use crate::error::StatsError;

/// Smallest and largest value of an integer series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Extremes {
    pub min: u64,
    pub max: u64,
}

/// Summary of a numeric series. Deviation and variance are population
/// statistics (divided by N).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub pstdev: f64,
    pub pvariance: f64,
}

impl Distribution {
    /// Returns `None` for an empty series.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };
        let pvariance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            median,
            pstdev: pvariance.sqrt(),
            pvariance,
        })
    }
}

/// Statistics over every bin written in a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinStats {
    pub bin_count: usize,
    /// Cumulative size of the bins, in bytes.
    pub sizes: Extremes,
    /// `cumulative_size / max_size * 100` per bin.
    pub percent_full: Distribution,
    /// Item count per bin.
    pub lengths: Distribution,
    /// Bins holding exactly one item.
    pub singleton_bins: usize,
}

#[derive(Debug, Clone, Copy)]
struct BinRecord {
    size: u64,
    len: usize,
    max_size: u64,
}

#[derive(Debug, Default)]
pub struct StatsCollector {
    records: Vec<BinRecord>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, bin: &Bin) {
        self.records.push(BinRecord {
            size: bin.cumulative_size(),
            len: bin.len(),
            max_size: bin.max_size(),
        });
    }

    pub fn bin_count(&self) -> usize {
        self.records.len()
    }

    pub fn summarize(&self) -> Result<BinStats, StatsError> {
        let sizes: Vec<u64> = self.records.iter().map(|r| r.size).collect();
        let (Some(&min), Some(&max)) = (sizes.iter().min(), sizes.iter().max()) else {
            return Err(StatsError::InsufficientData);
        };

        let percents: Vec<f64> = self
            .records
            .iter()
            .map(|r| r.size as f64 / r.max_size as f64 * 100.0)
            .collect();
        let lengths: Vec<f64> = self.records.iter().map(|r| r.len as f64).collect();

        let percent_full =
            Distribution::from_values(&percents).ok_or(StatsError::InsufficientData)?;
        let lengths_dist =
            Distribution::from_values(&lengths).ok_or(StatsError::InsufficientData)?;

        Ok(BinStats {
            bin_count: self.records.len(),
            sizes: Extremes { min, max },
            percent_full,
            lengths: lengths_dist,
            singleton_bins: self.records.iter().filter(|r| r.len == 1).count(),
        })
    }
}
