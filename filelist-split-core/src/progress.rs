use std::time::Instant;

use tracing::info;

/// Default number of records between two progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100_000;

/// Periodic throughput report for long runs.
///
/// Observation only: it never influences placement.
#[derive(Debug)]
pub struct Progress {
    interval: u64,
    total: Option<u64>,
    lines: u64,
    started: Instant,
}

impl Progress {
    /// `total` is the number of records in the input, when known, and enables
    /// the time-remaining estimate. An `interval` of 0 disables reporting.
    pub fn new(interval: u64, total: Option<u64>) -> Self {
        Self {
            interval,
            total,
            lines: 0,
            started: Instant::now(),
        }
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Count one processed record and report if an interval boundary was hit.
    pub fn tick(&mut self, active_bins: usize) {
        self.lines += 1;
        if self.interval == 0 || self.lines % self.interval != 0 {
            return;
        }
        let elapsed = self.started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            self.lines as f64 / elapsed
        } else {
            0.0
        };
        match self.eta_secs(rate) {
            Some(eta) => info!(
                lines = self.lines,
                active_bins,
                elapsed_secs = format_args!("{elapsed:.0}"),
                rate = format_args!("{rate:.0}"),
                eta_secs = format_args!("{eta:.1}"),
                "Progress"
            ),
            None => info!(
                lines = self.lines,
                active_bins,
                elapsed_secs = format_args!("{elapsed:.0}"),
                rate = format_args!("{rate:.0}"),
                "Progress"
            ),
        }
    }

    fn eta_secs(&self, rate: f64) -> Option<f64> {
        let total = self.total?;
        if rate <= 0.0 {
            return None;
        }
        Some(total.saturating_sub(self.lines) as f64 / rate)
    }
}
