//! Run summary rendering, as plain text or JSON.

use anyhow::Result;
use clap::ValueEnum;
use filelist_split_core::partition::PartitionOutcome;
use filelist_split_core::stats::{BinStats, Distribution};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    #[default]
    Text,
    Json,
}

/// Human-readable report. `stats` is `None` when no bin was written.
pub fn render_text(outcome: &PartitionOutcome, stats: Option<&BinStats>) -> String {
    let mut lines = vec![
        format!("Runtime: {:2.0} secs", outcome.elapsed.as_secs_f64()),
        format!("Total number of bins: {}", outcome.bins_written),
    ];

    let Some(stats) = stats else {
        lines.push("Statistics: insufficient data (no bins written)".to_owned());
        return lines.join("\n");
    };

    lines.push("SIZES".to_owned());
    lines.push(format!("Max: {}", stats.sizes.max));
    lines.push(format!("Min: {}", stats.sizes.min));

    lines.push("PERCENT FULL STATS".to_owned());
    lines.extend(spread_lines(&stats.percent_full));

    lines.push("LENGTH STATS".to_owned());
    lines.push(format!("Max: {}", stats.lengths.max));
    lines.push(format!("Min: {}", stats.lengths.min));
    lines.extend(spread_lines(&stats.lengths));

    lines.push(format!("Num 1-length bins: {}", stats.singleton_bins));
    lines.join("\n")
}

fn spread_lines(dist: &Distribution) -> impl Iterator<Item = String> {
    [
        ("Mean", dist.mean),
        ("Median", dist.median),
        ("Pstdev", dist.pstdev),
        ("Pvariance", dist.pvariance),
    ]
    .into_iter()
    .map(|(label, value)| format!("{label}: {value:3.2}"))
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    runtime_secs: f64,
    items: u64,
    total_bytes: u64,
    bins_written: usize,
    stats: Option<&'a BinStats>,
}

pub fn render_json(outcome: &PartitionOutcome, stats: Option<&BinStats>) -> Result<String> {
    let summary = JsonSummary {
        runtime_secs: outcome.elapsed.as_secs_f64(),
        items: outcome.items,
        total_bytes: outcome.total_bytes,
        bins_written: outcome.bins_written,
        stats,
    };
    Ok(serde_json::to_string_pretty(&summary)?)
}
