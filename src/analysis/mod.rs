//! KU aggregation pipeline.
//!
//! Records are folded into per-KU statistics, the KU identifiers are
//! ranked, and the result is projected into chart series.

pub mod aggregator;
pub mod ranker;
pub mod series;

pub use aggregator::*;
pub use ranker::*;
pub use series::*;

use crate::models::{AnalysisRecord, ChartSeries, KuStatMap};
use tracing::debug;

/// Everything produced by one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub stats: KuStatMap,
    pub series: ChartSeries,
    /// KU values ignored as malformed.
    pub skipped: usize,
}

/// Aggregate, rank and project a batch of records.
pub fn run_pipeline(records: &[AnalysisRecord]) -> PipelineOutput {
    let mut aggregator = Aggregator::new();
    for record in records {
        aggregator.fold(record);
    }
    let skipped = aggregator.skipped();
    let stats = aggregator.finish();

    let order = rank(stats.keys());
    debug!("Ranked KUs: {:?}", order);

    let series = build_series(&stats, &order);

    PipelineOutput {
        stats,
        series,
        skipped,
    }
}
