//! KU aggregation.
//!
//! Folds analysis records into per-KU statistics: summed file counts and
//! the set of authors that marked each KU.

use crate::models::{AnalysisRecord, KuStatMap};
use tracing::{debug, warn};

/// Owns the intermediate map while records are folded in.
#[derive(Debug, Default)]
pub struct Aggregator {
    stats: KuStatMap,
    skipped: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the running statistics.
    pub fn fold(&mut self, record: &AnalysisRecord) {
        for (ku, value) in &record.kus {
            let Some(count) = value.count() else {
                debug!(
                    "Skipping non-numeric value {:?} for KU {} (author {:?})",
                    value, ku, record.author
                );
                self.skipped += 1;
                continue;
            };

            let stat = self.stats.entry(ku.clone()).or_default();
            stat.file_count = stat.file_count.saturating_add(count);

            if value.marks_author() && !record.author.is_empty() {
                stat.authors.insert(record.author.clone());
            }
        }
    }

    /// Number of KU values ignored so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Hand back the finished statistics.
    pub fn finish(self) -> KuStatMap {
        if self.skipped > 0 {
            warn!("Ignored {} non-numeric KU values", self.skipped);
        }
        debug!("Aggregated {} KUs", self.stats.len());
        self.stats
    }
}

/// Aggregate a batch of records into per-KU statistics.
#[allow(dead_code)] // Convenience over `Aggregator` when the skip count is not needed
pub fn aggregate(records: &[AnalysisRecord]) -> KuStatMap {
    let mut aggregator = Aggregator::new();
    for record in records {
        aggregator.fold(record);
    }
    aggregator.finish()
}
