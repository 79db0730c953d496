//! Chart series construction.
//!
//! Projects ranked KU statistics into index-aligned label and value
//! sequences with the static dual-axis layout attached.

use crate::models::{ChartSeries, DualAxisLayout, KuId, KuStatMap};

/// Build aligned file and author series in the given label order.
///
/// Identifiers in `order` with no entry in `stats` are left out, so the
/// three sequences always have the same length.
pub fn build_series(stats: &KuStatMap, order: &[KuId]) -> ChartSeries {
    let mut labels = Vec::with_capacity(order.len());
    let mut file_series = Vec::with_capacity(order.len());
    let mut author_series = Vec::with_capacity(order.len());

    for ku in order {
        let Some(stat) = stats.get(ku) else {
            continue;
        };
        labels.push(ku.clone());
        file_series.push(stat.file_count);
        author_series.push(stat.author_count());
    }

    ChartSeries {
        labels,
        file_series,
        author_series,
        layout: DualAxisLayout::default(),
    }
}
