//! Data models for knowledge-unit aggregation.
//!
//! This module contains the records received from the analysis service,
//! the per-KU statistics derived from them, and the chart-ready series
//! handed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Title of the left axis and its dataset.
pub const FILES_AXIS_TITLE: &str = "Number of Files";

/// Title of the right axis and its dataset.
pub const AUTHORS_AXIS_TITLE: &str = "Number of Authors";

/// Identifier of a knowledge unit, e.g. `K3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KuId(String);

impl KuId {
    /// The raw identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer suffix following the one-character prefix.
    ///
    /// Returns `None` when the suffix is empty, contains anything but ASCII
    /// digits, or does not fit in a `u64`.
    pub fn ordinal(&self) -> Option<u64> {
        let mut chars = self.0.chars();
        chars.next()?;
        let suffix = chars.as_str();

        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        suffix.parse().ok()
    }
}

impl fmt::Display for KuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KuId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for KuId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A KU presence value, classified once when the record is decoded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum KuValue {
    /// A non-negative integral number.
    Count(u64),
    /// Anything else the service sent; ignored by aggregation.
    Malformed(Value),
}

impl KuValue {
    /// Returns the count, or `None` for malformed values.
    pub fn count(&self) -> Option<u64> {
        match self {
            KuValue::Count(n) => Some(*n),
            KuValue::Malformed(_) => None,
        }
    }

    /// Whether this value marks the author as having touched the KU.
    pub fn marks_author(&self) -> bool {
        matches!(self, KuValue::Count(1))
    }
}

impl From<Value> for KuValue {
    fn from(value: Value) -> Self {
        if let Some(n) = value.as_u64() {
            return KuValue::Count(n);
        }

        // Integral floats such as `2.0` are still counts.
        match value.as_f64() {
            Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
                KuValue::Count(f as u64)
            }
            _ => KuValue::Malformed(value),
        }
    }
}

/// One author's KU presence data for a unit of analysis.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisRecord {
    /// Author identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    /// KU identifier to presence value.
    #[serde(default, deserialize_with = "null_as_default")]
    pub kus: HashMap<KuId, KuValue>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Aggregated statistics for a single KU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KuStat {
    /// Sum of all counts recorded for this KU.
    pub file_count: u64,
    /// Authors that recorded a value of exactly `1`.
    pub authors: BTreeSet<String>,
}

impl KuStat {
    /// Number of distinct authors.
    pub fn author_count(&self) -> usize {
        self.authors.len()
    }
}

/// Aggregation result keyed by KU identifier.
pub type KuStatMap = HashMap<KuId, KuStat>;

/// Side of the chart an axis is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Left,
    Right,
}

/// A linear value axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSpec {
    /// Axis identifier datasets bind to.
    pub id: &'static str,
    pub position: AxisPosition,
    pub title: &'static str,
    /// Draw the axis outside the chart area.
    pub offset: bool,
    /// Draw gridlines across the chart area.
    pub draw_grid: bool,
}

/// Colours and label of one bar dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStyle {
    pub label: &'static str,
    pub background_color: &'static str,
    pub border_color: &'static str,
    pub border_width: u32,
}

/// Static dual-axis presentation: files on the left, authors on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DualAxisLayout {
    pub files_axis: AxisSpec,
    pub authors_axis: AxisSpec,
    pub files_dataset: DatasetStyle,
    pub authors_dataset: DatasetStyle,
    pub legend_position: &'static str,
    pub padding_right: u32,
}

impl Default for DualAxisLayout {
    fn default() -> Self {
        Self {
            files_axis: AxisSpec {
                id: "y",
                position: AxisPosition::Left,
                title: FILES_AXIS_TITLE,
                offset: false,
                draw_grid: true,
            },
            authors_axis: AxisSpec {
                id: "y1",
                position: AxisPosition::Right,
                title: AUTHORS_AXIS_TITLE,
                offset: true,
                draw_grid: false,
            },
            files_dataset: DatasetStyle {
                label: FILES_AXIS_TITLE,
                background_color: "rgba(75, 192, 192, 0.2)",
                border_color: "rgba(75, 192, 192, 1)",
                border_width: 1,
            },
            authors_dataset: DatasetStyle {
                label: AUTHORS_AXIS_TITLE,
                background_color: "rgba(255, 99, 132, 0.2)",
                border_color: "rgba(255, 99, 132, 1)",
                border_width: 1,
            },
            legend_position: "top",
            padding_right: 150,
        }
    }
}

/// Index-aligned label and value sequences for a dual-axis bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// Ranked KU identifiers.
    pub labels: Vec<KuId>,
    /// `file_series[i]` is the file count of `labels[i]`.
    pub file_series: Vec<u64>,
    /// `author_series[i]` is the author count of `labels[i]`.
    pub author_series: Vec<usize>,
    pub layout: DualAxisLayout,
}

impl ChartSeries {
    /// Number of KUs charted.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// One table row of the report.
#[derive(Debug, Clone, Serialize)]
pub struct KuStatRow {
    pub ku: KuId,
    pub file_count: u64,
    pub author_count: usize,
    pub authors: Vec<String>,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Service URL or file the records came from.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of records folded.
    pub records_processed: usize,
    /// Number of distinct KUs observed.
    pub kus_detected: usize,
    /// Number of KU values ignored as malformed.
    pub skipped_values: usize,
    /// Time spent fetching and aggregating, in seconds.
    pub duration_seconds: f64,
}

/// The complete KU report.
#[derive(Debug, Clone, Serialize)]
pub struct KuReport {
    pub metadata: ReportMetadata,
    /// Rows in ranked order.
    pub stats: Vec<KuStatRow>,
    pub series: ChartSeries,
}

impl KuReport {
    /// Build a report whose rows follow the series label order.
    pub fn new(metadata: ReportMetadata, stats: &KuStatMap, series: ChartSeries) -> Self {
        let rows = series
            .labels
            .iter()
            .filter_map(|ku| {
                stats.get(ku).map(|stat| KuStatRow {
                    ku: ku.clone(),
                    file_count: stat.file_count,
                    author_count: stat.author_count(),
                    authors: stat.authors.iter().cloned().collect(),
                })
            })
            .collect();

        Self {
            metadata,
            stats: rows,
            series,
        }
    }

    /// KU with the highest file count (earliest ranked wins ties).
    pub fn most_files(&self) -> Option<&KuStatRow> {
        self.stats.iter().rev().max_by_key(|row| row.file_count)
    }

    /// KU with the most distinct authors (earliest ranked wins ties).
    pub fn most_authors(&self) -> Option<&KuStatRow> {
        self.stats.iter().rev().max_by_key(|row| row.author_count)
    }
}
