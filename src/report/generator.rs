//! Report generation.
//!
//! This module renders a KU report as Markdown, as JSON, or as the
//! Chart.js bar chart configuration consumed by the dashboard.

use crate::config::ReportConfig;
use crate::models::{AxisSpec, ChartSeries, DatasetStyle, KuReport, KuStatRow, ReportMetadata};
use anyhow::Result;
use serde_json::{json, Value};

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &KuReport, config: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str("# Organization Skills Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(report));
    output.push_str(&generate_table_section(&report.stats, config));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Records Processed:** {}\n",
        metadata.records_processed
    ));
    section.push_str(&format!("- **KUs Detected:** {}\n", metadata.kus_detected));
    if metadata.skipped_values > 0 {
        section.push_str(&format!(
            "- **Ignored Values:** {}\n",
            metadata.skipped_values
        ));
    }
    section.push_str(&format!(
        "- **Duration:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(report: &KuReport) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");

    if report.stats.is_empty() {
        section.push_str("No knowledge units were detected.\n\n");
        return section;
    }

    let total_files: u64 = report.stats.iter().map(|row| row.file_count).sum();
    section.push_str(&format!(
        "- **Knowledge Units:** {}\n- **Total Files:** {}\n",
        report.stats.len(),
        total_files
    ));

    if let Some(row) = report.most_files() {
        section.push_str(&format!(
            "- **Most Files:** {} ({} files)\n",
            row.ku, row.file_count
        ));
    }
    if let Some(row) = report.most_authors() {
        section.push_str(&format!(
            "- **Most Authors:** {} ({} authors)\n",
            row.ku, row.author_count
        ));
    }
    section.push('\n');

    section
}

/// Generate the per-KU table.
fn generate_table_section(rows: &[KuStatRow], config: &ReportConfig) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Knowledge Units\n\n");
    if config.include_authors {
        section.push_str("| KU | Files | Authors | Names |\n");
        section.push_str("|:---|:---:|:---:|:---|\n");
    } else {
        section.push_str("| KU | Files | Authors |\n");
        section.push_str("|:---|:---:|:---:|\n");
    }

    for row in rows {
        if config.include_authors {
            section.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.ku,
                row.file_count,
                row.author_count,
                author_list(&row.authors, config.max_authors_listed)
            ));
        } else {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                row.ku, row.file_count, row.author_count
            ));
        }
    }
    section.push('\n');

    section
}

fn author_list(authors: &[String], max: usize) -> String {
    if authors.len() <= max {
        return authors.join(", ");
    }

    format!(
        "{} (+{} more)",
        authors[..max].join(", "),
        authors.len() - max
    )
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by KuScope*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &KuReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Build the Chart.js bar chart configuration for a series.
pub fn chartjs_config(series: &ChartSeries) -> Value {
    let layout = &series.layout;

    let mut scales = serde_json::Map::new();
    scales.insert(layout.files_axis.id.to_string(), scale(&layout.files_axis));
    scales.insert(
        layout.authors_axis.id.to_string(),
        scale(&layout.authors_axis),
    );

    json!({
        "labels": series.labels,
        "datasets": [
            dataset(&layout.files_dataset, &layout.files_axis, json!(series.file_series)),
            dataset(&layout.authors_dataset, &layout.authors_axis, json!(series.author_series)),
        ],
        "options": {
            "responsive": true,
            "layout": {
                "padding": { "right": layout.padding_right }
            },
            "plugins": {
                "legend": { "position": layout.legend_position }
            },
            "scales": scales,
        }
    })
}

fn dataset(style: &DatasetStyle, axis: &AxisSpec, data: Value) -> Value {
    json!({
        "label": style.label,
        "data": data,
        "backgroundColor": style.background_color,
        "borderColor": style.border_color,
        "borderWidth": style.border_width,
        "yAxisID": axis.id,
    })
}

fn scale(axis: &AxisSpec) -> Value {
    let mut scale = json!({
        "type": "linear",
        "position": axis.position,
        "title": { "display": true, "text": axis.title },
    });

    if axis.offset {
        scale["offset"] = json!(true);
    }
    if !axis.draw_grid {
        scale["grid"] = json!({ "drawOnChartArea": false });
    }

    scale
}

/// Generate the Chart.js configuration as pretty JSON.
pub fn generate_chartjs_report(report: &KuReport) -> Result<String> {
    serde_json::to_string_pretty(&chartjs_config(&report.series)).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::run_pipeline;
    use crate::models::AnalysisRecord;
    use chrono::Utc;

    fn create_test_report() -> KuReport {
        let records: Vec<AnalysisRecord> = serde_json::from_value(json!([
            {"author": "a", "kus": {"K1": 1, "K2": 2}},
            {"author": "b", "kus": {"K1": 1}},
            {"author": "a", "kus": {"K2": 1}}
        ]))
        .unwrap();
        let output = run_pipeline(&records);

        let metadata = ReportMetadata {
            source: "http://localhost:5000/detected_kus".to_string(),
            generated_at: Utc::now(),
            records_processed: 3,
            kus_detected: output.stats.len(),
            skipped_values: 1,
            duration_seconds: 0.25,
        };

        KuReport::new(metadata, &output.stats, output.series)
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, &ReportConfig::default());

        assert!(markdown.contains("# Organization Skills Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("Ignored Values:** 1"));
        assert!(markdown.contains("| K1 | 2 | 2 |"));
        assert!(markdown.contains("| K2 | 3 | 1 |"));
        assert!(markdown.contains("**Most Files:** K2 (3 files)"));
        assert!(markdown.contains("**Most Authors:** K1 (2 authors)"));
        assert!(markdown.find("| K1 ").unwrap() < markdown.find("| K2 ").unwrap());
    }

    #[test]
    fn test_markdown_with_authors() {
        let report = create_test_report();
        let config = ReportConfig {
            include_authors: true,
            max_authors_listed: 1,
        };
        let markdown = generate_markdown_report(&report, &config);

        assert!(markdown.contains("| KU | Files | Authors | Names |"));
        assert!(markdown.contains("| K1 | 2 | 2 | a (+1 more) |"));
        assert!(markdown.contains("| K2 | 3 | 1 | a |"));
    }

    #[test]
    fn test_markdown_empty_report() {
        let metadata = ReportMetadata {
            source: "empty.json".to_string(),
            generated_at: Utc::now(),
            records_processed: 0,
            kus_detected: 0,
            skipped_values: 0,
            duration_seconds: 0.0,
        };
        let output = run_pipeline(&[]);
        let report = KuReport::new(metadata, &output.stats, output.series);

        let markdown = generate_markdown_report(&report, &ReportConfig::default());
        assert!(markdown.contains("No knowledge units were detected."));
        assert!(!markdown.contains("## Knowledge Units"));
    }

    #[test]
    fn test_chartjs_config_shape() {
        let report = create_test_report();
        let config = chartjs_config(&report.series);

        assert_eq!(config["labels"], json!(["K1", "K2"]));
        assert_eq!(config["datasets"][0]["label"], "Number of Files");
        assert_eq!(config["datasets"][0]["data"], json!([2, 3]));
        assert_eq!(config["datasets"][0]["yAxisID"], "y");
        assert_eq!(config["datasets"][1]["label"], "Number of Authors");
        assert_eq!(config["datasets"][1]["data"], json!([2, 1]));
        assert_eq!(config["datasets"][1]["yAxisID"], "y1");

        let scales = &config["options"]["scales"];
        assert_eq!(scales["y"]["position"], "left");
        assert_eq!(scales["y"]["title"]["text"], "Number of Files");
        assert!(scales["y"].get("grid").is_none());
        assert_eq!(scales["y1"]["position"], "right");
        assert_eq!(scales["y1"]["offset"], true);
        assert_eq!(scales["y1"]["grid"]["drawOnChartArea"], false);
        assert_eq!(config["options"]["plugins"]["legend"]["position"], "top");
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"file_series\""));
        assert!(json.contains("\"author_series\""));
        assert!(json.contains("\"kus_detected\": 2"));
    }
}
