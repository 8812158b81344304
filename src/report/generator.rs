//! Table rendering for the console.
//!
//! This module renders the parsed record table as aligned text, Markdown
//! or JSON, followed by the per-degree convergence summary.

use crate::analysis::summarize;
use crate::cli::OutputFormat;
use crate::models::{format_error, DegreeSummary, Record, TableExport, COLUMNS};
use anyhow::Result;
use chrono::Utc;

/// Render the table in the requested format.
pub fn render_table(records: &[Record], format: OutputFormat) -> Result<String> {
    let summaries = summarize(records);

    let output = match format {
        OutputFormat::Text => {
            let mut output = generate_text_table(records);
            output.push_str(&generate_summary_text(&summaries));
            output
        }
        OutputFormat::Markdown => generate_markdown_report(records, &summaries),
        OutputFormat::Json => generate_json_report(records, summaries)?,
    };

    Ok(output)
}

/// Aligned columns with a leading row index, like a data-frame print.
pub fn generate_text_table(records: &[Record]) -> String {
    if records.is_empty() {
        return "Empty table: no problem blocks found\n".to_string();
    }

    let rows: Vec<[String; 7]> = records.iter().map(Record::cells).collect();

    let index_width = (records.len() - 1).to_string().len();
    let widths: Vec<usize> = COLUMNS
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();

    output.push_str(&" ".repeat(index_width));
    for (header, width) in COLUMNS.iter().zip(&widths) {
        output.push_str(&format!("  {:>width$}", header, width = width));
    }
    output.push('\n');

    for (i, row) in rows.iter().enumerate() {
        output.push_str(&format!("{:<width$}", i, width = index_width));
        for (cell, width) in row.iter().zip(&widths) {
            output.push_str(&format!("  {:>width$}", cell, width = width));
        }
        output.push('\n');
    }

    output
}

/// Per-degree summary lines; empty when there are no groups.
pub fn generate_summary_text(summaries: &[DegreeSummary]) -> String {
    if summaries.is_empty() {
        return String::new();
    }

    let mut lines = vec![String::new(), "Observed convergence by degree:".to_string()];

    for summary in summaries {
        lines.push(format!(
            "  deg: {}  runs: {}  error: {} .. {}  rate: {}",
            summary.degree,
            summary.runs,
            format_error(summary.min_error),
            format_error(summary.max_error),
            format_rate(summary.final_rate()),
        ));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.2}", rate),
        None => "n/a".to_string(),
    }
}

/// Markdown table plus summary table.
pub fn generate_markdown_report(records: &[Record], summaries: &[DegreeSummary]) -> String {
    let mut output = String::new();

    output.push_str("## Runs\n\n");

    if records.is_empty() {
        output.push_str("No problem blocks were found in the input.\n");
        return output;
    }

    output.push_str(&format!("| {} |\n", COLUMNS.join(" | ")));
    output.push_str("|:---|");
    output.push_str(&"---:|".repeat(COLUMNS.len() - 1));
    output.push('\n');

    for record in records {
        output.push_str(&format!("| {} |\n", record.cells().join(" | ")));
    }
    output.push('\n');

    output.push_str("## Observed Convergence\n\n");
    output.push_str("| Degree | Runs | Min Error | Max Error | Rate |\n");
    output.push_str("|:---:|:---:|---:|---:|---:|\n");
    for summary in summaries {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            summary.degree,
            summary.runs,
            format_error(summary.min_error),
            format_error(summary.max_error),
            format_rate(summary.final_rate()),
        ));
    }

    output
}

/// Generate a JSON report.
pub fn generate_json_report(records: &[Record], summaries: Vec<DegreeSummary>) -> Result<String> {
    let export = TableExport {
        generated_at: Utc::now(),
        records: records.to_vec(),
        summaries,
    };

    let mut json = serde_json::to_string_pretty(&export)?;
    json.push('\n');
    Ok(json)
}
