use crate::domain::model::{MathRow, RowKind, SplitBreakdown, SplitReport};
use crate::utils::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Formats one cell of the audit table: proportions as percentages, the
/// rest as currency.
pub fn format_cell(kind: RowKind, value: f64) -> String {
    match kind {
        RowKind::Proportion => format!("{:.2}%", value * 100.0),
        _ => format!("{:.2}", value),
    }
}

fn row_record(row: &MathRow) -> Vec<String> {
    let mut record = Vec::with_capacity(row.values.len() + 2);
    record.push(row.label.clone());
    record.push(format_cell(row.kind, row.total));
    record.extend(row.values.iter().map(|v| format_cell(row.kind, *v)));
    record
}

/// Writes the audit table as delimited text: `row,total,<names...>`.
pub fn math_table_csv(breakdown: &SplitBreakdown, delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    let mut header = vec!["row", "total"];
    header.extend(breakdown.participant_names());
    writer.write_record(&header)?;

    for row in &breakdown.math {
        writer.write_record(row_record(row))?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    bill: &'a crate::domain::model::BillState,
    notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    split: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    math: Option<&'a [MathRow]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// The whole report as pretty JSON: the bill, advisory notes, and either the
/// split with its audit table or the validation message.
pub fn split_json(report: &SplitReport) -> Result<String> {
    let (split, math, error) = match &report.outcome {
        Ok(breakdown) => (
            Some(breakdown.output_map()),
            Some(breakdown.math.as_slice()),
            None,
        ),
        Err(e) => (None, None, Some(e.to_string())),
    };

    let document = ReportDocument {
        bill: &report.state,
        notes: report.notes.iter().map(ToString::to_string).collect(),
        split,
        math,
        error,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
