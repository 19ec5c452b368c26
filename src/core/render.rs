use crate::core::export::format_cell;
use crate::domain::model::{SplitBreakdown, SplitReport};

pub const ROUNDING_NOTE: &str =
    "Amounts are rounded to the cent, so the table may differ from the split by a few cents.";

pub fn render_split(breakdown: &SplitBreakdown) -> String {
    let width = breakdown
        .output
        .iter()
        .map(|share| share.name.chars().count())
        .max()
        .unwrap_or(0);

    breakdown
        .output
        .iter()
        .map(|share| format!("  {:<width$}  {:>10.2}\n", share.name, share.amount, width = width))
        .collect()
}

pub fn render_math_table(breakdown: &SplitBreakdown) -> String {
    let mut header = vec!["".to_string(), "Total".to_string()];
    header.extend(breakdown.output.iter().map(|share| share.name.clone()));

    let mut rows = vec![header];
    for row in &breakdown.math {
        let mut cells = vec![row.label.clone(), format_cell(row.kind, row.total)];
        cells.extend(row.values.iter().map(|v| format_cell(row.kind, *v)));
        rows.push(cells);
    }

    let columns = rows[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|c| rows.iter().map(|r| r[c].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(c, cell)| {
                if c == 0 {
                    format!("{:<w$}", cell, w = widths[c])
                } else {
                    format!("{:>w$}", cell, w = widths[c])
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Notes, then either the split and its audit table or the validation error.
pub fn render_report(report: &SplitReport) -> String {
    let mut out = String::new();

    for note in &report.notes {
        out.push_str(&format!("⚠️  {}\n", note));
    }

    match &report.outcome {
        Ok(breakdown) => {
            out.push_str("💰 Split:\n");
            out.push_str(&render_split(breakdown));
            out.push('\n');
            out.push_str(&render_math_table(breakdown));
            out.push_str(ROUNDING_NOTE);
            out.push('\n');
        }
        Err(e) => {
            out.push_str(&format!("❌ {}\n", e));
        }
    }
    out
}
