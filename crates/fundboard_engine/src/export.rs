use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::persist::{atomic_write, PersistError};

/// Canonical export column order, matching the master results file the
/// pipeline maintains.
pub const CSV_COLUMNS: [&str; 16] = [
    "fund_url",
    "fund_name",
    "applicant_types",
    "geographic_scope",
    "beneficiary_focus",
    "funding_range",
    "restrictions",
    "application_status",
    "deadline",
    "notes",
    "eligibility",
    "evidence",
    "pages_scraped",
    "visited_urls_count",
    "extraction_timestamp",
    "error",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub row_count: usize,
    pub output_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Write the given records (already filtered and ordered by the caller) to
/// `{dir}/{filename}` as CSV in the canonical column order. Absent fields
/// become empty cells; the write is atomic.
pub fn write_results_csv(
    dir: &Path,
    filename: &str,
    records: &[Value],
) -> Result<ExportSummary, ExportError> {
    let mut buffer = String::new();
    buffer.push_str(&CSV_COLUMNS.join(","));
    buffer.push('\n');

    for record in records {
        let mut first = true;
        for column in CSV_COLUMNS {
            if !first {
                buffer.push(',');
            }
            first = false;
            buffer.push_str(&escape_cell(&cell_text(record.get(column))));
        }
        buffer.push('\n');
    }

    let output_path = atomic_write(dir, filename, &buffer)?;
    Ok(ExportSummary {
        row_count: records.len(),
        output_path,
    })
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => {
            if let Some(whole) = number.as_i64() {
                whole.to_string()
            } else {
                match number.as_f64() {
                    // JSON floats that are really counts print as integers.
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
                        format!("{}", f as i64)
                    }
                    _ => number.to_string(),
                }
            }
        }
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
    }
}

fn escape_cell(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
