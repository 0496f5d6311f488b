use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;

use super::model::{Record, Table, Value};
use super::schema::{METRIC_COLUMNS, coerce_metric, guess_value, normalize_label};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a supply-chain table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – delimited text with a header row (required)
/// * `.json` – `[{ "Supplier name": "...", "Costs": 187.75, ... }, ...]`
///
/// Header labels are normalized (trimmed, lower-cased, spaces →
/// underscores) and the metric columns are coerced to numeric; cells that
/// fail to parse become missing values rather than errors.
pub fn load_file(path: &Path) -> Result<Table> {
    let bytes = std::fs::read(path).context("reading input file")?;
    parse(&file_extension(path), &bytes)
}

/// Lower-cased extension of a path, `""` when it has none.
pub fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Parse raw bytes in the format implied by `ext`.
pub fn parse(ext: &str, bytes: &[u8]) -> Result<Table> {
    match ext {
        "csv" => parse_csv(bytes),
        "json" => parse_json(bytes),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

fn is_metric(column: &str) -> bool {
    METRIC_COLUMNS.contains(&column)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV bytes into a [`Table`]. Kept separate from the file wrapper
/// so the cache layer can parse hashed byte buffers directly.
pub fn parse_csv(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::Reader::from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV header")?
        .iter()
        .map(normalize_label)
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        bail!("CSV file has no header row");
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut fields = BTreeMap::new();
        for (col_idx, raw) in record.iter().enumerate() {
            let Some(col_name) = headers.get(col_idx) else {
                continue;
            };
            let value = if is_metric(col_name) {
                coerce_metric(raw)
            } else {
                guess_value(raw)
            };
            fields.insert(col_name.clone(), value);
        }
        rows.push(Record { fields });
    }

    Ok(Table::from_rows(headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Supplier name": "Supplier 1",
///     "Origin": "Mumbai",
///     "Costs": 187.75
///   },
///   ...
/// ]
/// ```
pub fn parse_json(bytes: &[u8]) -> Result<Table> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut column_set: BTreeSet<String> = BTreeSet::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut fields = BTreeMap::new();
        for (key, val) in obj {
            let col_name = normalize_label(key);
            let value = json_to_value(&col_name, val);
            column_set.insert(col_name.clone());
            fields.insert(col_name, value);
        }
        rows.push(Record { fields });
    }

    if rows.is_empty() && column_set.is_empty() {
        bail!("JSON file contains no records");
    }

    let column_names: Vec<String> = column_set.into_iter().collect();
    Ok(Table::from_rows(column_names, rows))
}

fn json_to_value(column: &str, val: &JsonValue) -> Value {
    if is_metric(column) {
        // Metric cells get the numeric-or-missing treatment even when the
        // JSON writer quoted them.
        return match val {
            JsonValue::Number(n) => n.as_f64().map(Value::Float).unwrap_or(Value::Missing),
            JsonValue::String(s) => coerce_metric(s),
            _ => Value::Missing,
        };
    }
    match val {
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Text(n.to_string())
            }
        }
        JsonValue::Null => Value::Missing,
        other => Value::Text(other.to_string()),
    }
}
