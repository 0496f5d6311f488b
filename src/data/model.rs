use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::schema::Schema;

// ---------------------------------------------------------------------------
// Value – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    /// Absent or unparseable cell; excluded from sums and means.
    Missing,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Missing => 0,
                Int(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Missing, Missing) => std::cmp::Ordering::Equal,
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Missing => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Missing => write!(f, "<missing>"),
        }
    }
}

impl Value {
    /// Try to interpret the value as an `f64` for metric aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// A single record (one row of the source table), keyed by normalized
/// column name. A column absent from the map reads as [`Value::Missing`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn get(&self, column: &str) -> &Value {
        self.fields.get(column).unwrap_or(&Value::Missing)
    }

    /// Numeric view of a cell; `None` for missing or non-numeric values.
    pub fn metric(&self, column: &str) -> Option<f64> {
        self.get(column).as_f64()
    }

    /// Grouping-key view of a cell; `None` when the cell is missing, so
    /// rows without a key drop out of the aggregation that needs it.
    pub fn key(&self, column: &str) -> Option<String> {
        let val = self.get(column);
        if val.is_missing() {
            None
        } else {
            Some(val.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with its resolved schema and, for each filter
/// dimension column, the sorted set of unique values (feeds the filter UI).
#[derive(Debug, Clone)]
pub struct Table {
    /// All records (rows).
    pub rows: Vec<Record>,
    /// Ordered list of normalized column names.
    pub column_names: Vec<String>,
    /// Well-known roles resolved against `column_names`, computed once.
    pub schema: Schema,
    /// Unique values of the dimension columns, sorted.
    pub unique_values: BTreeMap<String, BTreeSet<String>>,
}

impl Table {
    /// Resolve the schema and build dimension indices from loaded records.
    pub fn from_rows(column_names: Vec<String>, rows: Vec<Record>) -> Self {
        let schema = Schema::detect(&column_names);

        let mut unique_values: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for col in schema.dimension_columns() {
            let values = unique_values.entry(col.to_string()).or_default();
            for row in &rows {
                if let Some(key) = row.key(&col) {
                    values.insert(key);
                }
            }
        }

        Table {
            rows,
            column_names,
            schema,
            unique_values,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, Value)]) -> Record {
        Record {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn absent_column_reads_as_missing() {
        let r = record(&[("origin", Value::Text("Delhi".into()))]);
        assert!(r.get("destination").is_missing());
        assert_eq!(r.metric("costs"), None);
        assert_eq!(r.key("destination"), None);
    }

    #[test]
    fn metric_accepts_int_and_float() {
        let r = record(&[("costs", Value::Int(10)), ("lead_time", Value::Float(2.5))]);
        assert_eq!(r.metric("costs"), Some(10.0));
        assert_eq!(r.metric("lead_time"), Some(2.5));
    }

    #[test]
    fn unique_values_index_covers_dimension_columns() {
        let rows = vec![
            record(&[
                ("supplier_name", Value::Text("A".into())),
                ("origin", Value::Text("X".into())),
            ]),
            record(&[
                ("supplier_name", Value::Text("B".into())),
                ("origin", Value::Text("X".into())),
            ]),
        ];
        let table = Table::from_rows(vec!["supplier_name".into(), "origin".into()], rows);
        assert_eq!(table.unique_values.get("supplier_name").unwrap().len(), 2);
        assert_eq!(table.unique_values.get("origin").unwrap().len(), 1);
    }
}
