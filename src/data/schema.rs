use super::model::Value;

// ---------------------------------------------------------------------------
// Well-known column names (normalized form)
// ---------------------------------------------------------------------------

pub const ORIGIN: &str = "origin";
pub const DESTINATION: &str = "destination";
pub const PRODUCT_TYPE: &str = "product_type";
pub const REVENUE: &str = "revenue_generated";
pub const COSTS: &str = "costs";
pub const PRODUCTION_VOLUMES: &str = "production_volumes";
pub const LEAD_TIME: &str = "lead_time";
pub const PRODUCTS_SOLD: &str = "number_of_products_sold";

/// Columns coerced to numeric at load time.
pub const METRIC_COLUMNS: [&str; 5] = [
    REVENUE,
    COSTS,
    PRODUCTION_VOLUMES,
    LEAD_TIME,
    PRODUCTS_SOLD,
];

/// Substring used to locate the supplier column, whatever its exact name
/// (`supplier`, `supplier_name`, `supplier_id`, ...).
const SUPPLIER_HINT: &str = "supplier";

// ---------------------------------------------------------------------------
// Label normalization
// ---------------------------------------------------------------------------

/// Normalize a raw header label: trim, lower-case, spaces → underscores.
///
/// `"  Revenue Generated "` → `"revenue_generated"`.
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Find the first label containing `needle` (first match wins, in header
/// order). Labels are expected to be normalized already.
pub fn detect_column<'a>(labels: &'a [String], needle: &str) -> Option<&'a str> {
    labels
        .iter()
        .find(|l| l.contains(needle))
        .map(String::as_str)
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Coerce a metric cell to numeric; unparseable cells become `Missing`
/// (the Pandas `to_numeric(errors='coerce')` contract).
pub fn coerce_metric(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(v) => Value::Float(v),
        Err(_) => Value::Missing,
    }
}

/// Guess the type of a non-metric cell.
pub fn guess_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Missing;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Text(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Schema – well-known roles resolved against the actual header
// ---------------------------------------------------------------------------

/// The once-per-load resolution of dashboard roles to actual columns.
/// Every field is optional: a missing role degrades the aggregations that
/// need it, never the whole pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Detected supplier column (substring match). `None` puts the
    /// dashboard in supplier-agnostic mode.
    pub supplier: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub product_type: Option<String>,
}

impl Schema {
    /// Resolve roles against a normalized header.
    pub fn detect(labels: &[String]) -> Self {
        let exact = |name: &str| {
            labels
                .iter()
                .find(|l| l.as_str() == name)
                .map(|l| l.to_string())
        };
        Schema {
            supplier: detect_column(labels, SUPPLIER_HINT).map(str::to_string),
            origin: exact(ORIGIN),
            destination: exact(DESTINATION),
            product_type: exact(PRODUCT_TYPE),
        }
    }

    /// The filterable dimension columns present in this dataset, in
    /// supplier / origin / destination order.
    pub fn dimension_columns(&self) -> Vec<String> {
        [&self.supplier, &self.origin, &self.destination]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}
