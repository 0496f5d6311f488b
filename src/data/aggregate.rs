use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use super::filter::{self, FilterSet};
use super::model::Table;
use super::schema::{
    COSTS, DESTINATION, LEAD_TIME, ORIGIN, PRODUCTION_VOLUMES, PRODUCTS_SOLD, PRODUCT_TYPE,
    REVENUE,
};

/// How many groups the ranked charts keep.
pub const TOP_N: usize = 5;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Recoverable per-aggregation failures. A missing column skips one
/// aggregation and surfaces a diagnostic; it never aborts the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("{aggregation}: column '{column}' is not present, chart skipped")]
    MissingColumn {
        aggregation: &'static str,
        column: String,
    },
}

// ---------------------------------------------------------------------------
// AggregationResult – a grouped, summarized derived table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRow {
    /// One entry per key column.
    pub keys: Vec<String>,
    /// One entry per value column.
    pub values: Vec<f64>,
}

/// Derived table: grouping keys plus numeric summary columns. Recomputed
/// on every filter change, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    pub key_columns: Vec<String>,
    pub value_columns: Vec<String>,
    pub rows: Vec<AggregationRow>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct values of the first key column, in row order.
    pub fn primary_keys(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut keys = Vec::new();
        for row in &self.rows {
            if let Some(k) = row.keys.first() {
                if seen.insert(k.clone()) {
                    keys.push(k.clone());
                }
            }
        }
        keys
    }
}

// ---------------------------------------------------------------------------
// Grouped accumulation
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Stat {
    Sum,
    Mean,
}

/// Group rows by `key_columns` and accumulate each `(metric, stat)` pair
/// with skip-missing semantics. Rows with a missing grouping key are
/// excluded; groups are emitted in ascending key order. A group whose mean
/// has no parseable samples is dropped (mean of nothing is "no data").
fn grouped(table: &Table, key_columns: &[&str], metrics: &[(&str, Stat)]) -> AggregationResult {
    #[derive(Default, Clone)]
    struct Acc {
        sum: f64,
        count: u64,
    }

    let mut groups: BTreeMap<Vec<String>, Vec<Acc>> = BTreeMap::new();

    'rows: for row in &table.rows {
        let mut keys = Vec::with_capacity(key_columns.len());
        for col in key_columns {
            match row.key(col) {
                Some(k) => keys.push(k),
                None => continue 'rows,
            }
        }
        let accs = groups
            .entry(keys)
            .or_insert_with(|| vec![Acc::default(); metrics.len()]);
        for (acc, (metric, _)) in accs.iter_mut().zip(metrics) {
            if let Some(v) = row.metric(metric) {
                acc.sum += v;
                acc.count += 1;
            }
        }
    }

    let rows = groups
        .into_iter()
        .filter_map(|(keys, accs)| {
            let mut values = Vec::with_capacity(metrics.len());
            for (acc, (_, stat)) in accs.iter().zip(metrics) {
                match stat {
                    Stat::Sum => values.push(acc.sum),
                    Stat::Mean => {
                        if acc.count == 0 {
                            return None;
                        }
                        values.push(acc.sum / acc.count as f64);
                    }
                }
            }
            Some(AggregationRow { keys, values })
        })
        .collect();

    AggregationResult {
        key_columns: key_columns.iter().map(|c| c.to_string()).collect(),
        value_columns: metrics.iter().map(|(m, _)| m.to_string()).collect(),
        rows,
    }
}

/// Rank groups by total descending, ties broken by ascending key, and keep
/// the first `n`. Deterministic for a fixed input.
fn top_n_keys(totals: &BTreeMap<String, f64>, n: usize) -> Vec<String> {
    let mut entries: Vec<(&String, &f64)> = totals.iter().collect();
    entries.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries.into_iter().take(n).map(|(k, _)| k.clone()).collect()
}

fn require(
    table: &Table,
    aggregation: &'static str,
    columns: &[&str],
) -> Result<(), PipelineError> {
    for col in columns {
        if !table.has_column(col) {
            return Err(PipelineError::MissingColumn {
                aggregation,
                column: col.to_string(),
            });
        }
    }
    Ok(())
}

fn require_supplier(
    table: &Table,
    aggregation: &'static str,
) -> Result<String, PipelineError> {
    table
        .schema
        .supplier
        .clone()
        .ok_or(PipelineError::MissingColumn {
            aggregation,
            column: "supplier".to_string(),
        })
}

// ---------------------------------------------------------------------------
// KPI summary
// ---------------------------------------------------------------------------

/// The four headline metrics. A `None` means "no data": either the column
/// is absent or (for the mean) no parseable values remain after filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiSummary {
    pub total_revenue: Option<f64>,
    pub total_cost: Option<f64>,
    pub total_volume: Option<f64>,
    pub avg_lead_time: Option<f64>,
}

pub fn kpi_summary(table: &Table) -> KpiSummary {
    let sum = |column: &str| -> Option<f64> {
        if !table.has_column(column) {
            return None;
        }
        Some(table.rows.iter().filter_map(|r| r.metric(column)).sum())
    };
    let mean = |column: &str| -> Option<f64> {
        if !table.has_column(column) {
            return None;
        }
        let samples: Vec<f64> = table.rows.iter().filter_map(|r| r.metric(column)).collect();
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    };

    KpiSummary {
        total_revenue: sum(REVENUE),
        total_cost: sum(COSTS),
        total_volume: sum(PRODUCTION_VOLUMES),
        avg_lead_time: mean(LEAD_TIME),
    }
}

// ---------------------------------------------------------------------------
// The five chart aggregations
// ---------------------------------------------------------------------------

/// Mean cost per (origin, destination) route.
pub fn route_cost(table: &Table) -> Result<AggregationResult, PipelineError> {
    require(table, "route cost", &[ORIGIN, DESTINATION, COSTS])?;
    Ok(grouped(
        table,
        &[ORIGIN, DESTINATION],
        &[(COSTS, Stat::Mean)],
    ))
}

/// Production volume per (supplier, product type), restricted to the five
/// suppliers with the largest total volume. Rows come out ordered by
/// supplier rank, then product type.
pub fn supplier_performance(table: &Table) -> Result<AggregationResult, PipelineError> {
    let supplier_col = require_supplier(table, "supplier performance")?;
    require(table, "supplier performance", &[PRODUCT_TYPE, PRODUCTION_VOLUMES])?;

    let breakdown = grouped(
        table,
        &[&supplier_col, PRODUCT_TYPE],
        &[(PRODUCTION_VOLUMES, Stat::Sum)],
    );

    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for row in &breakdown.rows {
        *totals.entry(row.keys[0].clone()).or_default() += row.values[0];
    }
    let ranked = top_n_keys(&totals, TOP_N);

    let mut rows = Vec::new();
    for supplier in &ranked {
        rows.extend(
            breakdown
                .rows
                .iter()
                .filter(|r| &r.keys[0] == supplier)
                .cloned(),
        );
    }

    Ok(AggregationResult {
        key_columns: breakdown.key_columns,
        value_columns: breakdown.value_columns,
        rows,
    })
}

/// Units sold per product type, top five descending.
pub fn product_demand(table: &Table) -> Result<AggregationResult, PipelineError> {
    require(table, "product demand", &[PRODUCT_TYPE, PRODUCTS_SOLD])?;

    let by_product = grouped(table, &[PRODUCT_TYPE], &[(PRODUCTS_SOLD, Stat::Sum)]);

    let totals: BTreeMap<String, f64> = by_product
        .rows
        .iter()
        .map(|r| (r.keys[0].clone(), r.values[0]))
        .collect();
    let ranked = top_n_keys(&totals, TOP_N);

    let rows = ranked
        .iter()
        .map(|product| AggregationRow {
            keys: vec![product.clone()],
            values: vec![totals[product]],
        })
        .collect();

    Ok(AggregationResult {
        key_columns: by_product.key_columns,
        value_columns: by_product.value_columns,
        rows,
    })
}

/// Production volume and revenue summed per origin.
pub fn origin_overview(table: &Table) -> Result<AggregationResult, PipelineError> {
    require(table, "origin overview", &[ORIGIN, PRODUCTION_VOLUMES, REVENUE])?;
    Ok(grouped(
        table,
        &[ORIGIN],
        &[(PRODUCTION_VOLUMES, Stat::Sum), (REVENUE, Stat::Sum)],
    ))
}

/// Revenue and cost summed per supplier.
pub fn cost_vs_revenue(table: &Table) -> Result<AggregationResult, PipelineError> {
    let supplier_col = require_supplier(table, "cost vs revenue")?;
    require(table, "cost vs revenue", &[REVENUE, COSTS])?;
    Ok(grouped(
        table,
        &[&supplier_col],
        &[(REVENUE, Stat::Sum), (COSTS, Stat::Sum)],
    ))
}

// ---------------------------------------------------------------------------
// Dashboard – one atomic recomputation
// ---------------------------------------------------------------------------

/// Everything the presentation layer consumes, produced in one unit of
/// work. A `None` chart means its aggregation was skipped for a missing
/// column; the reason lands in `diagnostics`.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub kpis: KpiSummary,
    pub route_cost: Option<AggregationResult>,
    pub supplier_performance: Option<AggregationResult>,
    pub product_demand: Option<AggregationResult>,
    pub origin_overview: Option<AggregationResult>,
    pub cost_vs_revenue: Option<AggregationResult>,
    pub diagnostics: Vec<String>,
    /// Rows remaining after the filter pass.
    pub filtered_rows: usize,
}

impl Dashboard {
    /// Filter the table and recompute every aggregation. Failures are
    /// local: a skipped chart is recorded and the rest still run.
    pub fn compute(table: &Table, filters: &FilterSet) -> Dashboard {
        let filtered = filter::apply(table, filters);

        let mut diagnostics = Vec::new();
        let mut run = |result: Result<AggregationResult, PipelineError>| match result {
            Ok(agg) => Some(agg),
            Err(e) => {
                diagnostics.push(e.to_string());
                None
            }
        };

        let route = run(route_cost(&filtered));
        let performance = run(supplier_performance(&filtered));
        let demand = run(product_demand(&filtered));
        let origins = run(origin_overview(&filtered));
        let trend = run(cost_vs_revenue(&filtered));

        Dashboard {
            kpis: kpi_summary(&filtered),
            route_cost: route,
            supplier_performance: performance,
            product_demand: demand,
            origin_overview: origins,
            cost_vs_revenue: trend,
            diagnostics,
            filtered_rows: filtered.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Record, Value};

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        let column_names: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let records = rows
            .into_iter()
            .map(|cells| Record {
                fields: column_names.iter().cloned().zip(cells).collect(),
            })
            .collect();
        Table::from_rows(column_names, records)
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn num(v: f64) -> Value {
        Value::Float(v)
    }

    fn route_table() -> Table {
        // Suppliers A/B/C, costs [10, 20, 30] on routes (X,Y),(X,Y),(X,Z).
        table(
            &[
                "supplier_name",
                "origin",
                "destination",
                "costs",
                "revenue_generated",
            ],
            vec![
                vec![text("A"), text("X"), text("Y"), num(10.0), num(100.0)],
                vec![text("B"), text("X"), text("Y"), num(20.0), num(200.0)],
                vec![text("C"), text("X"), text("Z"), num(30.0), num(300.0)],
            ],
        )
    }

    #[test]
    fn route_cost_means_per_route() {
        let result = route_cost(&route_table()).unwrap();
        assert_eq!(result.key_columns, vec!["origin", "destination"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].keys, vec!["X", "Y"]);
        assert_eq!(result.rows[0].values, vec![15.0]);
        assert_eq!(result.rows[1].keys, vec!["X", "Z"]);
        assert_eq!(result.rows[1].values, vec![30.0]);
    }

    #[test]
    fn route_cost_skips_unparseable_costs() {
        let t = table(
            &["origin", "destination", "costs"],
            vec![
                vec![text("X"), text("Y"), num(10.0)],
                vec![text("X"), text("Y"), Value::Missing],
            ],
        );
        let result = route_cost(&t).unwrap();
        // The missing cell is excluded from the mean, not counted as zero.
        assert_eq!(result.rows[0].values, vec![10.0]);
    }

    #[test]
    fn route_cost_drops_rows_without_grouping_key() {
        let t = table(
            &["origin", "destination", "costs"],
            vec![
                vec![text("X"), text("Y"), num(10.0)],
                vec![text("X"), Value::Missing, num(99.0)],
            ],
        );
        let result = route_cost(&t).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].values, vec![10.0]);
    }

    #[test]
    fn product_demand_orders_by_units_sold() {
        let t = table(
            &["product_type", "number_of_products_sold"],
            vec![
                vec![text("P1"), num(100.0)],
                vec![text("P2"), num(50.0)],
                vec![text("P3"), num(200.0)],
            ],
        );
        let result = product_demand(&t).unwrap();
        let order: Vec<&str> = result.rows.iter().map(|r| r.keys[0].as_str()).collect();
        assert_eq!(order, vec!["P3", "P1", "P2"]);
    }

    #[test]
    fn product_demand_caps_at_five_and_breaks_ties_by_name() {
        let rows = (0..7)
            .map(|i| vec![text(&format!("P{i}")), num(10.0)])
            .collect();
        let t = table(&["product_type", "number_of_products_sold"], rows);
        let result = product_demand(&t).unwrap();
        assert_eq!(result.rows.len(), TOP_N);
        // All totals tie; ascending product name decides.
        let order: Vec<&str> = result.rows.iter().map(|r| r.keys[0].as_str()).collect();
        assert_eq!(order, vec!["P0", "P1", "P2", "P3", "P4"]);
    }

    #[test]
    fn supplier_performance_keeps_breakdown_of_top_suppliers() {
        let t = table(
            &["supplier_name", "product_type", "production_volumes"],
            vec![
                vec![text("S1"), text("skincare"), num(100.0)],
                vec![text("S1"), text("haircare"), num(50.0)],
                vec![text("S2"), text("skincare"), num(500.0)],
                vec![text("S3"), text("haircare"), num(10.0)],
                vec![text("S4"), text("skincare"), num(20.0)],
                vec![text("S5"), text("haircare"), num(30.0)],
                vec![text("S6"), text("skincare"), num(5.0)],
            ],
        );
        let result = supplier_performance(&t).unwrap();

        let suppliers = result.primary_keys();
        assert_eq!(suppliers.len(), TOP_N);
        // S2 (500) > S1 (150) > S5 (30) > S4 (20) > S3 (10); S6 dropped.
        assert_eq!(suppliers, vec!["S2", "S1", "S5", "S4", "S3"]);
        // S1's per-product breakdown survives the selection.
        let s1_rows: Vec<&AggregationRow> = result
            .rows
            .iter()
            .filter(|r| r.keys[0] == "S1")
            .collect();
        assert_eq!(s1_rows.len(), 2);
    }

    #[test]
    fn origin_overview_carries_both_sums() {
        let t = table(
            &["origin", "production_volumes", "revenue_generated"],
            vec![
                vec![text("X"), num(10.0), num(100.0)],
                vec![text("X"), num(5.0), num(50.0)],
                vec![text("Y"), num(1.0), num(7.0)],
            ],
        );
        let result = origin_overview(&t).unwrap();
        assert_eq!(
            result.value_columns,
            vec!["production_volumes", "revenue_generated"]
        );
        assert_eq!(result.rows[0].keys, vec!["X"]);
        assert_eq!(result.rows[0].values, vec![15.0, 150.0]);
        assert_eq!(result.rows[1].values, vec![1.0, 7.0]);
    }

    #[test]
    fn cost_vs_revenue_groups_by_supplier() {
        let t = table(
            &["supplier_name", "revenue_generated", "costs"],
            vec![
                vec![text("A"), num(100.0), num(40.0)],
                vec![text("A"), num(50.0), num(10.0)],
                vec![text("B"), num(30.0), num(60.0)],
            ],
        );
        let result = cost_vs_revenue(&t).unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].keys, vec!["A"]);
        assert_eq!(result.rows[0].values, vec![150.0, 50.0]);
    }

    #[test]
    fn empty_table_yields_empty_results_not_errors() {
        let t = table(
            &[
                "supplier_name",
                "origin",
                "destination",
                "product_type",
                "revenue_generated",
                "costs",
                "production_volumes",
                "lead_time",
                "number_of_products_sold",
            ],
            vec![],
        );
        assert!(route_cost(&t).unwrap().is_empty());
        assert!(supplier_performance(&t).unwrap().is_empty());
        assert!(product_demand(&t).unwrap().is_empty());
        assert!(origin_overview(&t).unwrap().is_empty());
        assert!(cost_vs_revenue(&t).unwrap().is_empty());

        let kpis = kpi_summary(&t);
        assert_eq!(kpis.total_revenue, Some(0.0));
        assert_eq!(kpis.total_cost, Some(0.0));
        assert_eq!(kpis.total_volume, Some(0.0));
        // Mean of nothing is "no data", not zero.
        assert_eq!(kpis.avg_lead_time, None);
    }

    #[test]
    fn missing_column_skips_one_chart_only() {
        // No destination column: route cost is skipped, everything else runs.
        let t = table(
            &[
                "supplier_name",
                "origin",
                "product_type",
                "revenue_generated",
                "costs",
                "production_volumes",
                "number_of_products_sold",
            ],
            vec![vec![
                text("A"),
                text("X"),
                text("skincare"),
                num(100.0),
                num(40.0),
                num(10.0),
                num(3.0),
            ]],
        );
        let dashboard = Dashboard::compute(&t, &FilterSet::default());
        assert!(dashboard.route_cost.is_none());
        assert_eq!(dashboard.diagnostics.len(), 1);
        assert!(dashboard.diagnostics[0].contains("destination"));
        assert!(dashboard.supplier_performance.is_some());
        assert!(dashboard.product_demand.is_some());
        assert!(dashboard.origin_overview.is_some());
        assert!(dashboard.cost_vs_revenue.is_some());
    }

    #[test]
    fn supplier_agnostic_mode_skips_supplier_charts() {
        let t = table(
            &["origin", "destination", "costs"],
            vec![vec![text("X"), text("Y"), num(10.0)]],
        );
        let dashboard = Dashboard::compute(&t, &FilterSet::default());
        assert!(dashboard.route_cost.is_some());
        assert!(dashboard.supplier_performance.is_none());
        assert!(dashboard.cost_vs_revenue.is_none());
        assert!(dashboard
            .diagnostics
            .iter()
            .any(|d| d.contains("supplier")));
    }

    #[test]
    fn filtering_by_unknown_supplier_reports_no_data() {
        let t = route_table();
        let mut filters = FilterSet::default();
        filters.suppliers.insert("Nobody".into());
        let dashboard = Dashboard::compute(&t, &filters);
        assert_eq!(dashboard.filtered_rows, 0);
        assert_eq!(dashboard.kpis.total_cost, Some(0.0));
        assert_eq!(dashboard.kpis.avg_lead_time, None);
        assert!(dashboard.route_cost.unwrap().is_empty());
    }

    #[test]
    fn disjoint_filters_reaggregate_to_the_direct_group_by() {
        // Partitioning the table by destination and summing the partial
        // supplier aggregations must reproduce the direct aggregation.
        let t = route_table();
        let direct = cost_vs_revenue(&t).unwrap();

        let mut partial: BTreeMap<String, f64> = BTreeMap::new();
        for dest in ["Y", "Z"] {
            let mut filters = FilterSet::default();
            filters.destinations.insert(dest.to_string());
            let part = cost_vs_revenue(&filter::apply(&t, &filters)).unwrap();
            for row in &part.rows {
                *partial.entry(row.keys[0].clone()).or_default() += row.values[1];
            }
        }

        for row in &direct.rows {
            assert_eq!(partial.get(&row.keys[0]).copied(), Some(row.values[1]));
        }
    }

    #[test]
    fn dashboard_respects_filters() {
        let t = route_table();
        let mut filters = FilterSet::default();
        filters.destinations.insert("Y".into());
        let dashboard = Dashboard::compute(&t, &filters);
        assert_eq!(dashboard.filtered_rows, 2);
        let route = dashboard.route_cost.unwrap();
        assert_eq!(route.rows.len(), 1);
        assert_eq!(route.rows[0].values, vec![15.0]);
    }
}
