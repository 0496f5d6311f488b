use crate::data::aggregate::Dashboard;
use crate::data::cache::TableCache;
use crate::data::filter::{Dimension, FilterSet};
use crate::data::model::Table;

// ---------------------------------------------------------------------------
// Chart tabs
// ---------------------------------------------------------------------------

/// The five chart tabs of the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartTab {
    #[default]
    RouteCost,
    SupplierPerformance,
    ProductDemand,
    OriginOverview,
    CostVsRevenue,
}

pub const CHART_TABS: [ChartTab; 5] = [
    ChartTab::RouteCost,
    ChartTab::SupplierPerformance,
    ChartTab::ProductDemand,
    ChartTab::OriginOverview,
    ChartTab::CostVsRevenue,
];

impl ChartTab {
    pub fn label(self) -> &'static str {
        match self {
            ChartTab::RouteCost => "Route Cost",
            ChartTab::SupplierPerformance => "Supplier Performance",
            ChartTab::ProductDemand => "Product Demand",
            ChartTab::OriginOverview => "Origin Overview",
            ChartTab::CostVsRevenue => "Cost vs Revenue",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table (None until the user opens a file).
    pub table: Option<Table>,

    /// Content-hash keyed cache behind the loader.
    pub cache: TableCache,

    /// Per-dimension filter selections (empty = no filter).
    pub filters: FilterSet,

    /// KPIs and chart aggregations for the current filters. Swapped in
    /// whole after each recomputation; never partially updated.
    pub dashboard: Option<Dashboard>,

    /// Which chart tab is active in the central panel.
    pub active_tab: ChartTab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: None,
            cache: TableCache::new(),
            filters: FilterSet::default(),
            dashboard: None,
            active_tab: ChartTab::default(),
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded table, reset filters, compute the dashboard.
    pub fn set_table(&mut self, table: Table) {
        self.filters = FilterSet::default();
        self.dashboard = Some(Dashboard::compute(&table, &self.filters));
        self.table = Some(table);
        self.status_message = None;
        self.loading = false;
    }

    /// Recompute the dashboard after a filter change. One atomic unit of
    /// work: the previous dashboard stays visible until the new one is
    /// fully built.
    pub fn recompute(&mut self) {
        if let Some(table) = &self.table {
            self.dashboard = Some(Dashboard::compute(table, &self.filters));
        }
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &str) {
        let selected = self.filters.values_mut(dim);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.recompute();
    }

    /// Select every value of a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        let Some(table) = &self.table else {
            return;
        };
        let Some(column) = dim.column(&table.schema) else {
            return;
        };
        if let Some(values) = table.unique_values.get(column) {
            *self.filters.values_mut(dim) = values.clone();
            self.recompute();
        }
    }

    /// Clear a dimension's selection (back to pass-through).
    pub fn select_none(&mut self, dim: Dimension) {
        self.filters.values_mut(dim).clear();
        self.recompute();
    }

    /// Drop all filters across dimensions.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.recompute();
    }
}
