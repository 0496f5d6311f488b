use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot};

use crate::color::ColorMap;
use crate::data::aggregate::{AggregationResult, Dashboard, KpiSummary};
use crate::state::{AppState, CHART_TABS, ChartTab};

// ---------------------------------------------------------------------------
// Central panel – KPI strip and chart tabs
// ---------------------------------------------------------------------------

/// Render the central panel: KPI cards, diagnostics, tab bar, active chart.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(dashboard) = state.dashboard.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dashboard  (File → Open…)");
        });
        return;
    };

    kpi_strip(ui, &dashboard.kpis);

    for diagnostic in &dashboard.diagnostics {
        ui.label(RichText::new(diagnostic).color(Color32::YELLOW).small());
    }

    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        for tab in CHART_TABS {
            if ui
                .selectable_label(state.active_tab == tab, tab.label())
                .clicked()
            {
                state.active_tab = tab;
            }
        }
    });

    ui.add_space(4.0);

    match state.active_tab {
        ChartTab::RouteCost => chart_slot(ui, &dashboard.route_cost, route_cost_chart),
        ChartTab::SupplierPerformance => {
            chart_slot(ui, &dashboard.supplier_performance, supplier_performance_chart)
        }
        ChartTab::ProductDemand => chart_slot(ui, &dashboard.product_demand, product_demand_chart),
        ChartTab::OriginOverview => chart_slot(ui, &dashboard.origin_overview, origin_overview_chart),
        ChartTab::CostVsRevenue => chart_slot(ui, &dashboard.cost_vs_revenue, cost_vs_revenue_chart),
    }
}

/// Render one chart, or the reason it has nothing to show.
fn chart_slot(
    ui: &mut Ui,
    result: &Option<AggregationResult>,
    render: fn(&mut Ui, &AggregationResult),
) {
    match result {
        Some(agg) if !agg.is_empty() => render(ui, agg),
        Some(_) => {
            ui.label(RichText::new("No data for the current filters.").weak());
        }
        None => {
            ui.label(
                RichText::new("Chart unavailable: required column missing from dataset.").weak(),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// KPI strip
// ---------------------------------------------------------------------------

fn kpi_strip(ui: &mut Ui, kpis: &KpiSummary) {
    ui.columns(4, |cols: &mut [Ui]| {
        kpi_card(&mut cols[0], "Total Revenue", fmt_total(kpis.total_revenue));
        kpi_card(&mut cols[1], "Total Cost", fmt_total(kpis.total_cost));
        kpi_card(&mut cols[2], "Production Volume", fmt_total(kpis.total_volume));
        kpi_card(&mut cols[3], "Avg Lead Time", fmt_days(kpis.avg_lead_time));
    });
}

fn kpi_card(ui: &mut Ui, title: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(title).weak().small());
        ui.heading(value);
    });
}

fn fmt_total(value: Option<f64>) -> String {
    value.map(thousands).unwrap_or_else(|| "no data".to_string())
}

fn fmt_days(value: Option<f64>) -> String {
    value
        .map(|d| format!("{d:.1} days"))
        .unwrap_or_else(|| "no data".to_string())
}

/// `1234567.8` → `"1,234,568"`.
fn thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if value < 0.0 { format!("-{out}") } else { out }
}

// ---------------------------------------------------------------------------
// The five charts
// ---------------------------------------------------------------------------

/// Mean cost per route, one bar per (origin, destination) pair.
fn route_cost_chart(ui: &mut Ui, result: &AggregationResult) {
    let labels: Vec<String> = result
        .rows
        .iter()
        .map(|r| format!("{} → {}", r.keys[0], r.keys[1]))
        .collect();

    let bars: Vec<Bar> = result
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Bar::new(i as f64, r.values[0])
                .name(&labels[i])
                .fill(Color32::LIGHT_BLUE)
        })
        .collect();

    let chart = BarChart::new(bars).name("Avg cost").width(0.6);
    bar_plot(ui, "route_cost", labels, "Avg cost", vec![chart]);
}

/// Top-5 suppliers by volume, stacked by product type.
fn supplier_performance_chart(ui: &mut Ui, result: &AggregationResult) {
    let suppliers = result.primary_keys();
    let products: BTreeSet<String> = result
        .rows
        .iter()
        .filter_map(|r| r.keys.get(1).cloned())
        .collect();
    let colors = ColorMap::new(products.iter().cloned());

    let mut charts: Vec<BarChart> = Vec::new();
    for product in &products {
        let bars: Vec<Bar> = suppliers
            .iter()
            .enumerate()
            .filter_map(|(i, supplier)| {
                result
                    .rows
                    .iter()
                    .find(|r| &r.keys[0] == supplier && &r.keys[1] == product)
                    .map(|r| Bar::new(i as f64, r.values[0]).name(format!("{supplier} – {product}")))
            })
            .collect();

        let mut chart = BarChart::new(bars)
            .name(product)
            .color(colors.color_for(product))
            .width(0.6);
        let below: Vec<&BarChart> = charts.iter().collect();
        chart = chart.stack_on(&below);
        charts.push(chart);
    }

    bar_plot(ui, "supplier_performance", suppliers, "Production volume", charts);
}

/// Top-5 product types by units sold, one coloured bar each.
fn product_demand_chart(ui: &mut Ui, result: &AggregationResult) {
    let labels: Vec<String> = result.rows.iter().map(|r| r.keys[0].clone()).collect();
    let colors = ColorMap::new(labels.iter().cloned());

    let bars: Vec<Bar> = result
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Bar::new(i as f64, r.values[0])
                .name(&r.keys[0])
                .fill(colors.color_for(&r.keys[0]))
        })
        .collect();

    let chart = BarChart::new(bars).name("Units sold").width(0.6);
    bar_plot(ui, "product_demand", labels, "Units sold", vec![chart]);
}

/// Volume and revenue per origin, grouped bars.
fn origin_overview_chart(ui: &mut Ui, result: &AggregationResult) {
    let labels: Vec<String> = result.rows.iter().map(|r| r.keys[0].clone()).collect();
    let charts = paired_series(
        result,
        ("Production volume", Color32::LIGHT_BLUE),
        ("Revenue", Color32::GOLD),
    );
    bar_plot(ui, "origin_overview", labels, "Total", charts);
}

/// Revenue and cost per supplier, grouped bars.
fn cost_vs_revenue_chart(ui: &mut Ui, result: &AggregationResult) {
    let labels: Vec<String> = result.rows.iter().map(|r| r.keys[0].clone()).collect();
    let charts = paired_series(
        result,
        ("Revenue", Color32::from_rgb(0x2e, 0xcc, 0x71)),
        ("Cost", Color32::from_rgb(0xe7, 0x4c, 0x3c)),
    );
    bar_plot(ui, "cost_vs_revenue", labels, "Value", charts);
}

/// Two value columns as side-by-side bar series sharing the key axis.
fn paired_series(
    result: &AggregationResult,
    first: (&str, Color32),
    second: (&str, Color32),
) -> Vec<BarChart> {
    let series = |value_idx: usize, offset: f64, (name, color): (&str, Color32)| {
        let bars: Vec<Bar> = result
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| {
                Bar::new(i as f64 + offset, r.values[value_idx])
                    .name(format!("{} – {name}", r.keys[0]))
            })
            .collect();
        BarChart::new(bars).name(name).color(color).width(0.34)
    };

    vec![series(0, -0.18, first), series(1, 0.18, second)]
}

// ---------------------------------------------------------------------------
// Shared plot scaffolding
// ---------------------------------------------------------------------------

/// A categorical bar plot: integer x positions labelled from `x_labels`.
fn bar_plot(ui: &mut Ui, id: &str, x_labels: Vec<String>, y_label: &str, charts: Vec<BarChart>) {
    Plot::new(id.to_string())
        .legend(Legend::default())
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 0.05 || idx < 0.0 {
                return String::new();
            }
            x_labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}
