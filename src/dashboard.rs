//! One render pass of the dashboard.
//!
//! `render` is a pure function of the loaded tables and the current sidebar
//! state. The terminal UI calls it on every key press and the web server on
//! every request; neither holds any other state.

use crate::charts::{quadrant_chart, ranking_chart, trend_chart, QuadrantChart, RankingChart, TrendView};
use crate::data::DataContext;
use crate::error::Result;
use crate::filter::{default_regions, filter_timeseries, full_range, FilterState, YearRange};
use crate::kpi::{compute_kpis, KpiSummary};
use crate::table::{detail_table, DetailTable};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

pub const TITLE: &str = "Executive Summary: Stabilitas Bansos Jabar";
pub const METHODOLOGY: [&str; 2] = [
    "CRITIC: Pembobotan Objektif berdasarkan deviasi data.",
    "TOPSIS: Perankingan berdasarkan jarak solusi ideal.",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sidebar {
    /// Multi-select options, sorted
    pub regions: Vec<String>,
    pub default_regions: Vec<String>,
    pub selected_regions: Vec<String>,
    pub year_bounds: YearRange,
    pub selected_years: YearRange,
    pub methodology: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPayload {
    pub title: String,
    pub sidebar: Sidebar,
    pub kpis: KpiSummary,
    pub trend: TrendView,
    pub ranking: RankingChart,
    pub quadrant: QuadrantChart,
    pub table: DetailTable,
    pub footer: String,
    pub generated_at: DateTime<Utc>,
}

pub fn render(ctx: &DataContext, filter: &FilterState) -> Result<RenderPayload> {
    render_at(ctx, filter, Utc::now())
}

/// `render` with an explicit clock
pub fn render_at(ctx: &DataContext, filter: &FilterState, now: DateTime<Utc>) -> Result<RenderPayload> {
    let bounds = full_range(ctx);
    let years = filter.years.clamp_to(bounds);
    let effective = FilterState {
        regions: filter.regions.clone(),
        years,
    };

    let kpis = compute_kpis(ctx)?;
    let filtered = filter_timeseries(&ctx.timeseries, &effective);

    Ok(RenderPayload {
        title: TITLE.to_string(),
        sidebar: Sidebar {
            regions: ctx.regions(),
            default_regions: default_regions(ctx),
            selected_regions: effective.regions.iter().cloned().collect(),
            year_bounds: bounds,
            selected_years: years,
            methodology: METHODOLOGY.iter().map(|s| s.to_string()).collect(),
        },
        kpis,
        trend: trend_chart(&filtered, years),
        ranking: ranking_chart(&ctx.ranking),
        quadrant: quadrant_chart(&ctx.ranking),
        table: detail_table(&ctx.ranking),
        footer: format!("© {} Jabar Bansos Analytics", now.year()),
        generated_at: now,
    })
}
