// Jabar Bansos Analytics - Core Library
// Exposes all modules for use in the terminal dashboard, API server, and tests

pub mod config;
pub mod error;
pub mod format;
pub mod data;          // Loader + shared read-only context
pub mod filter;        // Sidebar state, region/year filter
pub mod kpi;           // Four headline metrics
pub mod charts;        // Trend, ranking and quadrant chart specs
pub mod table;         // Detail table + CSV export
pub mod data_quality;  // Data-contract checks
pub mod dashboard;     // One full render pass

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use config::{Config, EXPORT_FILE_NAME, RANKING_FILE, TIMESERIES_FILE};
pub use error::{DashboardError, Result};
pub use data::{DataContext, DataSource, RankingRecord, TimeSeriesRecord};
pub use filter::{filter_timeseries, FilterState, YearRange};
pub use kpi::{compute_kpis, Kpi, KpiSummary};
pub use charts::{
    quadrant_chart, ranking_chart, trend_chart,
    QuadrantChart, Quadrant, RankingChart, TrendChart, TrendView,
};
pub use table::{detail_table, export_csv, DetailTable, ExportFile};
pub use data_quality::{check as check_quality, QualityIssue, QualityReport, Severity};
pub use dashboard::{render, RenderPayload};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
