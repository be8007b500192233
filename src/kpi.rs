// KPI aggregator
// Always computed over the unfiltered tables; sidebar state never reaches here.

use crate::data::{DataContext, RankingRecord, TimeSeriesRecord};
use crate::error::{DashboardError, Result};
use crate::format::{format_number, format_percent};
use serde::{Deserialize, Serialize};

/// A metric card: headline value plus a small delta caption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub label: String,
    pub value: String,
    pub delta: String,
    /// Unformatted number behind the card (NaN passes through)
    pub raw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub latest_total: Kpi,
    pub mean_effectiveness: Kpi,
    pub best_region: Kpi,
    pub most_stable: Kpi,
}

impl KpiSummary {
    pub fn cards(&self) -> [&Kpi; 4] {
        [
            &self.latest_total,
            &self.mean_effectiveness,
            &self.best_region,
            &self.most_stable,
        ]
    }
}

/// Sum of Realisasi in the most recent year. None for an empty table.
pub fn latest_year_total(rows: &[TimeSeriesRecord]) -> Option<(i32, f64)> {
    let latest = rows.iter().map(|r| r.year).max()?;
    let total = rows
        .iter()
        .filter(|r| r.year == latest)
        .map(|r| r.realized)
        .sum();
    Some((latest, total))
}

/// Arithmetic mean of C2_Efektivitas; NaN when empty or any value is NaN
pub fn mean_effectiveness(rows: &[RankingRecord]) -> f64 {
    mean(rows.iter().map(|r| r.effectiveness))
}

pub fn mean_stability(rows: &[RankingRecord]) -> f64 {
    mean(rows.iter().map(|r| r.stability))
}

pub(crate) fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// The row ranked 1
pub fn best_region(rows: &[RankingRecord]) -> Result<&RankingRecord> {
    rows.iter()
        .find(|r| r.rank == 1)
        .ok_or(DashboardError::MissingTopRegion)
}

/// Row with the smallest C4_Stabilitas. NaN cells are skipped; ties go to
/// the first row in table order.
pub fn most_stable(rows: &[RankingRecord]) -> Result<&RankingRecord> {
    let first = rows.first().ok_or(DashboardError::EmptyRanking)?;
    let best = rows
        .iter()
        .filter(|r| !r.stability.is_nan())
        .fold(None::<&RankingRecord>, |acc, r| match acc {
            Some(cur) if cur.stability <= r.stability => Some(cur),
            _ => Some(r),
        });
    Ok(best.unwrap_or(first))
}

pub fn compute_kpis(ctx: &DataContext) -> Result<KpiSummary> {
    let latest_total = match latest_year_total(&ctx.timeseries) {
        Some((year, total)) => Kpi {
            label: format!("Total Penerima ({})", year),
            value: format_number(total, 0),
            delta: "KPM".to_string(),
            raw: total,
        },
        None => Kpi {
            label: "Total Penerima".to_string(),
            value: "0".to_string(),
            delta: "KPM".to_string(),
            raw: 0.0,
        },
    };

    let avg_eff = mean_effectiveness(&ctx.ranking);
    let mean_effectiveness = Kpi {
        label: "Rata-rata Efektivitas".to_string(),
        value: format_percent(avg_eff, 2),
        delta: "Target Realisasi".to_string(),
        raw: avg_eff,
    };

    let top = best_region(&ctx.ranking)?;
    let best_region = Kpi {
        label: "Wilayah Terbaik".to_string(),
        value: top.region.clone(),
        delta: format!("Skor: {:.3}", top.score),
        raw: top.score,
    };

    let stable = most_stable(&ctx.ranking)?;
    let most_stable = Kpi {
        label: "Paling Stabil (Deviasi Terendah)".to_string(),
        value: stable.region.clone(),
        delta: format!("±{}", format_number(stable.stability, 0)),
        raw: stable.stability,
    };

    Ok(KpiSummary {
        latest_total,
        mean_effectiveness,
        best_region,
        most_stable,
    })
}
