use crate::config::Config;
use crate::error::{DashboardError, Result};
use log::{debug, info};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::OnceLock;

// ============================================================================
// RECORDS (column names are fixed by the offline notebook output)
// ============================================================================

/// One row per (region, year) of realized disbursement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRecord {
    #[serde(rename = "Wilayah")]
    pub region: String,

    #[serde(rename = "Tahun")]
    pub year: i32,

    /// Recipient count (KPM)
    #[serde(rename = "Realisasi", deserialize_with = "nan_if_empty")]
    pub realized: f64,
}

/// One row per region, as ranked by CRITIC-weighted TOPSIS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRecord {
    #[serde(rename = "Wilayah")]
    pub region: String,

    #[serde(rename = "Ranking")]
    pub rank: u32,

    #[serde(rename = "Skor_TOPSIS", deserialize_with = "nan_if_empty")]
    pub score: f64,

    #[serde(rename = "C1_Volume", deserialize_with = "nan_if_empty")]
    pub volume: f64,

    /// Percent of target realized
    #[serde(rename = "C2_Efektivitas", deserialize_with = "nan_if_empty")]
    pub effectiveness: f64,

    #[serde(rename = "C3_Tren_Pertumbuhan", deserialize_with = "nan_if_empty")]
    pub growth: f64,

    /// Standard deviation of disbursement (cost criterion: lower is better)
    #[serde(rename = "C4_Stabilitas", deserialize_with = "nan_if_empty")]
    pub stability: f64,
}

// Blank numeric cells become NaN and flow into the KPIs unchanged
fn nan_if_empty<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed.parse::<f64>().map_err(serde::de::Error::custom)
}

// ============================================================================
// LOADING
// ============================================================================

fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            DashboardError::MissingInput {
                path: path.to_path_buf(),
            }
        } else {
            DashboardError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

pub fn read_timeseries<R: Read>(reader: R) -> Result<Vec<TimeSeriesRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

pub fn read_ranking<R: Read>(reader: R) -> Result<Vec<RankingRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

pub fn load_timeseries(path: &Path) -> Result<Vec<TimeSeriesRecord>> {
    read_timeseries(open_input(path)?)
}

pub fn load_ranking(path: &Path) -> Result<Vec<RankingRecord>> {
    read_ranking(open_input(path)?)
}

// ============================================================================
// DATA CONTEXT
// ============================================================================

/// Both input tables, loaded once and shared read-only by every render
#[derive(Debug, Clone, Default)]
pub struct DataContext {
    pub timeseries: Vec<TimeSeriesRecord>,
    pub ranking: Vec<RankingRecord>,
}

impl DataContext {
    pub fn new(timeseries: Vec<TimeSeriesRecord>, ranking: Vec<RankingRecord>) -> Self {
        DataContext { timeseries, ranking }
    }

    /// Read both files. A missing file fails the whole load; there is no
    /// partial context.
    pub fn load(config: &Config) -> Result<Self> {
        let ts_path = config.timeseries_path();
        let rk_path = config.ranking_path();

        let timeseries = load_timeseries(&ts_path)?;
        let ranking = load_ranking(&rk_path)?;

        info!(
            "loaded {} time-series rows from {} and {} ranking rows from {}",
            timeseries.len(),
            ts_path.display(),
            ranking.len(),
            rk_path.display()
        );

        Ok(DataContext { timeseries, ranking })
    }

    /// Observed (min, max) of Tahun, None when the table is empty
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let min = self.timeseries.iter().map(|r| r.year).min()?;
        let max = self.timeseries.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    /// Sorted unique region names of the time series (sidebar options)
    pub fn regions(&self) -> Vec<String> {
        self.timeseries
            .iter()
            .map(|r| r.region.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Ranking rows ordered by ascending rank; ties keep table order
    pub fn ranking_by_rank(&self) -> Vec<&RankingRecord> {
        let mut rows: Vec<&RankingRecord> = self.ranking.iter().collect();
        rows.sort_by_key(|r| r.rank);
        rows
    }
}

/// Lazily loads the context on first use and hands out the same instance
/// afterwards.
pub struct DataSource {
    config: Config,
    cell: OnceLock<DataContext>,
}

impl DataSource {
    pub fn new(config: Config) -> Self {
        DataSource {
            config,
            cell: OnceLock::new(),
        }
    }

    /// Source whose tables are already in memory; `get` never touches disk
    pub fn preloaded(config: Config, ctx: DataContext) -> Self {
        DataSource {
            config,
            cell: OnceLock::from(ctx),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get(&self) -> Result<&DataContext> {
        if let Some(ctx) = self.cell.get() {
            return Ok(ctx);
        }
        debug!("data context not cached yet, reading from {}", self.config.data_dir.display());
        let ctx = DataContext::load(&self.config)?;
        Ok(self.cell.get_or_init(|| ctx))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn ts(region: &str, year: i32, realized: f64) -> TimeSeriesRecord {
        TimeSeriesRecord {
            region: region.to_string(),
            year,
            realized,
        }
    }

    pub fn rk(region: &str, rank: u32, score: f64) -> RankingRecord {
        RankingRecord {
            region: region.to_string(),
            rank,
            score,
            volume: 1000.0 * rank as f64,
            effectiveness: 90.0 - rank as f64,
            growth: 2.5,
            stability: 100.0 + 10.0 * rank as f64,
        }
    }

    /// Two regions, two years: A = 10, 20 and B = 5, 15
    pub fn small_context() -> DataContext {
        DataContext::new(
            vec![
                ts("A", 2023, 10.0),
                ts("A", 2024, 20.0),
                ts("B", 2023, 5.0),
                ts("B", 2024, 15.0),
            ],
            vec![rk("A", 1, 0.9), rk("B", 2, 0.5)],
        )
    }
}
