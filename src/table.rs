// Detail table (display formatting + score gradient) and CSV export

use crate::charts::normalize;
use crate::config::EXPORT_FILE_NAME;
use crate::data::RankingRecord;
use crate::error::{DashboardError, Result};
use crate::format::{format_number, format_percent};
use serde::{Deserialize, Serialize};

pub const EXPORT_MIME: &str = "text/csv";

/// Light and dark ends of the green score gradient
const GRADIENT_LOW: (u8, u8, u8) = (0xf7, 0xfc, 0xf5);
const GRADIENT_HIGH: (u8, u8, u8) = (0x00, 0x44, 0x1b);

pub const COLUMNS: [&str; 7] = [
    "Wilayah",
    "Ranking",
    "Skor_TOPSIS",
    "C1_Volume",
    "C2_Efektivitas",
    "C3_Tren_Pertumbuhan",
    "C4_Stabilitas",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub region: String,
    pub rank: String,
    pub score: String,
    pub volume: String,
    pub effectiveness: String,
    pub growth: String,
    pub stability: String,
    /// Background for the score cell, `#rrggbb`
    pub gradient: String,
}

impl DetailRow {
    pub fn cells(&self) -> [&str; 7] {
        [
            self.region.as_str(),
            self.rank.as_str(),
            self.score.as_str(),
            self.volume.as_str(),
            self.effectiveness.as_str(),
            self.growth.as_str(),
            self.stability.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailTable {
    pub columns: Vec<String>,
    pub rows: Vec<DetailRow>,
}

/// Rows keep the ranking table's own order
pub fn detail_table(ranking: &[RankingRecord]) -> DetailTable {
    let scores: Vec<f64> = ranking.iter().map(|r| r.score).collect();
    let rows = ranking
        .iter()
        .map(|r| DetailRow {
            region: r.region.clone(),
            rank: r.rank.to_string(),
            score: format!("{:.4}", r.score),
            volume: format_number(r.volume, 0),
            effectiveness: format_percent(r.effectiveness, 2),
            growth: format_percent(r.growth, 2),
            stability: format_number(r.stability, 2),
            gradient: gradient_color(normalize(r.score, &scores).unwrap_or(1.0)),
        })
        .collect();

    DetailTable {
        columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

/// Linear blend between the light and dark greens, `t` in 0..=1
pub fn gradient_color(t: f64) -> String {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let mix = |lo: u8, hi: u8| -> u8 { (lo as f64 + (hi as f64 - lo as f64) * t).round() as u8 };
    format!(
        "#{:02x}{:02x}{:02x}",
        mix(GRADIENT_LOW.0, GRADIENT_HIGH.0),
        mix(GRADIENT_LOW.1, GRADIENT_HIGH.1),
        mix(GRADIENT_LOW.2, GRADIENT_HIGH.2)
    )
}

// ============================================================================
// EXPORT
// ============================================================================

/// Download artifact: raw values, header row, no index column
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Shortest text that parses back to the same value: `15000`, not `15000.0`.
/// NaN is written as an empty cell, which the loader reads back as NaN.
fn export_float(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        v.to_string()
    }
}

pub fn export_csv(ranking: &[RankingRecord]) -> Result<ExportFile> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(COLUMNS)?;
    for r in ranking {
        wtr.write_record([
            r.region.clone(),
            r.rank.to_string(),
            export_float(r.score),
            export_float(r.volume),
            export_float(r.effectiveness),
            export_float(r.growth),
            export_float(r.stability),
        ])?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| DashboardError::Export(e.to_string()))?;

    Ok(ExportFile {
        file_name: EXPORT_FILE_NAME,
        mime: EXPORT_MIME,
        bytes,
    })
}
