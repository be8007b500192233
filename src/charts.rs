//! Chart specifications for the dashboard.
//!
//! Every chart is a plain serializable description of series and encodings.
//! Nothing here draws; the web page feeds these into Plotly and the terminal
//! UI maps them onto ratatui widgets.

use crate::config::RANKING_CHART_SIZE;
use crate::data::{RankingRecord, TimeSeriesRecord};
use crate::filter::YearRange;
use crate::kpi::{mean_effectiveness, mean_stability};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NO_REGION_NOTICE: &str = "Silakan pilih wilayah di sidebar untuk melihat grafik.";

const BUBBLE_MIN: f64 = 8.0;
const BUBBLE_MAX: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub label: String,
    /// Draw from top to bottom (used so rank 1 sits on top)
    #[serde(default)]
    pub reversed: bool,
}

impl Axis {
    fn new(label: &str) -> Self {
        Axis {
            label: label.to_string(),
            reversed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

// ============================================================================
// TREND (line per region)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendChart {
    pub title: String,
    pub subtitle: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub series: Vec<LineSeries>,
    pub markers: bool,
    pub hover_mode: String,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrendView {
    Chart(TrendChart),
    Notice { message: String },
}

impl TrendView {
    pub fn is_notice(&self) -> bool {
        matches!(self, TrendView::Notice { .. })
    }
}

/// One series per region present in `rows`, sorted by region name, points by
/// year. An empty input gives the "select a region" notice.
pub fn trend_chart(rows: &[&TimeSeriesRecord], years: YearRange) -> TrendView {
    if rows.is_empty() {
        return TrendView::Notice {
            message: NO_REGION_NOTICE.to_string(),
        };
    }

    let mut by_region: BTreeMap<&str, Vec<Point>> = BTreeMap::new();
    for r in rows {
        by_region.entry(r.region.as_str()).or_default().push(Point {
            x: r.year as f64,
            y: r.realized,
        });
    }

    let series = by_region
        .into_iter()
        .map(|(name, mut points)| {
            points.sort_by(|a, b| a.x.total_cmp(&b.x));
            LineSeries {
                name: name.to_string(),
                points,
            }
        })
        .collect();

    TrendView::Chart(TrendChart {
        title: "Dinamika Jumlah Penerima Manfaat per Tahun".to_string(),
        subtitle: format!("Tren Penyaluran Bansos ({}-{})", years.from, years.to),
        x_axis: Axis::new("Tahun Anggaran"),
        y_axis: Axis::new("Jumlah Penerima (Jiwa)"),
        series,
        markers: true,
        hover_mode: "x unified".to_string(),
        height: 400,
    })
}

// ============================================================================
// RANKING (horizontal bars, top 10)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub region: String,
    pub rank: u32,
    pub score: f64,
    /// Position on the colour scale, 0..=1
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingChart {
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub color_scale: String,
    pub bars: Vec<Bar>,
    pub height: u32,
}

pub fn ranking_chart(ranking: &[RankingRecord]) -> RankingChart {
    let mut ordered: Vec<&RankingRecord> = ranking.iter().collect();
    ordered.sort_by_key(|r| r.rank);
    ordered.truncate(RANKING_CHART_SIZE);

    let scores: Vec<f64> = ordered.iter().map(|r| r.score).collect();
    let bars = ordered
        .iter()
        .map(|r| Bar {
            region: r.region.clone(),
            rank: r.rank,
            score: r.score,
            intensity: normalize(r.score, &scores).unwrap_or(1.0),
        })
        .collect();

    RankingChart {
        title: "Ranking Hasil TOPSIS".to_string(),
        x_axis: Axis::new("Skor Preferensi"),
        y_axis: Axis {
            label: String::new(),
            reversed: true,
        },
        color_scale: "Viridis".to_string(),
        bars,
        height: 400,
    }
}

// ============================================================================
// QUADRANT (effectiveness vs. instability)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// High effectiveness, low deviation
    EffectiveStable,
    EffectiveVolatile,
    LaggingStable,
    LaggingVolatile,
}

impl Quadrant {
    /// Values on a mean line count as effective / stable
    pub fn classify(effectiveness: f64, stability: f64, mean_eff: f64, mean_stab: f64) -> Self {
        let effective = effectiveness >= mean_eff;
        let stable = stability <= mean_stab;
        match (effective, stable) {
            (true, true) => Quadrant::EffectiveStable,
            (true, false) => Quadrant::EffectiveVolatile,
            (false, true) => Quadrant::LaggingStable,
            (false, false) => Quadrant::LaggingVolatile,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::EffectiveStable => "Efektif & Stabil",
            Quadrant::EffectiveVolatile => "Efektif & Fluktuatif",
            Quadrant::LaggingStable => "Kurang Efektif & Stabil",
            Quadrant::LaggingVolatile => "Kurang Efektif & Fluktuatif",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub region: String,
    pub rank: u32,
    /// C2_Efektivitas
    pub x: f64,
    /// C4_Stabilitas
    pub y: f64,
    pub volume: f64,
    /// Marker diameter in px
    pub size: f64,
    pub quadrant: Quadrant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub orientation: Orientation,
    pub value: f64,
    pub label: String,
    pub dash: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadrantChart {
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub color_scale: String,
    pub points: Vec<ScatterPoint>,
    pub reference_lines: Vec<ReferenceLine>,
    pub height: u32,
}

impl QuadrantChart {
    pub fn mean_effectiveness(&self) -> Option<f64> {
        self.line(Orientation::Vertical)
    }

    pub fn mean_stability(&self) -> Option<f64> {
        self.line(Orientation::Horizontal)
    }

    fn line(&self, orientation: Orientation) -> Option<f64> {
        self.reference_lines
            .iter()
            .find(|l| l.orientation == orientation)
            .map(|l| l.value)
    }
}

pub fn quadrant_chart(ranking: &[RankingRecord]) -> QuadrantChart {
    let mean_eff = mean_effectiveness(ranking);
    let mean_stab = mean_stability(ranking);
    let volumes: Vec<f64> = ranking.iter().map(|r| r.volume).collect();

    let points = ranking
        .iter()
        .map(|r| ScatterPoint {
            region: r.region.clone(),
            rank: r.rank,
            x: r.effectiveness,
            y: r.stability,
            volume: r.volume,
            size: bubble_size(r.volume, &volumes),
            quadrant: Quadrant::classify(r.effectiveness, r.stability, mean_eff, mean_stab),
        })
        .collect();

    QuadrantChart {
        title: "Peta Posisi Kinerja Wilayah (Bubble Size = Volume Penyaluran)".to_string(),
        x_axis: Axis::new("Rata-rata Efektivitas (%)"),
        y_axis: Axis::new("Ketidakstabilan (Standar Deviasi)"),
        color_scale: "RdYlGn_r".to_string(),
        points,
        reference_lines: vec![
            ReferenceLine {
                orientation: Orientation::Horizontal,
                value: mean_stab,
                label: "Rata-rata Stabilitas".to_string(),
                dash: "dash".to_string(),
                color: "grey".to_string(),
            },
            ReferenceLine {
                orientation: Orientation::Vertical,
                value: mean_eff,
                label: "Rata-rata Efektivitas".to_string(),
                dash: "dash".to_string(),
                color: "grey".to_string(),
            },
        ],
        height: 600,
    }
}

/// Min-max position of `value` among `all`, None when the spread is zero
/// or not finite
pub(crate) fn normalize(value: f64, all: &[f64]) -> Option<f64> {
    let finite = all.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let range = max - min;
    if !range.is_finite() || range <= 0.0 || !value.is_finite() {
        return None;
    }
    Some(((value - min) / range).clamp(0.0, 1.0))
}

fn bubble_size(volume: f64, all: &[f64]) -> f64 {
    match normalize(volume, all) {
        Some(t) => BUBBLE_MIN + t * (BUBBLE_MAX - BUBBLE_MIN),
        None if volume.is_finite() => (BUBBLE_MIN + BUBBLE_MAX) / 2.0,
        None => BUBBLE_MIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{rk, small_context};
    use crate::filter::{filter_timeseries, FilterState};

    #[test]
    fn test_trend_single_region_two_points() {
        let ctx = small_context();
        let filter = FilterState::new(["A"], YearRange::new(2023, 2024));
        let rows = filter_timeseries(&ctx.timeseries, &filter);

        match trend_chart(&rows, filter.years) {
            TrendView::Chart(chart) => {
                assert_eq!(chart.series.len(), 1);
                assert_eq!(chart.series[0].name, "A");
                let ys: Vec<f64> = chart.series[0].points.iter().map(|p| p.y).collect();
                assert_eq!(ys, vec![10.0, 20.0]);
                assert_eq!(chart.subtitle, "Tren Penyaluran Bansos (2023-2024)");
            }
            other => panic!("expected chart, got {:?}", other),
        }
    }

    #[test]
    fn test_trend_empty_is_notice() {
        let view = trend_chart(&[], YearRange::new(2018, 2024));
        assert!(view.is_notice());
        assert_eq!(
            view,
            TrendView::Notice {
                message: NO_REGION_NOTICE.to_string()
            }
        );
    }

    #[test]
    fn test_trend_points_sorted_by_year() {
        let rows = vec![
            crate::data::fixtures::ts("B", 2024, 3.0),
            crate::data::fixtures::ts("A", 2022, 1.0),
            crate::data::fixtures::ts("B", 2020, 2.0),
        ];
        let refs: Vec<&TimeSeriesRecord> = rows.iter().collect();
        let TrendView::Chart(chart) = trend_chart(&refs, YearRange::new(2020, 2024)) else {
            panic!("expected chart");
        };
        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        let xs: Vec<f64> = chart.series[1].points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2020.0, 2024.0]);
    }

    #[test]
    fn test_ranking_chart_top_ten_in_rank_order() {
        let ranking: Vec<RankingRecord> = (1..=14u32)
            .rev()
            .map(|i| rk(&format!("R{}", i), i, 1.0 / i as f64))
            .collect();
        let chart = ranking_chart(&ranking);

        assert_eq!(chart.bars.len(), 10);
        assert_eq!(chart.bars[0].rank, 1);
        assert!(chart.bars.windows(2).all(|w| w[0].rank < w[1].rank));
        assert!(chart.y_axis.reversed);
        assert_eq!(chart.bars[0].intensity, 1.0);
        assert_eq!(chart.bars[9].intensity, 0.0);
    }

    #[test]
    fn test_ranking_chart_fewer_than_ten() {
        let chart = ranking_chart(&small_context().ranking);
        assert_eq!(chart.bars.len(), 2);
        assert_eq!(chart.bars[0].region, "A");

        let single = ranking_chart(&[rk("Solo", 1, 0.4)]);
        assert_eq!(single.bars[0].intensity, 1.0);
        assert!(ranking_chart(&[]).bars.is_empty());
    }

    #[test]
    fn test_quadrant_reference_lines_at_means() {
        let ctx = small_context();
        let chart = quadrant_chart(&ctx.ranking);

        assert_eq!(chart.points.len(), 2);
        // fixtures: effectiveness 89/88, stability 110/120
        assert_eq!(chart.mean_effectiveness(), Some(88.5));
        assert_eq!(chart.mean_stability(), Some(115.0));
        assert_eq!(chart.points[0].quadrant, Quadrant::EffectiveStable);
        assert_eq!(chart.points[1].quadrant, Quadrant::LaggingVolatile);
    }

    #[test]
    fn test_quadrant_bubble_sizes_scaled_by_volume() {
        let chart = quadrant_chart(&small_context().ranking);
        assert_eq!(chart.points[0].size, BUBBLE_MIN);
        assert_eq!(chart.points[1].size, BUBBLE_MAX);

        let same = quadrant_chart(&[rk("Solo", 1, 0.4)]);
        assert_eq!(same.points[0].size, 24.0);
    }

    #[test]
    fn test_quadrant_classify_on_mean_line() {
        assert_eq!(Quadrant::classify(50.0, 10.0, 50.0, 10.0), Quadrant::EffectiveStable);
        assert_eq!(Quadrant::classify(49.0, 11.0, 50.0, 10.0), Quadrant::LaggingVolatile);
        assert_eq!(Quadrant::classify(51.0, 11.0, 50.0, 10.0), Quadrant::EffectiveVolatile);
        assert_eq!(Quadrant::classify(49.0, 9.0, 50.0, 10.0), Quadrant::LaggingStable);
    }

    #[test]
    fn test_trend_view_serializes_with_kind_tag() {
        let json = serde_json::to_value(trend_chart(&[], YearRange::new(2018, 2024))).unwrap();
        assert_eq!(json["kind"], "notice");
        assert_eq!(json["message"], NO_REGION_NOTICE);
    }
}
