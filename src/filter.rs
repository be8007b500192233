// Sidebar filter state and the time-series filter engine

use crate::config::DEFAULT_SELECTION_SIZE;
use crate::data::{DataContext, TimeSeriesRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inclusive year range; `from <= to` after normalisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    pub fn new(a: i32, b: i32) -> Self {
        if a <= b {
            YearRange { from: a, to: b }
        } else {
            YearRange { from: b, to: a }
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.from <= year && year <= self.to
    }

    /// Clamp both ends into `bounds`
    pub fn clamp_to(&self, bounds: YearRange) -> Self {
        YearRange::new(
            self.from.clamp(bounds.from, bounds.to),
            self.to.clamp(bounds.from, bounds.to),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub regions: BTreeSet<String>,
    pub years: YearRange,
}

impl FilterState {
    pub fn new<I, S>(regions: I, years: YearRange) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterState {
            regions: regions.into_iter().map(Into::into).collect(),
            years,
        }
    }

    /// Session start: best-ranked regions over the full observed range
    pub fn default_for(ctx: &DataContext) -> Self {
        FilterState {
            regions: default_regions(ctx).into_iter().collect(),
            years: full_range(ctx),
        }
    }

    pub fn toggle_region(&mut self, region: &str) {
        if !self.regions.remove(region) {
            self.regions.insert(region.to_string());
        }
    }

    pub fn is_selected(&self, region: &str) -> bool {
        self.regions.contains(region)
    }
}

/// The `DEFAULT_SELECTION_SIZE` regions with the lowest rank values
pub fn default_regions(ctx: &DataContext) -> Vec<String> {
    ctx.ranking_by_rank()
        .into_iter()
        .take(DEFAULT_SELECTION_SIZE)
        .map(|r| r.region.clone())
        .collect()
}

/// Slider bounds. An empty time series collapses to year 0.
pub fn full_range(ctx: &DataContext) -> YearRange {
    ctx.year_bounds()
        .map(|(lo, hi)| YearRange::new(lo, hi))
        .unwrap_or(YearRange { from: 0, to: 0 })
}

/// Rows whose region is selected and whose year lies in the range.
/// Table order is preserved.
pub fn filter_timeseries<'a>(
    rows: &'a [TimeSeriesRecord],
    filter: &FilterState,
) -> Vec<&'a TimeSeriesRecord> {
    if filter.regions.is_empty() {
        return Vec::new();
    }
    rows.iter()
        .filter(|r| filter.regions.contains(&r.region) && filter.years.contains(r.year))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{rk, small_context, ts};

    #[test]
    fn test_filter_single_region() {
        let ctx = small_context();
        let filter = FilterState::new(["A"], YearRange::new(2023, 2024));
        let rows = filter_timeseries(&ctx.timeseries, &filter);
        let values: Vec<f64> = rows.iter().map(|r| r.realized).collect();
        assert_eq!(values, vec![10.0, 20.0]);
    }

    #[test]
    fn test_filter_matches_predicate_exactly() {
        let ctx = small_context();
        let filters = [
            FilterState::new(["A", "B"], YearRange::new(2023, 2023)),
            FilterState::new(["B"], YearRange::new(2024, 2030)),
            FilterState::new(["A", "Z"], YearRange::new(2000, 2022)),
            FilterState::new(["A", "B"], YearRange::new(2023, 2024)),
        ];
        for filter in &filters {
            let got = filter_timeseries(&ctx.timeseries, filter);
            let expected: Vec<&TimeSeriesRecord> = ctx
                .timeseries
                .iter()
                .filter(|r| {
                    filter.regions.contains(&r.region)
                        && filter.years.from <= r.year
                        && r.year <= filter.years.to
                })
                .collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_empty_selection_yields_empty() {
        let ctx = small_context();
        let filter = FilterState::new(Vec::<String>::new(), YearRange::new(2023, 2024));
        assert!(filter_timeseries(&ctx.timeseries, &filter).is_empty());
    }

    #[test]
    fn test_year_range_normalises_order() {
        let range = YearRange::new(2024, 2018);
        assert_eq!(range, YearRange { from: 2018, to: 2024 });
        assert!(range.contains(2018));
        assert!(range.contains(2024));
        assert!(!range.contains(2025));
    }

    #[test]
    fn test_year_range_clamp() {
        let bounds = YearRange::new(2018, 2024);
        assert_eq!(YearRange::new(2010, 2030).clamp_to(bounds), bounds);
        assert_eq!(
            YearRange::new(2020, 2030).clamp_to(bounds),
            YearRange::new(2020, 2024)
        );
    }

    #[test]
    fn test_default_selection_is_top_five_by_rank() {
        let ctx = DataContext::new(
            vec![ts("R1", 2018, 1.0), ts("R7", 2024, 1.0)],
            vec![
                rk("R7", 7, 0.1),
                rk("R3", 3, 0.6),
                rk("R1", 1, 0.9),
                rk("R6", 6, 0.2),
                rk("R2", 2, 0.7),
                rk("R5", 5, 0.3),
                rk("R4", 4, 0.5),
            ],
        );
        assert_eq!(default_regions(&ctx), vec!["R1", "R2", "R3", "R4", "R5"]);

        let filter = FilterState::default_for(&ctx);
        assert_eq!(filter.regions.len(), 5);
        assert!(!filter.is_selected("R6"));
        assert_eq!(filter.years, YearRange::new(2018, 2024));
    }

    #[test]
    fn test_toggle_region() {
        let mut filter = FilterState::new(["A"], YearRange::new(2023, 2024));
        filter.toggle_region("B");
        assert!(filter.is_selected("B"));
        filter.toggle_region("A");
        assert!(!filter.is_selected("A"));
    }
}
