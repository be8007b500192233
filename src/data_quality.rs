// Data-contract checks for the two notebook outputs
// Nothing here blocks rendering: issues are reported and logged, the
// dashboard keeps going unless a KPI genuinely cannot be computed.

use crate::data::DataContext;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

// ============================================================================
// QUALITY REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // A KPI or chart will fail or be meaningless
    Warning,  // Output is computed but may mislead
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub rule: String,
    pub message: String,
}

impl QualityIssue {
    fn critical(rule: &str, message: String) -> Self {
        QualityIssue {
            severity: Severity::Critical,
            rule: rule.to_string(),
            message,
        }
    }

    fn warning(rule: &str, message: String) -> Self {
        QualityIssue {
            severity: Severity::Warning,
            rule: rule.to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_critical_issues(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }

    pub fn has_rule(&self, rule: &str) -> bool {
        self.issues.iter().any(|i| i.rule == rule)
    }

    pub fn summary(&self) -> String {
        format!(
            "Issues: {} ({} critical)",
            self.issues.len(),
            self.issues
                .iter()
                .filter(|i| i.severity == Severity::Critical)
                .count()
        )
    }

    pub fn log(&self) {
        for issue in &self.issues {
            warn!("[{:?}] {}: {}", issue.severity, issue.rule, issue.message);
        }
    }
}

// ============================================================================
// CHECKS
// ============================================================================

pub fn check(ctx: &DataContext) -> QualityReport {
    let mut issues = Vec::new();
    check_tables_present(ctx, &mut issues);
    check_region_sets(ctx, &mut issues);
    check_ranks(ctx, &mut issues);
    check_rank_order(ctx, &mut issues);
    check_duplicate_years(ctx, &mut issues);
    check_missing_values(ctx, &mut issues);
    QualityReport { issues }
}

fn check_tables_present(ctx: &DataContext, issues: &mut Vec<QualityIssue>) {
    if ctx.timeseries.is_empty() {
        issues.push(QualityIssue::critical(
            "timeseries_empty",
            "time-series table has no rows".to_string(),
        ));
    }
    if ctx.ranking.is_empty() {
        issues.push(QualityIssue::critical(
            "ranking_empty",
            "ranking table has no rows".to_string(),
        ));
    }
}

fn check_region_sets(ctx: &DataContext, issues: &mut Vec<QualityIssue>) {
    let ts: BTreeSet<&str> = ctx.timeseries.iter().map(|r| r.region.as_str()).collect();
    let rk: BTreeSet<&str> = ctx.ranking.iter().map(|r| r.region.as_str()).collect();

    let only_ranked: Vec<&str> = rk.difference(&ts).copied().collect();
    if !only_ranked.is_empty() {
        issues.push(QualityIssue::warning(
            "region_not_in_timeseries",
            format!("ranked but missing from time series: {}", only_ranked.join(", ")),
        ));
    }

    let only_series: Vec<&str> = ts.difference(&rk).copied().collect();
    if !only_series.is_empty() {
        issues.push(QualityIssue::warning(
            "region_not_ranked",
            format!("in time series but not ranked: {}", only_series.join(", ")),
        ));
    }
}

fn check_ranks(ctx: &DataContext, issues: &mut Vec<QualityIssue>) {
    if ctx.ranking.is_empty() {
        return;
    }

    let mut seen = HashSet::new();
    let mut duplicates = BTreeSet::new();
    for r in &ctx.ranking {
        if !seen.insert(r.rank) {
            duplicates.insert(r.rank);
        }
    }
    if !duplicates.is_empty() {
        let list: Vec<String> = duplicates.iter().map(|r| r.to_string()).collect();
        issues.push(QualityIssue::critical(
            "rank_duplicate",
            format!("rank used more than once: {}", list.join(", ")),
        ));
    }

    if !seen.contains(&1) {
        issues.push(QualityIssue::critical(
            "rank_one_missing",
            "no region has rank 1".to_string(),
        ));
    }

    let n = seen.len() as u32;
    let gaps: Vec<String> = (1..=n)
        .filter(|k| !seen.contains(k))
        .map(|k| k.to_string())
        .collect();
    if !gaps.is_empty() {
        issues.push(QualityIssue::warning(
            "rank_not_dense",
            format!("ranks are not contiguous, missing: {}", gaps.join(", ")),
        ));
    }
}

fn check_rank_order(ctx: &DataContext, issues: &mut Vec<QualityIssue>) {
    let ordered = ctx.ranking_by_rank();
    for pair in ordered.windows(2) {
        let (better, worse) = (pair[0], pair[1]);
        if better.rank != worse.rank && better.score < worse.score {
            issues.push(QualityIssue::warning(
                "rank_score_mismatch",
                format!(
                    "{} (rank {}, score {:.4}) scores below {} (rank {}, score {:.4})",
                    better.region, better.rank, better.score, worse.region, worse.rank, worse.score
                ),
            ));
        }
    }
}

fn check_duplicate_years(ctx: &DataContext, issues: &mut Vec<QualityIssue>) {
    let mut counts: HashMap<(&str, i32), usize> = HashMap::new();
    for r in &ctx.timeseries {
        *counts.entry((r.region.as_str(), r.year)).or_insert(0) += 1;
    }
    let mut dupes: Vec<(&str, i32)> = counts
        .into_iter()
        .filter(|(_, c)| *c > 1)
        .map(|(k, _)| k)
        .collect();
    dupes.sort();
    for (region, year) in dupes {
        issues.push(QualityIssue::warning(
            "timeseries_duplicate",
            format!("{} has more than one row for {}", region, year),
        ));
    }
}

fn check_missing_values(ctx: &DataContext, issues: &mut Vec<QualityIssue>) {
    let nan_realized = ctx.timeseries.iter().filter(|r| r.realized.is_nan()).count();
    if nan_realized > 0 {
        issues.push(QualityIssue::warning(
            "realisasi_missing",
            format!("{} time-series rows have no Realisasi value", nan_realized),
        ));
    }

    let columns: [(&str, fn(&crate::data::RankingRecord) -> f64); 5] = [
        ("Skor_TOPSIS", |r| r.score),
        ("C1_Volume", |r| r.volume),
        ("C2_Efektivitas", |r| r.effectiveness),
        ("C3_Tren_Pertumbuhan", |r| r.growth),
        ("C4_Stabilitas", |r| r.stability),
    ];
    for (name, get) in columns {
        let missing = ctx.ranking.iter().filter(|r| get(r).is_nan()).count();
        if missing > 0 {
            issues.push(QualityIssue::warning(
                "criterion_missing",
                format!("{} ranking rows have no {} value", missing, name),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{rk, small_context, ts};

    #[test]
    fn test_clean_context_has_no_issues() {
        let report = check(&small_context());
        assert!(report.is_clean(), "{:?}", report);
        assert_eq!(report.summary(), "Issues: 0 (0 critical)");
    }

    #[test]
    fn test_region_mismatch_reported_both_ways() {
        let ctx = DataContext::new(
            vec![ts("A", 2024, 1.0), ts("C", 2024, 1.0)],
            vec![rk("A", 1, 0.9), rk("B", 2, 0.5)],
        );
        let report = check(&ctx);
        assert!(report.has_rule("region_not_in_timeseries"));
        assert!(report.has_rule("region_not_ranked"));
        assert!(!report.has_critical_issues());
    }

    #[test]
    fn test_rank_problems() {
        let ctx = DataContext::new(
            vec![ts("A", 2024, 1.0), ts("B", 2024, 1.0), ts("C", 2024, 1.0)],
            vec![rk("A", 2, 0.9), rk("B", 2, 0.5), rk("C", 4, 0.4)],
        );
        let report = check(&ctx);
        assert!(report.has_rule("rank_duplicate"));
        assert!(report.has_rule("rank_one_missing"));
        assert!(report.has_rule("rank_not_dense"));
        assert!(report.has_critical_issues());
    }

    #[test]
    fn test_rank_score_mismatch() {
        let ctx = DataContext::new(
            vec![ts("A", 2024, 1.0), ts("B", 2024, 1.0)],
            vec![rk("A", 1, 0.3), rk("B", 2, 0.8)],
        );
        assert!(check(&ctx).has_rule("rank_score_mismatch"));
    }

    #[test]
    fn test_duplicate_year_and_nan() {
        let mut ranking = vec![rk("A", 1, 0.9)];
        ranking[0].stability = f64::NAN;
        let ctx = DataContext::new(
            vec![ts("A", 2024, 1.0), ts("A", 2024, f64::NAN)],
            ranking,
        );
        let report = check(&ctx);
        assert!(report.has_rule("timeseries_duplicate"));
        assert!(report.has_rule("realisasi_missing"));
        assert!(report.has_rule("criterion_missing"));
    }

    #[test]
    fn test_empty_tables_are_critical() {
        let report = check(&DataContext::default());
        assert!(report.has_rule("timeseries_empty"));
        assert!(report.has_rule("ranking_empty"));
        assert!(report.has_critical_issues());
    }
}
