//! Cohort-level aggregate statistics.
//!
//! Aggregation is commutative and associative (mean/min/max over per-student
//! values), so it tolerates any merge order from the parallel pass.

use std::collections::BTreeMap;

use crate::difficulty::DifficultyTier;
use crate::report::{CohortSummary, StudentReport};

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregate per-student reports into a cohort summary.
///
/// An empty cohort yields an all-zero summary rather than NaNs.
pub fn summarize(
    students: &[StudentReport],
    tier_distribution: BTreeMap<DifficultyTier, usize>,
) -> CohortSummary {
    if students.is_empty() {
        return CohortSummary {
            cohort_size: 0,
            mean_overall: 0.0,
            min_overall: 0.0,
            max_overall: 0.0,
            mean_raw: 0.0,
            tier_distribution,
        };
    }

    let n = students.len() as f64;
    let mut sum_overall = 0.0;
    let mut min_overall = f64::INFINITY;
    let mut max_overall = f64::NEG_INFINITY;
    let mut sum_raw = 0.0;

    for student in students {
        sum_overall += student.overall_score;
        min_overall = min_overall.min(student.overall_score);
        max_overall = max_overall.max(student.overall_score);
        sum_raw += student.raw_score;
    }

    CohortSummary {
        cohort_size: students.len(),
        mean_overall: round1(sum_overall / n),
        min_overall,
        max_overall,
        mean_raw: round2(sum_raw / n),
        tier_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(overall: f64, raw: f64) -> StudentReport {
        StudentReport {
            student_id: "s".into(),
            name: "s".into(),
            total_correct: 0,
            raw_score: raw,
            overall_score: overall,
            area_scores: BTreeMap::new(),
            classical_scores: BTreeMap::new(),
        }
    }

    #[test]
    fn summarize_basic() {
        let students = vec![student(400.0, 1.0), student(500.0, 2.0), student(450.0, 1.5)];
        let summary = summarize(&students, BTreeMap::new());
        assert_eq!(summary.cohort_size, 3);
        assert_eq!(summary.mean_overall, 450.0);
        assert_eq!(summary.min_overall, 400.0);
        assert_eq!(summary.max_overall, 500.0);
        assert_eq!(summary.mean_raw, 1.5);
    }

    #[test]
    fn summarize_empty_cohort_is_zeroed() {
        let summary = summarize(&[], BTreeMap::new());
        assert_eq!(summary.cohort_size, 0);
        assert_eq!(summary.mean_overall, 0.0);
        assert_eq!(summary.min_overall, 0.0);
        assert_eq!(summary.max_overall, 0.0);
    }

    #[test]
    fn summarize_is_order_independent() {
        let a = vec![student(400.0, 1.0), student(500.0, 2.0)];
        let b = vec![student(500.0, 2.0), student(400.0, 1.0)];
        assert_eq!(
            summarize(&a, BTreeMap::new()).mean_overall,
            summarize(&b, BTreeMap::new()).mean_overall
        );
    }
}
