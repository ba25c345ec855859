//! Per-area score calculation.
//!
//! Combines the reference-table baseline with the coherence analysis and a
//! cross-area relational signal into a final bounded score, recording every
//! applied adjustment in an explanation trail.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coherence::CoherenceResult;
use crate::difficulty::DifficultyTier;
use crate::error::EngineError;
use crate::model::AreaCode;
use crate::table::ReferenceTable;

/// Calibration constants for the score calculator.
///
/// The defaults reproduce the historically calibrated values; they are
/// configuration, not hard-coded literals, so a future ground-truth dataset
/// can recalibrate them without touching the arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Share of the table's `[min, max]` range the coherence adjustment may
    /// move the baseline by, in either direction.
    pub adjustment_range_share: f64,
    /// Correct-rate threshold above which the very-hard tier bonus fires.
    pub very_hard_bonus_threshold: f64,
    /// Points per unit of very-hard correct rate.
    pub very_hard_bonus_factor: f64,
    /// Correct-rate threshold above which the hard tier bonus fires
    /// (only when the very-hard bonus did not).
    pub hard_bonus_threshold: f64,
    /// Points per unit of hard correct rate.
    pub hard_bonus_factor: f64,
    /// Baseline gap to the mean of the other areas that triggers the
    /// relational adjustment.
    pub relational_gap: f64,
    /// Magnitude of the relational adjustment.
    pub relational_step: f64,
    /// Absolute historical ceilings per area, indexed by [`AreaCode::index`].
    /// Never exceeded, even when the table carries larger values.
    pub ceilings: [f64; 4],
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            adjustment_range_share: 0.5,
            very_hard_bonus_threshold: 0.3,
            very_hard_bonus_factor: 20.0,
            hard_bonus_threshold: 0.3,
            hard_bonus_factor: 10.0,
            relational_gap: 50.0,
            relational_step: 5.0,
            // Official historical maxima: LC, CH, CN, MT.
            ceilings: [790.0, 820.0, 870.0, 980.0],
        }
    }
}

impl CalculatorConfig {
    /// The absolute ceiling for one area.
    pub fn ceiling(&self, area: AreaCode) -> f64 {
        self.ceilings[area.index()]
    }
}

/// Final score record for one student in one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub area: AreaCode,
    pub correct_count: u32,
    /// Table median for this correct count.
    pub baseline: f64,
    /// Coherence bonus (including difficulty bonuses), ≥ 0.
    pub coherence_adjustment: f64,
    /// Relational adjustment, one of `-step`, `0`, `+step`.
    pub relational_adjustment: f64,
    /// Incoherence penalty, ≥ 0.
    pub penalty: f64,
    /// Bounded final score.
    pub final_score: f64,
    /// Ordered trail of applied adjustments with magnitudes. Byte-for-byte
    /// reproducible from identical inputs.
    pub explanation: Vec<String>,
}

/// Calculates bounded scores against a validated reference table.
pub struct ScoreCalculator<'a> {
    table: &'a ReferenceTable,
    config: &'a CalculatorConfig,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl<'a> ScoreCalculator<'a> {
    pub fn new(table: &'a ReferenceTable, config: &'a CalculatorConfig) -> Self {
        Self { table, config }
    }

    /// Compute the score for one (student, area).
    ///
    /// `coherence` is `None` when no per-question data exists for the
    /// student (treated as neutral: no adjustment either way).
    /// `other_baselines` holds the table medians of the student's other
    /// areas, used for the relational adjustment.
    pub fn compute(
        &self,
        area: AreaCode,
        correct_count: u32,
        coherence: Option<&CoherenceResult>,
        other_baselines: &[f64],
    ) -> Result<ScoreResult, EngineError> {
        // Zero correct answers always yields the official median verbatim.
        // No adjustment may ever inflate a zero-correct result.
        if correct_count == 0 {
            let band = self.table.lookup(area, 0)?;
            return Ok(ScoreResult {
                area,
                correct_count: 0,
                baseline: band.med,
                coherence_adjustment: 0.0,
                relational_adjustment: 0.0,
                penalty: 0.0,
                final_score: band.med,
                explanation: vec![format!(
                    "zero correct: official median {:.1} without adjustments",
                    band.med
                )],
            });
        }

        let band = self.table.lookup(area, correct_count)?;
        let range = band.max - band.min;
        let mut explanation = vec![format!(
            "{area}: {correct_count} correct, baseline {:.1}",
            band.med
        )];

        let mut coherence_adjustment = 0.0;
        let mut penalty = 0.0;

        if let Some(analysis) = coherence {
            let composite = analysis.composite;
            let half_range = range * self.config.adjustment_range_share;

            // 0.5 is the neutral point: above it the score moves toward the
            // table max, below it toward the table min.
            if composite >= 0.5 {
                coherence_adjustment = (composite - 0.5) * 2.0 * half_range;
                if coherence_adjustment > 0.5 {
                    explanation.push(format!(
                        "coherence {composite:.2}: +{coherence_adjustment:.1}"
                    ));
                }
            } else {
                penalty = (0.5 - composite) * 2.0 * half_range;
                if penalty > 0.5 {
                    explanation.push(format!("incoherence {composite:.2}: -{penalty:.1}"));
                }
            }

            // Beating questions few in the cohort got right is exceptional;
            // the very-hard bonus takes priority over the hard one.
            let very_hard_rate = analysis.rate(DifficultyTier::VeryHard);
            let hard_rate = analysis.rate(DifficultyTier::Hard);
            if very_hard_rate > self.config.very_hard_bonus_threshold {
                let bonus = very_hard_rate * self.config.very_hard_bonus_factor;
                coherence_adjustment += bonus;
                explanation.push(format!("very-hard bonus: +{bonus:.1}"));
            } else if hard_rate > self.config.hard_bonus_threshold {
                let bonus = hard_rate * self.config.hard_bonus_factor;
                coherence_adjustment += bonus;
                explanation.push(format!("hard bonus: +{bonus:.1}"));
            }
        }

        let mut relational_adjustment = 0.0;
        if !other_baselines.is_empty() {
            let mean_others =
                other_baselines.iter().sum::<f64>() / other_baselines.len() as f64;
            let gap = band.med - mean_others;
            if gap > self.config.relational_gap {
                relational_adjustment = -self.config.relational_step;
                explanation.push(format!(
                    "relational: {:.1} above other areas, {relational_adjustment:+.1}",
                    gap
                ));
            } else if gap < -self.config.relational_gap {
                relational_adjustment = self.config.relational_step;
                explanation.push(format!(
                    "relational: {:.1} below other areas, {relational_adjustment:+.1}",
                    -gap
                ));
            }
        }

        let unbounded = band.med + coherence_adjustment + relational_adjustment - penalty;
        let mut final_score = unbounded.clamp(band.min, band.max);
        if final_score != unbounded {
            explanation.push(format!(
                "clamped to table range [{:.1}, {:.1}]",
                band.min, band.max
            ));
        }

        let ceiling = self.config.ceiling(area);
        if final_score > ceiling {
            explanation.push(format!("capped at official ceiling {ceiling:.1}"));
            final_score = ceiling;
        }

        Ok(ScoreResult {
            area,
            correct_count,
            baseline: band.med,
            coherence_adjustment,
            relational_adjustment,
            penalty,
            final_score: round1(final_score),
            explanation,
        })
    }
}

/// Table medians for a set of per-area correct counts, used to feed the
/// relational adjustment.
pub fn area_baselines(
    table: &ReferenceTable,
    correct_by_area: &BTreeMap<AreaCode, u32>,
) -> Result<BTreeMap<AreaCode, f64>, EngineError> {
    correct_by_area
        .iter()
        .map(|(&area, &correct)| Ok((area, table.lookup(area, correct)?.med)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coherence::analyze;

    fn table() -> ReferenceTable {
        let csv = "\
area,acertos,tri_min,tri_med,tri_max
LC,0,250.0,299.6,330.0
LC,10,380.0,420.0,470.0
LC,20,480.0,530.0,580.0
MT,0,280.0,342.8,360.0
MT,5,330.0,365.0,395.0
MT,45,700.0,960.0,995.0
";
        ReferenceTable::from_csv_str(csv).unwrap()
    }

    fn calc_compute(
        area: AreaCode,
        correct: u32,
        coherence: Option<&CoherenceResult>,
        others: &[f64],
    ) -> ScoreResult {
        let table = table();
        let config = CalculatorConfig::default();
        let calc = ScoreCalculator::new(&table, &config);
        calc.compute(area, correct, coherence, others).unwrap()
    }

    #[test]
    fn zero_correct_is_official_median_verbatim() {
        // Even a perfect coherence result must not move a zero-correct score.
        let perfect = analyze(&[5, 3, 2, 0, 0], 10, 0.9);
        let result = calc_compute(AreaCode::Lc, 0, Some(&perfect), &[500.0, 600.0]);
        assert_eq!(result.final_score, 299.6);
        assert_eq!(result.coherence_adjustment, 0.0);
        assert_eq!(result.relational_adjustment, 0.0);
        assert_eq!(result.penalty, 0.0);
    }

    #[test]
    fn neutral_without_coherence_data() {
        let result = calc_compute(AreaCode::Lc, 10, None, &[]);
        assert_eq!(result.final_score, 420.0);
        assert_eq!(result.coherence_adjustment, 0.0);
        assert_eq!(result.penalty, 0.0);
    }

    #[test]
    fn high_coherence_adds_bonus_within_range() {
        // composite ≈ 0.912 -> bonus ≈ (0.412)*2*45 ≈ 37.1 over baseline 420,
        // clamped nowhere (max 470).
        let coherent = analyze(&[5, 3, 2, 0, 0], 10, 0.9);
        let result = calc_compute(AreaCode::Lc, 10, Some(&coherent), &[]);
        assert!(result.final_score > 420.0);
        assert!(result.final_score <= 470.0);
        assert!(result.coherence_adjustment > 0.0);
        assert_eq!(result.penalty, 0.0);
    }

    #[test]
    fn low_coherence_penalizes_within_range() {
        // All correct answers in the hardest tier of an easy cohort.
        let incoherent = analyze(&[0, 0, 0, 0, 2], 10, 0.1);
        let result = calc_compute(AreaCode::Lc, 10, Some(&incoherent), &[]);
        assert!(result.final_score < 420.0);
        assert!(result.final_score >= 380.0);
        assert!(result.penalty > 0.0);
    }

    #[test]
    fn very_hard_bonus_takes_priority_over_hard() {
        // Both tiers above the 0.3 rate threshold: only the very-hard bonus
        // applies (0.4 * 20 = 8.0).
        let analysis = analyze(&[0, 0, 0, 4, 4], 10, 0.5);
        assert!(analysis.rate(DifficultyTier::Hard) > 0.3);
        assert!(analysis.rate(DifficultyTier::VeryHard) > 0.3);

        let result = calc_compute(AreaCode::Lc, 10, Some(&analysis), &[]);
        assert!(result
            .explanation
            .iter()
            .any(|line| line.starts_with("very-hard bonus")));
        assert!(!result.explanation.iter().any(|line| line.starts_with("hard bonus")));
    }

    #[test]
    fn hard_bonus_fires_alone() {
        let analysis = analyze(&[0, 0, 0, 4, 0], 10, 0.5);
        let result = calc_compute(AreaCode::Lc, 10, Some(&analysis), &[]);
        assert!(result.explanation.iter().any(|line| line.starts_with("hard bonus")));
    }

    #[test]
    fn relational_adjustment_directions() {
        // LC baseline 530 vs mean others 342.8 -> far above -> -5.
        let above = calc_compute(AreaCode::Lc, 20, None, &[342.8]);
        assert_eq!(above.relational_adjustment, -5.0);

        // MT baseline 365 vs mean others 530 -> far below -> +5.
        let below = calc_compute(AreaCode::Mt, 5, None, &[530.0]);
        assert_eq!(below.relational_adjustment, 5.0);

        // Small gap -> no adjustment.
        let near = calc_compute(AreaCode::Lc, 10, None, &[410.0]);
        assert_eq!(near.relational_adjustment, 0.0);
    }

    #[test]
    fn final_score_clamped_to_table_band() {
        // Maximal bonus stack still cannot leave [min, max].
        let analysis = analyze(&[0, 0, 0, 0, 10], 10, 1.0);
        let result = calc_compute(AreaCode::Lc, 10, Some(&analysis), &[900.0]);
        assert!(result.final_score >= 380.0);
        assert!(result.final_score <= 470.0);
    }

    #[test]
    fn ceiling_caps_above_table_values() {
        // MT at 45 correct has table max 995 but the official ceiling is 980.
        let analysis = analyze(&[0, 0, 0, 0, 10], 10, 1.0);
        let result = calc_compute(AreaCode::Mt, 45, Some(&analysis), &[]);
        assert!(result.final_score <= 980.0);
    }

    #[test]
    fn explanation_is_reproducible() {
        let analysis = analyze(&[1, 1, 2, 4, 2], 12, 0.62);
        let a = calc_compute(AreaCode::Lc, 10, Some(&analysis), &[480.0]);
        let b = calc_compute(AreaCode::Lc, 10, Some(&analysis), &[480.0]);
        assert_eq!(a.explanation, b.explanation);
        assert_eq!(a, b);
    }

    #[test]
    fn baseline_monotone_in_correct_count() {
        let table = table();
        let mut prev = f64::NEG_INFINITY;
        for correct in 0..=45 {
            let med = table.lookup(AreaCode::Lc, correct).unwrap().med;
            assert!(med >= prev, "median decreased at {correct} correct");
            prev = med;
        }
    }

    #[test]
    fn area_baselines_uses_table_medians() {
        let table = table();
        let counts = BTreeMap::from([(AreaCode::Lc, 10), (AreaCode::Mt, 5)]);
        let baselines = area_baselines(&table, &counts).unwrap();
        assert_eq!(baselines[&AreaCode::Lc], 420.0);
        assert_eq!(baselines[&AreaCode::Mt], 365.0);
    }
}
