//! Per-student, per-area coherence analysis.
//!
//! Coherence measures whether a student's correct answers follow the
//! expected difficulty ordering (easy before hard), while deliberately
//! rewarding correct answers on questions the cohort found hard. A student
//! who beats genuinely hard questions is strong, not suspicious, so the
//! real-difficulty component carries the largest weight in the composite.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyTier;

/// Per-tier weights for the weighted-correctness component, easiest first.
pub const TIER_WEIGHTS: [f64; 5] = [1.0, 0.8, 0.5, 0.3, 0.1];

/// Default real-difficulty weight when the student answered nothing
/// correctly in the area.
pub const NEUTRAL_REAL_DIFFICULTY: f64 = 0.5;

/// Component weights of the composite: ordering, weighted correctness,
/// real difficulty.
const COMPOSITE_WEIGHTS: (f64, f64, f64) = (0.3, 0.3, 0.4);

/// Qualitative label for a composite coherence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoherenceLabel {
    /// ≥ 0.85 — correct answers cluster on easier questions as expected.
    Coherent,
    /// ≥ 0.65.
    Consistent,
    /// ≥ 0.45.
    PartiallyCoherent,
    /// < 0.45 — correct answers cluster on harder questions.
    Incoherent,
    /// The student answered no question in this area.
    NoResponse,
}

impl fmt::Display for CoherenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoherenceLabel::Coherent => write!(f, "coherent"),
            CoherenceLabel::Consistent => write!(f, "consistent"),
            CoherenceLabel::PartiallyCoherent => write!(f, "partially coherent"),
            CoherenceLabel::Incoherent => write!(f, "incoherent"),
            CoherenceLabel::NoResponse => write!(f, "no response"),
        }
    }
}

/// Result of the coherence analysis for one student in one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceResult {
    /// Correct answers per tier divided by total answered in the area,
    /// easiest tier first.
    pub tier_rates: [f64; 5],
    /// Composite coherence in [0, 1].
    pub composite: f64,
    /// Qualitative label for `composite`.
    pub label: CoherenceLabel,
}

impl CoherenceResult {
    /// Rate of correct answers in one tier.
    pub fn rate(&self, tier: DifficultyTier) -> f64 {
        self.tier_rates[tier.index()]
    }
}

/// Analyze one student/area.
///
/// `correct_by_tier` holds the count of correct answers per tier (easiest
/// first), `answered` the number of validly marked questions in the area,
/// and `real_difficulty` the mean of `1 - pct_correct` over the questions
/// the student answered correctly (pass
/// [`NEUTRAL_REAL_DIFFICULTY`] when none were correct).
pub fn analyze(correct_by_tier: &[u32; 5], answered: u32, real_difficulty: f64) -> CoherenceResult {
    if answered == 0 {
        return CoherenceResult {
            tier_rates: [0.0; 5],
            composite: 0.0,
            label: CoherenceLabel::NoResponse,
        };
    }

    let total = f64::from(answered);
    let mut tier_rates = [0.0; 5];
    for (rate, &correct) in tier_rates.iter_mut().zip(correct_by_tier) {
        *rate = f64::from(correct) / total;
    }

    // Expected pattern: very_easy ≥ easy ≥ medium ≥ hard ≥ very_hard.
    let held = tier_rates.windows(2).filter(|pair| pair[0] >= pair[1]).count();
    let ordering = held as f64 / 4.0;

    let weighted = tier_rates
        .iter()
        .zip(TIER_WEIGHTS)
        .map(|(rate, weight)| rate * weight)
        .sum::<f64>();

    let (w_ord, w_weighted, w_real) = COMPOSITE_WEIGHTS;
    let composite = ordering * w_ord + weighted * w_weighted + real_difficulty * w_real;

    let label = if composite >= 0.85 {
        CoherenceLabel::Coherent
    } else if composite >= 0.65 {
        CoherenceLabel::Consistent
    } else if composite >= 0.45 {
        CoherenceLabel::PartiallyCoherent
    } else {
        CoherenceLabel::Incoherent
    };

    CoherenceResult {
        tier_rates,
        composite,
        label,
    }
}
