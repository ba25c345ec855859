//! Pass 1: cohort-wide question difficulty classification.
//!
//! For every keyed question, the fraction of the whole cohort that answered
//! it correctly is computed and bucketed into five ordered tiers. This pass
//! must fully complete before any per-student scoring begins.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{AnswerKey, Student};

/// Tier breakpoints on the cohort correctness rate, highest first.
pub const TIER_BREAKPOINTS: [f64; 4] = [0.80, 0.60, 0.40, 0.20];

/// Question difficulty, derived from the cohort correctness rate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    VeryEasy,
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl DifficultyTier {
    /// All tiers, easiest first.
    pub const ALL: [DifficultyTier; 5] = [
        DifficultyTier::VeryEasy,
        DifficultyTier::Easy,
        DifficultyTier::Medium,
        DifficultyTier::Hard,
        DifficultyTier::VeryHard,
    ];

    /// Stable index for fixed-size per-tier arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Bucket a cohort correctness rate into a tier.
    ///
    /// Breakpoints are inclusive on the high side: exactly 0.80 is very
    /// easy, anything strictly below 0.20 is very hard.
    pub fn classify(pct_correct: f64) -> DifficultyTier {
        if pct_correct >= TIER_BREAKPOINTS[0] {
            DifficultyTier::VeryEasy
        } else if pct_correct >= TIER_BREAKPOINTS[1] {
            DifficultyTier::Easy
        } else if pct_correct >= TIER_BREAKPOINTS[2] {
            DifficultyTier::Medium
        } else if pct_correct >= TIER_BREAKPOINTS[3] {
            DifficultyTier::Hard
        } else {
            DifficultyTier::VeryHard
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyTier::VeryEasy => write!(f, "very_easy"),
            DifficultyTier::Easy => write!(f, "easy"),
            DifficultyTier::Medium => write!(f, "medium"),
            DifficultyTier::Hard => write!(f, "hard"),
            DifficultyTier::VeryHard => write!(f, "very_hard"),
        }
    }
}

/// Cohort statistics for a single question.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuestionStat {
    /// Students that marked the correct option.
    pub correct_count: u32,
    /// Cohort size. Non-respondents are included, never excluded.
    pub total_respondents: u32,
    /// `correct_count / total_respondents`, or 0.0 for an empty cohort.
    pub pct_correct: f64,
    /// Tier derived from `pct_correct`.
    pub tier: DifficultyTier,
}

/// Classify every keyed question by cohort correctness.
///
/// Blank, invalid, and missing marks count as incorrect; the denominator is
/// always the full cohort size. An empty cohort defines every rate as 0.0.
pub fn classify_questions(
    students: &[Student],
    answer_key: &AnswerKey,
) -> BTreeMap<u32, QuestionStat> {
    let cohort_size = students.len() as u32;
    let mut stats = BTreeMap::new();

    for (&question, &correct_option) in answer_key {
        let correct_count = students
            .iter()
            .filter(|s| s.mark(question).selected() == Some(correct_option))
            .count() as u32;

        let pct_correct = if cohort_size > 0 {
            f64::from(correct_count) / f64::from(cohort_size)
        } else {
            0.0
        };

        stats.insert(
            question,
            QuestionStat {
                correct_count,
                total_respondents: cohort_size,
                pct_correct,
                tier: DifficultyTier::classify(pct_correct),
            },
        );
    }

    stats
}

/// Count questions per tier, for the cohort report.
pub fn tier_distribution(
    stats: &BTreeMap<u32, QuestionStat>,
) -> BTreeMap<DifficultyTier, usize> {
    let mut counts: BTreeMap<DifficultyTier, usize> =
        DifficultyTier::ALL.iter().map(|&t| (t, 0)).collect();
    for stat in stats.values() {
        if let Some(count) = counts.get_mut(&stat.tier) {
            *count += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn student(id: &str, answers: &[(u32, &str)]) -> Student {
        Student {
            id: id.into(),
            name: id.into(),
            answers: answers.iter().map(|&(q, a)| (q, a.to_string())).collect(),
        }
    }

    #[test]
    fn classify_tier_boundaries() {
        assert_eq!(DifficultyTier::classify(1.0), DifficultyTier::VeryEasy);
        assert_eq!(DifficultyTier::classify(0.80), DifficultyTier::VeryEasy);
        assert_eq!(DifficultyTier::classify(0.799999), DifficultyTier::Easy);
        assert_eq!(DifficultyTier::classify(0.60), DifficultyTier::Easy);
        assert_eq!(DifficultyTier::classify(0.59), DifficultyTier::Medium);
        assert_eq!(DifficultyTier::classify(0.40), DifficultyTier::Medium);
        assert_eq!(DifficultyTier::classify(0.20), DifficultyTier::Hard);
        assert_eq!(DifficultyTier::classify(0.199), DifficultyTier::VeryHard);
        assert_eq!(DifficultyTier::classify(0.0), DifficultyTier::VeryHard);
    }

    #[test]
    fn pct_correct_counts_whole_cohort() {
        // 5 students; 4 answer q1 correctly, one leaves it blank.
        let students = vec![
            student("s1", &[(1, "A")]),
            student("s2", &[(1, "A")]),
            student("s3", &[(1, "A")]),
            student("s4", &[(1, "A")]),
            student("s5", &[]),
        ];
        let key: AnswerKey = BTreeMap::from([(1, 'A')]);

        let stats = classify_questions(&students, &key);
        let stat = &stats[&1];
        assert_eq!(stat.correct_count, 4);
        assert_eq!(stat.total_respondents, 5);
        assert!((stat.pct_correct - 0.8).abs() < f64::EPSILON);
        assert_eq!(stat.tier, DifficultyTier::VeryEasy);
    }

    #[test]
    fn invalid_marks_count_as_incorrect() {
        let students = vec![student("s1", &[(1, "X")]), student("s2", &[(1, "B")])];
        let key: AnswerKey = BTreeMap::from([(1, 'A')]);
        let stats = classify_questions(&students, &key);
        assert_eq!(stats[&1].correct_count, 0);
        assert_eq!(stats[&1].tier, DifficultyTier::VeryHard);
    }

    #[test]
    fn empty_cohort_defines_zero_rates() {
        let key: AnswerKey = BTreeMap::from([(1, 'A'), (2, 'B')]);
        let stats = classify_questions(&[], &key);
        assert_eq!(stats.len(), 2);
        for stat in stats.values() {
            assert_eq!(stat.pct_correct, 0.0);
            assert_eq!(stat.total_respondents, 0);
        }
    }

    #[test]
    fn distribution_covers_all_tiers() {
        let students = vec![
            student("s1", &[(1, "A"), (2, "B")]),
            student("s2", &[(1, "A")]),
        ];
        let key: AnswerKey = BTreeMap::from([(1, 'A'), (2, 'B'), (3, 'C')]);
        let stats = classify_questions(&students, &key);
        let dist = tier_distribution(&stats);

        assert_eq!(dist[&DifficultyTier::VeryEasy], 1); // q1: 2/2
        assert_eq!(dist[&DifficultyTier::Medium], 1); // q2: 1/2
        assert_eq!(dist[&DifficultyTier::VeryHard], 1); // q3: 0/2
        assert_eq!(dist.values().sum::<usize>(), 3);
    }
}
