//! Central cohort scoring orchestrator.
//!
//! Runs the two strict passes: cohort-wide difficulty classification first,
//! then per-student coherence analysis and score calculation. Pass 2 is
//! embarrassingly parallel — each student depends only on the immutable
//! question statistics and their own marks — so it runs on a rayon parallel
//! iterator with order-preserving collection.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::calculator::{area_baselines, CalculatorConfig, ScoreCalculator, ScoreResult};
use crate::coherence::{analyze, NEUTRAL_REAL_DIFFICULTY};
use crate::difficulty::{classify_questions, tier_distribution, QuestionStat};
use crate::error::EngineError;
use crate::model::{normalize_areas, AnswerKey, AreaCode, QuestionRange, Student};
use crate::report::{CohortSummary, StudentReport};
use crate::statistics::summarize;
use crate::table::ReferenceTable;

/// Configuration for a cohort scoring run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Denominator of the classical raw score (total exam questions).
    pub raw_scale_questions: u32,
    /// Top of the classical raw scale.
    pub raw_scale_max: f64,
    /// Top of the per-area classical scale.
    pub classical_area_max: f64,
    /// Score calculator calibration.
    pub calculator: CalculatorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            raw_scale_questions: 90,
            raw_scale_max: 4.0,
            classical_area_max: 10.0,
            calculator: CalculatorConfig::default(),
        }
    }
}

/// Deterministic output of one cohort run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortOutcome {
    pub summary: CohortSummary,
    /// Per-student reports, in input order.
    pub students: Vec<StudentReport>,
}

/// Per-area tallies gathered from one student's marks.
#[derive(Debug, Default, Clone, Copy)]
struct AreaTally {
    answered: u32,
    correct: u32,
    correct_by_tier: [u32; 5],
    /// Sum of `1 - pct_correct` over correctly answered questions.
    real_difficulty_sum: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The cohort scoring engine. Holds a validated reference table and is
/// shareable read-only across runs.
pub struct CohortEngine {
    table: ReferenceTable,
    config: EngineConfig,
}

impl CohortEngine {
    /// Build an engine over a reference table, validating it up front so no
    /// scoring can start against a broken table.
    pub fn new(table: ReferenceTable, config: EngineConfig) -> Result<Self, EngineError> {
        table.validate()?;
        Ok(Self { table, config })
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    /// Score an entire cohort.
    ///
    /// Given identical inputs (including student order), two runs produce
    /// identical outcomes.
    pub fn process(
        &self,
        students: &[Student],
        answer_key: &AnswerKey,
        areas: &BTreeMap<String, QuestionRange>,
    ) -> Result<CohortOutcome, EngineError> {
        let normalized = normalize_areas(areas)?;
        tracing::info!(
            cohort_size = students.len(),
            areas = %normalized.keys().map(|a| a.to_string()).collect::<Vec<_>>().join(","),
            "starting cohort run"
        );

        // Only questions inside a configured range participate.
        let scoped_key: AnswerKey = answer_key
            .iter()
            .filter(|(&q, _)| normalized.values().any(|&(start, end)| (start..=end).contains(&q)))
            .map(|(&q, &opt)| (q, opt))
            .collect();

        // Pass 1: cohort-wide difficulty. Must fully complete before any
        // per-student scoring.
        let stats = classify_questions(students, &scoped_key);
        let distribution = tier_distribution(&stats);
        for (tier, count) in &distribution {
            tracing::debug!("difficulty {tier}: {count} questions");
        }

        // Pass 2: per-student scoring against the frozen statistics.
        let reports: Vec<StudentReport> = students
            .par_iter()
            .map(|student| self.score_student(student, &normalized, &scoped_key, &stats))
            .collect::<Result<Vec<_>, EngineError>>()?;

        tracing::info!(processed = reports.len(), "cohort run complete");

        let summary = summarize(&reports, distribution);
        Ok(CohortOutcome {
            summary,
            students: reports,
        })
    }

    fn score_student(
        &self,
        student: &Student,
        areas: &BTreeMap<AreaCode, QuestionRange>,
        answer_key: &AnswerKey,
        stats: &BTreeMap<u32, QuestionStat>,
    ) -> Result<StudentReport, EngineError> {
        let mut tallies: BTreeMap<AreaCode, AreaTally> = BTreeMap::new();

        for (&area, &(start, end)) in areas {
            let tally = tallies.entry(area).or_default();
            for question in start..=end {
                let Some(stat) = stats.get(&question) else {
                    continue;
                };
                let Some(selected) = student.mark(question).selected() else {
                    continue;
                };
                tally.answered += 1;
                if answer_key.get(&question) == Some(&selected) {
                    tally.correct += 1;
                    tally.correct_by_tier[stat.tier.index()] += 1;
                    tally.real_difficulty_sum += 1.0 - stat.pct_correct;
                }
            }
        }

        let correct_by_area: BTreeMap<AreaCode, u32> =
            tallies.iter().map(|(&area, tally)| (area, tally.correct)).collect();
        let baselines = area_baselines(&self.table, &correct_by_area)?;

        let calculator = ScoreCalculator::new(&self.table, &self.config.calculator);
        let mut area_scores: BTreeMap<AreaCode, ScoreResult> = BTreeMap::new();
        let mut classical_scores: BTreeMap<AreaCode, f64> = BTreeMap::new();

        for (&area, tally) in &tallies {
            let real_difficulty = if tally.correct > 0 {
                tally.real_difficulty_sum / f64::from(tally.correct)
            } else {
                NEUTRAL_REAL_DIFFICULTY
            };
            let coherence = analyze(&tally.correct_by_tier, tally.answered, real_difficulty);

            let others: Vec<f64> = baselines
                .iter()
                .filter(|(&other, _)| other != area)
                .map(|(_, &med)| med)
                .collect();

            let score = calculator.compute(area, tally.correct, Some(&coherence), &others)?;
            area_scores.insert(area, score);

            let (start, end) = areas[&area];
            let questions_in_area = end - start + 1;
            classical_scores.insert(
                area,
                round2(
                    f64::from(tally.correct) / f64::from(questions_in_area)
                        * self.config.classical_area_max,
                ),
            );
        }

        let total_correct: u32 = correct_by_area.values().sum();
        let raw_score = round2(
            f64::from(total_correct) / f64::from(self.config.raw_scale_questions)
                * self.config.raw_scale_max,
        );
        let overall_score = round1(
            area_scores.values().map(|s| s.final_score).sum::<f64>() / area_scores.len() as f64,
        );

        Ok(StudentReport {
            student_id: student.id.clone(),
            name: student.name.clone(),
            total_correct,
            raw_score,
            overall_score,
            area_scores,
            classical_scores,
        })
    }
}
