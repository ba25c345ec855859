//! Scoring report types with JSON persistence.
//!
//! The engine's output ([`crate::engine::CohortOutcome`]) is deterministic;
//! [`ScoringReport`] wraps it with run metadata (id, timestamp) at
//! persistence time.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculator::ScoreResult;
use crate::difficulty::DifficultyTier;
use crate::engine::CohortOutcome;
use crate::model::AreaCode;

/// Scores for one student across all configured areas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentReport {
    pub student_id: String,
    pub name: String,
    /// Total correct answers across all areas.
    pub total_correct: u32,
    /// Classical raw score on the 0–4 scale (`total_correct / 90 · 4`).
    pub raw_score: f64,
    /// Mean of the per-area calibrated scores.
    pub overall_score: f64,
    /// Calibrated score records per area.
    pub area_scores: BTreeMap<AreaCode, ScoreResult>,
    /// Classical per-area scores on a 0–10 scale.
    pub classical_scores: BTreeMap<AreaCode, f64>,
}

/// Cohort-level aggregate of a scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
    pub cohort_size: usize,
    pub mean_overall: f64,
    pub min_overall: f64,
    pub max_overall: f64,
    pub mean_raw: f64,
    /// Question counts per difficulty tier from Pass 1.
    pub tier_distribution: BTreeMap<DifficultyTier, usize>,
}

/// A complete persisted scoring report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Cohort-level aggregate.
    pub cohort: CohortSummary,
    /// Per-student reports, in input order.
    pub students: Vec<StudentReport>,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
}

impl ScoringReport {
    /// Wrap an engine outcome with fresh run metadata.
    pub fn from_outcome(outcome: CohortOutcome, duration_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            cohort: outcome.summary,
            students: outcome.students,
            duration_ms,
        }
    }

    /// Save the report as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ScoringReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
