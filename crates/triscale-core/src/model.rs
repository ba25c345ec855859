//! Core data model types for triscale.
//!
//! These are the fundamental types the entire scoring pipeline uses to
//! represent subject areas, answer sheets, and cohort input.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// The four fixed subject areas scored independently.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AreaCode {
    /// Languages and codes.
    #[serde(rename = "LC")]
    Lc,
    /// Human sciences.
    #[serde(rename = "CH")]
    Ch,
    /// Natural sciences.
    #[serde(rename = "CN")]
    Cn,
    /// Mathematics.
    #[serde(rename = "MT")]
    Mt,
}

impl AreaCode {
    /// All four areas in canonical order.
    pub const ALL: [AreaCode; 4] = [AreaCode::Lc, AreaCode::Ch, AreaCode::Cn, AreaCode::Mt];

    /// Stable index for fixed-size per-area arrays.
    pub fn index(self) -> usize {
        match self {
            AreaCode::Lc => 0,
            AreaCode::Ch => 1,
            AreaCode::Cn => 2,
            AreaCode::Mt => 3,
        }
    }
}

impl fmt::Display for AreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaCode::Lc => write!(f, "LC"),
            AreaCode::Ch => write!(f, "CH"),
            AreaCode::Cn => write!(f, "CN"),
            AreaCode::Mt => write!(f, "MT"),
        }
    }
}

impl FromStr for AreaCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LC" => Ok(AreaCode::Lc),
            "CH" => Ok(AreaCode::Ch),
            "CN" => Ok(AreaCode::Cn),
            "MT" => Ok(AreaCode::Mt),
            other => Err(format!("unknown area code: {other}")),
        }
    }
}

/// Explicit finite mapping from free-text area labels to area codes.
///
/// Kept as a table rather than pattern matching so the accepted labels are
/// auditable in one place. Labels are the ones the original exam templates
/// ship with, plus the codes themselves.
const AREA_ALIASES: &[(&str, AreaCode)] = &[
    ("LC", AreaCode::Lc),
    ("Linguagens e Códigos", AreaCode::Lc),
    ("Linguagens", AreaCode::Lc),
    ("CH", AreaCode::Ch),
    ("Ciências Humanas", AreaCode::Ch),
    ("CN", AreaCode::Cn),
    ("Ciências da Natureza", AreaCode::Cn),
    ("MT", AreaCode::Mt),
    ("Matemática", AreaCode::Mt),
];

/// An inclusive question range assigned to one area.
pub type QuestionRange = (u32, u32);

/// Normalize free-text area names to the fixed code set.
///
/// Unrecognized names and reversed ranges are skipped with a warning; an
/// empty result is a [`EngineError::Configuration`] that aborts the run.
pub fn normalize_areas(
    areas: &BTreeMap<String, QuestionRange>,
) -> Result<BTreeMap<AreaCode, QuestionRange>, EngineError> {
    let mut normalized = BTreeMap::new();

    for (name, &(start, end)) in areas {
        let code = AREA_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name.trim()))
            .map(|(_, code)| *code);

        let Some(code) = code else {
            tracing::warn!("skipping unrecognized area name: {name:?}");
            continue;
        };
        if start == 0 || start > end {
            tracing::warn!("skipping area {code}: invalid question range {start}..={end}");
            continue;
        }
        tracing::debug!("area mapped: {name:?} -> {code} = {start}..={end}");
        normalized.insert(code, (start, end));
    }

    if normalized.is_empty() {
        return Err(EngineError::Configuration(format!(
            "no area could be normalized from {:?}",
            areas.keys().collect::<Vec<_>>()
        )));
    }

    Ok(normalized)
}

/// A single mark on an answer sheet, as recognized upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// A valid selected option (uppercase A–E).
    Option(char),
    /// No mark at all.
    Blank,
    /// Double-marked or otherwise unreadable.
    Invalid,
}

impl Mark {
    /// Parse a raw mark string from the recognition layer.
    ///
    /// `"X"` is the upstream sentinel for double/unreadable marks; anything
    /// that is not a single A–E letter counts as unanswered rather than an
    /// error.
    pub fn parse(raw: &str) -> Mark {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "-" {
            return Mark::Blank;
        }
        if trimmed.eq_ignore_ascii_case("X") {
            return Mark::Invalid;
        }
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => {
                let upper = c.to_ascii_uppercase();
                if ('A'..='E').contains(&upper) {
                    Mark::Option(upper)
                } else {
                    Mark::Invalid
                }
            }
            _ => Mark::Invalid,
        }
    }

    /// The selected option, if this mark is a valid answer.
    pub fn selected(&self) -> Option<char> {
        match self {
            Mark::Option(c) => Some(*c),
            _ => None,
        }
    }
}

/// One student's answer sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier for this student.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Raw marks keyed by question number. Missing questions count as blank.
    #[serde(default)]
    pub answers: BTreeMap<u32, String>,
}

impl Student {
    /// The parsed mark for a question (missing keys are blank).
    pub fn mark(&self, question: u32) -> Mark {
        self.answers
            .get(&question)
            .map(|raw| Mark::parse(raw))
            .unwrap_or(Mark::Blank)
    }
}

/// The official answer key: question number to correct option letter.
pub type AnswerKey = BTreeMap<u32, char>;

/// Everything an external collaborator hands the engine for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortInput {
    /// Official answer key.
    pub answer_key: AnswerKey,
    /// Free-text area names to inclusive question ranges.
    pub areas: BTreeMap<String, QuestionRange>,
    /// The cohort.
    #[serde(default)]
    pub students: Vec<Student>,
}

impl CohortInput {
    /// Load a cohort input file (JSON).
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read cohort input: {}", path.display()))?;
        let input: CohortInput =
            serde_json::from_str(&content).context("failed to parse cohort input JSON")?;
        Ok(input)
    }
}
