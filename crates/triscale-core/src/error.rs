//! Engine error types.
//!
//! These errors represent failures in the scoring engine's data contracts.
//! Defined here so callers can distinguish fatal configuration problems from
//! per-call lookup failures without string matching.

use thiserror::Error;

/// Errors that can occur while loading reference data or scoring a cohort.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The reference table source is structurally broken (missing columns,
    /// unparseable rows). Aborts the load.
    #[error("malformed reference table: {0}")]
    MalformedTable(String),

    /// The reference table loaded but fails integrity validation
    /// (missing zero-correct entry, non-monotonic medians). Aborts before
    /// any scoring.
    #[error("reference table integrity violation: {0}")]
    Integrity(String),

    /// A lookup was requested for an area the table has no rows for.
    /// Fatal for that call only.
    #[error("unknown area: {0}")]
    UnknownArea(String),

    /// The area configuration is empty or entirely unrecognized.
    /// Aborts the whole run before Pass 1.
    #[error("invalid area configuration: {0}")]
    Configuration(String),
}

impl EngineError {
    /// Returns `true` if this error aborts an entire cohort run rather than
    /// a single lookup.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(
            self,
            EngineError::MalformedTable(_)
                | EngineError::Integrity(_)
                | EngineError::Configuration(_)
        )
    }
}
