//! triscale-core — Cohort-calibrated exam scoring engine.
//!
//! This crate converts per-student answer sheets into calibrated scores using
//! an official historical reference table plus a pedagogical coherence
//! adjustment derived from cohort-wide question difficulty.

pub mod calculator;
pub mod coherence;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod model;
pub mod report;
pub mod statistics;
pub mod table;
