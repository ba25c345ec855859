//! triscale-report — HTML export for scoring reports.

pub mod html;
