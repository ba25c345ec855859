//! Official reference table loading, validation, and lookup.
//!
//! The table maps `(area, correct count)` to the historical score band
//! `{min, med, max}` aggregated over the official reference years. It is
//! loaded once, validated, and then shared read-only across runs.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::AreaCode;

/// The required CSV columns, in no particular order.
const REQUIRED_COLUMNS: [&str; 5] = ["area", "acertos", "tri_min", "tri_med", "tri_max"];

/// One reference band: the historical min/median/max score for a given
/// area and correct-answer count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceBand {
    pub min: f64,
    pub med: f64,
    pub max: f64,
}

/// The immutable reference table: area → correct count → band.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    areas: BTreeMap<AreaCode, BTreeMap<u32, ReferenceBand>>,
}

/// Round to one decimal, matching the precision the official table is
/// published with.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl ReferenceTable {
    /// Load and parse a reference table from a CSV file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read reference table: {}", path.display()))?;
        let table = Self::from_csv_str(&content)
            .with_context(|| format!("in reference table {}", path.display()))?;
        Ok(table)
    }

    /// Parse a reference table from CSV text.
    ///
    /// Accepts comma- or semicolon-separated tables; semicolon-separated
    /// files may use the decimal comma the original spreadsheets export
    /// with. The header must contain `area,acertos,tri_min,tri_med,tri_max`.
    pub fn from_csv_str(content: &str) -> Result<Self, EngineError> {
        let mut lines = content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

        let (_, header) = lines.next().ok_or_else(|| {
            EngineError::MalformedTable("empty reference table source".into())
        })?;
        let sep = if header.contains(';') { ';' } else { ',' };

        let columns: Vec<&str> = header.split(sep).map(|c| c.trim()).collect();
        let mut indices = [0usize; 5];
        for (slot, required) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = columns
                .iter()
                .position(|c| c.eq_ignore_ascii_case(required))
                .ok_or_else(|| {
                    EngineError::MalformedTable(format!("missing required column: {required}"))
                })?;
        }
        let [area_idx, acertos_idx, min_idx, med_idx, max_idx] = indices;

        let parse_number = |field: &str, line_no: usize, what: &str| -> Result<f64, EngineError> {
            let normalized = if sep == ';' {
                field.trim().replace(',', ".")
            } else {
                field.trim().to_string()
            };
            normalized.parse::<f64>().map_err(|_| {
                EngineError::MalformedTable(format!(
                    "line {line_no}: invalid {what}: {field:?}"
                ))
            })
        };

        let mut areas: BTreeMap<AreaCode, BTreeMap<u32, ReferenceBand>> = BTreeMap::new();

        for (idx, line) in lines {
            let line_no = idx + 1;
            let fields: Vec<&str> = line.split(sep).collect();
            if fields.len() < columns.len() {
                return Err(EngineError::MalformedTable(format!(
                    "line {line_no}: expected {} fields, found {}",
                    columns.len(),
                    fields.len()
                )));
            }

            let area = AreaCode::from_str(fields[area_idx])
                .map_err(|e| EngineError::MalformedTable(format!("line {line_no}: {e}")))?;
            let correct_count: u32 = fields[acertos_idx].trim().parse().map_err(|_| {
                EngineError::MalformedTable(format!(
                    "line {line_no}: invalid correct count: {:?}",
                    fields[acertos_idx]
                ))
            })?;

            let band = ReferenceBand {
                min: round1(parse_number(fields[min_idx], line_no, "tri_min")?),
                med: round1(parse_number(fields[med_idx], line_no, "tri_med")?),
                max: round1(parse_number(fields[max_idx], line_no, "tri_max")?),
            };

            areas.entry(area).or_default().insert(correct_count, band);
        }

        if areas.is_empty() {
            return Err(EngineError::MalformedTable("reference table has no rows".into()));
        }

        Ok(Self { areas })
    }

    /// Validate table integrity: every loaded area must have a zero-correct
    /// entry, and medians must be monotone non-decreasing in correct count.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (area, entries) in &self.areas {
            if !entries.contains_key(&0) {
                return Err(EngineError::Integrity(format!(
                    "area {area} has no zero-correct entry"
                )));
            }
            let mut prev_med = f64::NEG_INFINITY;
            for (count, band) in entries {
                if band.med < prev_med {
                    return Err(EngineError::Integrity(format!(
                        "area {area}: median decreases at {count} correct ({} < {prev_med})",
                        band.med
                    )));
                }
                prev_med = band.med;
            }
        }
        Ok(())
    }

    /// Look up the reference band for an area and correct count.
    ///
    /// Counts above the largest tabulated value clamp down to the largest
    /// tabulated entry (never extrapolated upward); a gap in the table
    /// resolves to the nearest entry at or below the request.
    pub fn lookup(&self, area: AreaCode, correct_count: u32) -> Result<ReferenceBand, EngineError> {
        let entries = self
            .areas
            .get(&area)
            .ok_or_else(|| EngineError::UnknownArea(area.to_string()))?;

        entries
            .range(..=correct_count)
            .next_back()
            .or_else(|| entries.iter().next())
            .map(|(_, band)| *band)
            .ok_or_else(|| EngineError::UnknownArea(area.to_string()))
    }

    /// The areas this table carries entries for.
    pub fn areas(&self) -> impl Iterator<Item = AreaCode> + '_ {
        self.areas.keys().copied()
    }

    /// The largest tabulated correct count for an area.
    pub fn max_correct(&self, area: AreaCode) -> Option<u32> {
        self.areas.get(&area)?.keys().next_back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_TABLE: &str = "\
area,acertos,tri_min,tri_med,tri_max
LC,0,250.0,299.6,330.0
LC,1,260.0,310.0,350.0
LC,2,270.0,325.0,370.0
MT,0,280.0,342.8,360.0
MT,1,300.0,360.0,400.0
";

    #[test]
    fn parse_and_lookup() {
        let table = ReferenceTable::from_csv_str(SMALL_TABLE).unwrap();
        table.validate().unwrap();

        let band = table.lookup(AreaCode::Lc, 1).unwrap();
        assert_eq!(band.med, 310.0);
        assert_eq!(table.max_correct(AreaCode::Lc), Some(2));
    }

    #[test]
    fn lookup_clamps_above_largest_tabulated() {
        let table = ReferenceTable::from_csv_str(SMALL_TABLE).unwrap();
        let band = table.lookup(AreaCode::Lc, 45).unwrap();
        assert_eq!(band.med, 325.0);
    }

    #[test]
    fn lookup_gap_resolves_downward() {
        let gappy = "\
area,acertos,tri_min,tri_med,tri_max
CH,0,300.0,329.8,350.0
CH,5,330.0,370.0,410.0
";
        let table = ReferenceTable::from_csv_str(gappy).unwrap();
        let band = table.lookup(AreaCode::Ch, 3).unwrap();
        assert_eq!(band.med, 329.8);
    }

    #[test]
    fn lookup_unknown_area() {
        let table = ReferenceTable::from_csv_str(SMALL_TABLE).unwrap();
        assert!(matches!(
            table.lookup(AreaCode::Cn, 0),
            Err(EngineError::UnknownArea(_))
        ));
    }

    #[test]
    fn missing_column_is_malformed() {
        let bad = "area,acertos,tri_min,tri_max\nLC,0,250.0,330.0\n";
        assert!(matches!(
            ReferenceTable::from_csv_str(bad),
            Err(EngineError::MalformedTable(_))
        ));
    }

    #[test]
    fn unknown_area_name_is_malformed() {
        let bad = "area,acertos,tri_min,tri_med,tri_max\nZZ,0,250.0,300.0,330.0\n";
        assert!(matches!(
            ReferenceTable::from_csv_str(bad),
            Err(EngineError::MalformedTable(_))
        ));
    }

    #[test]
    fn missing_zero_entry_fails_validation() {
        let bad = "area,acertos,tri_min,tri_med,tri_max\nLC,1,260.0,310.0,350.0\n";
        let table = ReferenceTable::from_csv_str(bad).unwrap();
        assert!(matches!(table.validate(), Err(EngineError::Integrity(_))));
    }

    #[test]
    fn decreasing_median_fails_validation() {
        let bad = "\
area,acertos,tri_min,tri_med,tri_max
LC,0,250.0,320.0,330.0
LC,1,260.0,310.0,350.0
";
        let table = ReferenceTable::from_csv_str(bad).unwrap();
        assert!(matches!(table.validate(), Err(EngineError::Integrity(_))));
    }

    #[test]
    fn semicolon_separator_with_decimal_comma() {
        let csv = "area;acertos;tri_min;tri_med;tri_max\nLC;0;250,5;299,6;330,0\n";
        let table = ReferenceTable::from_csv_str(csv).unwrap();
        let band = table.lookup(AreaCode::Lc, 0).unwrap();
        assert_eq!(band.min, 250.5);
        assert_eq!(band.med, 299.6);
    }

    #[test]
    fn values_round_to_one_decimal() {
        let csv = "area,acertos,tri_min,tri_med,tri_max\nMT,0,280.04,342.76,359.99\n";
        let table = ReferenceTable::from_csv_str(csv).unwrap();
        let band = table.lookup(AreaCode::Mt, 0).unwrap();
        assert_eq!(band.min, 280.0);
        assert_eq!(band.med, 342.8);
        assert_eq!(band.max, 360.0);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        std::fs::write(&path, SMALL_TABLE).unwrap();
        let table = ReferenceTable::load(&path).unwrap();
        assert_eq!(table.areas().count(), 2);
    }
}
