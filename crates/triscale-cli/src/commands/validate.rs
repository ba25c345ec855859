//! The `triscale validate` command.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;

use triscale_core::model::{normalize_areas, CohortInput, Mark};
use triscale_core::table::ReferenceTable;

pub fn execute(table_path: PathBuf, cohort_path: Option<PathBuf>) -> Result<()> {
    let table = ReferenceTable::load(&table_path)?;
    table.validate()?;

    let areas: Vec<_> = table.areas().collect();
    println!("Reference table: {} areas", areas.len());
    for area in &areas {
        let max = table.max_correct(*area).unwrap_or(0);
        println!("  {area}: 0..={max} correct");
    }

    let mut total_warnings = 0;

    if let Some(cohort_path) = cohort_path {
        let input = CohortInput::load_json(&cohort_path)?;
        let normalized = normalize_areas(&input.areas)?;

        println!(
            "\nCohort: {} students, {} areas, {} answer-key entries",
            input.students.len(),
            input.areas.len(),
            input.answer_key.len()
        );

        for area in normalized.keys() {
            if !areas.contains(area) {
                println!("  WARNING: area {area} has no reference table entries");
                total_warnings += 1;
            }
        }

        for (area, (start, end)) in &normalized {
            let missing: Vec<u32> = (*start..=*end)
                .filter(|q| !input.answer_key.contains_key(q))
                .collect();
            if !missing.is_empty() {
                println!(
                    "  WARNING: area {area} is missing {} answer-key entries (e.g. question {})",
                    missing.len(),
                    missing[0]
                );
                total_warnings += 1;
            }
        }

        let mut seen = BTreeSet::new();
        for student in &input.students {
            if !seen.insert(student.id.as_str()) {
                println!("  WARNING: duplicate student id '{}'", student.id);
                total_warnings += 1;
            }
            let invalid = student
                .answers
                .iter()
                .filter(|(q, _)| matches!(student.mark(**q), Mark::Invalid))
                .count();
            if invalid > 0 {
                println!(
                    "  [{}] WARNING: {invalid} answers are not A-E and will score as wrong",
                    student.id
                );
                total_warnings += 1;
            }
        }
    }

    if total_warnings == 0 {
        println!("All inputs valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
