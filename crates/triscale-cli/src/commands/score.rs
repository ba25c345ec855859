//! The `triscale score` command.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use triscale_core::engine::{CohortEngine, CohortOutcome, EngineConfig};
use triscale_core::model::CohortInput;
use triscale_core::report::ScoringReport;
use triscale_core::table::ReferenceTable;
use triscale_report::html::write_html_report;

pub fn execute(
    table_path: PathBuf,
    cohort_path: PathBuf,
    output: PathBuf,
    format: String,
    parallelism: usize,
) -> Result<()> {
    if parallelism > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .build_global()
            .context("failed to configure the scoring thread pool")?;
    }

    let table = ReferenceTable::load(&table_path)?;
    let input = CohortInput::load_json(&cohort_path)?;
    let engine = CohortEngine::new(table, EngineConfig::default())?;

    eprintln!(
        "triscale v0.1.0 — scoring {} students across {} areas",
        input.students.len(),
        input.areas.len()
    );
    eprintln!();

    let started = Instant::now();
    let outcome = engine.process(&input.students, &input.answer_key, &input.areas)?;
    let duration_ms = started.elapsed().as_millis() as u64;
    tracing::info!(duration_ms, cohort_size = outcome.students.len(), "cohort scored");

    print_summary(&outcome);

    let report = ScoringReport::from_outcome(outcome, duration_ms);

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html"]
    } else {
        format.split(',').collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}

fn print_summary(outcome: &CohortOutcome) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Student", "Correct", "Raw", "Overall"]);

    for student in &outcome.students {
        table.add_row(vec![
            Cell::new(&student.name),
            Cell::new(student.total_correct),
            Cell::new(format!("{:.2}", student.raw_score)),
            Cell::new(format!("{:.1}", student.overall_score)),
        ]);
    }

    eprintln!("\n{table}");

    let s = &outcome.summary;
    eprintln!(
        "Cohort: {} students, mean {:.1}, range {:.1}..{:.1}",
        s.cohort_size, s.mean_overall, s.min_overall, s.max_overall
    );
    let dist: Vec<String> = s
        .tier_distribution
        .iter()
        .map(|(tier, count)| format!("{tier}={count}"))
        .collect();
    eprintln!("Difficulty: {}", dist.join(", "));
}
