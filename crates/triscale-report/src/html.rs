//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use triscale_core::report::ScoringReport;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML document from a scoring report.
pub fn generate_html(report: &ScoringReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>triscale report</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>triscale scoring report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} students | {}</p>\n",
        report.cohort.cohort_size,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Cohort summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Cohort</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str(
        "<thead><tr><th>Students</th><th>Mean score</th><th>Min</th><th>Max</th><th>Mean raw</th></tr></thead>\n",
    );
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{:.2}</td></tr></tbody>\n",
        report.cohort.cohort_size,
        report.cohort.mean_overall,
        report.cohort.min_overall,
        report.cohort.max_overall,
        report.cohort.mean_raw,
    ));
    html.push_str("</table>\n");

    // Question difficulty distribution
    html.push_str("<h2>Question difficulty</h2>\n");
    html.push_str("<table class=\"summary\">\n<thead><tr>");
    for tier in report.cohort.tier_distribution.keys() {
        html.push_str(&format!("<th>{tier}</th>"));
    }
    html.push_str("</tr></thead>\n<tbody><tr>");
    for count in report.cohort.tier_distribution.values() {
        html.push_str(&format!("<td>{count}</td>"));
    }
    html.push_str("</tr></tbody>\n</table>\n");
    html.push_str("</section>\n");

    // Per-student results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Students</h2>\n");
    html.push_str("<table class=\"results-table\">\n");
    html.push_str(
        "<thead><tr><th>Student</th><th>Correct</th><th>Raw</th><th>Overall</th><th>Areas</th></tr></thead>\n",
    );
    html.push_str("<tbody>\n");

    for student in &report.students {
        let mut areas = String::new();
        for (area, score) in &student.area_scores {
            areas.push_str(&format!(
                "<div class=\"area\"><strong>{area}</strong>: {:.1} ({} correct)",
                score.final_score, score.correct_count
            ));
            if !score.explanation.is_empty() {
                areas.push_str(&format!(
                    "<details><summary>details</summary><ul>{}</ul></details>",
                    score
                        .explanation
                        .iter()
                        .map(|line| format!("<li>{}</li>", html_escape(line)))
                        .collect::<String>()
                ));
            }
            areas.push_str("</div>");
        }

        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.1}</td><td>{}</td></tr>\n",
            html_escape(&student.name),
            student.total_correct,
            student.raw_score,
            student.overall_score,
            areas
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ScoringReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.area { margin: 0.25rem 0; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 0.25rem 0; }
summary { cursor: pointer; }
"#;
