//! The `scriptmark grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use scriptmark_analysis::config::{augmenter_from_config, load_config_from};
use scriptmark_core::engine::{GradingEngine, ScoringStrategy};
use scriptmark_core::parser;
use scriptmark_core::report::GradingSummary;

pub async fn execute(
    bundle_path: PathBuf,
    strategy: Option<String>,
    threshold: Option<f64>,
    output: PathBuf,
    analyze: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;

    // CLI flags override the config file
    if let Some(strategy) = &strategy {
        config.grading.strategy = strategy
            .parse::<ScoringStrategy>()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }
    if let Some(threshold) = threshold {
        config.grading.match_threshold = threshold;
    }

    let mut bundle = parser::parse_bundle(&bundle_path)?;

    let warnings = parser::validate_bundle(&bundle);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        eprintln!("{prefix} WARNING: {}", w.message);
    }

    eprintln!(
        "Grading submission {} ({} answers, {} strategy)",
        bundle.submission.id,
        bundle.submission.answers.len(),
        config.grading.strategy
    );

    let engine = GradingEngine::new(config.grading.clone())
        .map_err(|e| anyhow::anyhow!("failed to build grading engine: {e}"))?;
    let summary = engine
        .grade_submission(&mut bundle.submission, &bundle.questions)
        .map_err(|e| anyhow::anyhow!("grading failed: {e}"))?;

    print_summary(&bundle, &summary);

    std::fs::create_dir_all(&output)?;

    let summary_path = output.join(format!("summary-{}.json", summary.submission_id));
    summary.save_json(&summary_path)?;
    eprintln!("Summary saved to: {}", summary_path.display());

    let graded_path = output.join(format!("graded-{}.json", bundle.submission.id));
    let graded_json =
        serde_json::to_string_pretty(&bundle).context("failed to serialize graded bundle")?;
    std::fs::write(&graded_path, graded_json)
        .with_context(|| format!("failed to write graded bundle to {}", graded_path.display()))?;
    eprintln!("Graded bundle: {}", graded_path.display());

    if analyze {
        let augmenter = augmenter_from_config(&config)?;
        let outcome = augmenter
            .analyze_submission(&bundle.submission, &bundle.questions)
            .await;
        super::analyze::report_outcome(&outcome, &bundle.submission.id, &output)?;
    }

    Ok(())
}

fn print_summary(bundle: &parser::ExamBundle, summary: &GradingSummary) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Question", "Marks", "Coverage", "Density", "Feedback"]);

    for result in &summary.answers {
        let question_text = bundle
            .questions
            .iter()
            .find(|q| q.id == result.question_id)
            .map(|q| truncate(&q.text, 32))
            .unwrap_or_else(|| result.question_id.clone());

        table.add_row(vec![
            Cell::new(question_text),
            Cell::new(format!(
                "{:.2}/{:.0}",
                result.marks_obtained, result.marks_allocated
            )),
            Cell::new(format!("{:.0}%", result.breakdown.coverage * 100.0)),
            Cell::new(format!("{:.0}%", result.breakdown.density * 100.0)),
            Cell::new(truncate(&result.feedback, 48)),
        ]);
    }

    eprintln!("\n{table}");
    eprintln!(
        "Total: {:.2}/{:.2} ({:.2}%)",
        summary.obtained_marks, summary.total_marks, summary.percentage
    );
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
