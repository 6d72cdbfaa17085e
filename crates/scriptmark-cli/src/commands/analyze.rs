//! The `scriptmark analyze` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use scriptmark_analysis::augmenter::AnalysisOutcome;
use scriptmark_analysis::config::{augmenter_from_config, load_config_from};
use scriptmark_core::parser::ExamBundle;

pub async fn execute(
    bundle_path: PathBuf,
    output: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let content = std::fs::read_to_string(&bundle_path)
        .with_context(|| format!("failed to read graded bundle: {}", bundle_path.display()))?;
    let bundle: ExamBundle =
        serde_json::from_str(&content).context("failed to parse graded bundle JSON")?;

    let augmenter = augmenter_from_config(&config)?;
    let outcome = augmenter
        .analyze_submission(&bundle.submission, &bundle.questions)
        .await;

    std::fs::create_dir_all(&output)?;
    report_outcome(&outcome, &bundle.submission.id, &output)?;

    Ok(())
}

/// Print an analysis outcome and persist it next to the grading artifacts.
pub fn report_outcome(outcome: &AnalysisOutcome, submission_id: &str, output: &Path) -> Result<()> {
    match (&outcome.report, &outcome.error) {
        (Some(report), _) => {
            println!("\nSUMMARY");
            println!("  {}", report.summary);
            print_items("STRENGTHS", &report.strengths);
            print_items("AREAS FOR IMPROVEMENT", &report.areas_for_improvement);
            print_items("SUGGESTIONS", &report.suggestions);
        }
        (None, Some(error)) => {
            println!("Analysis unavailable: {error}");
        }
        (None, None) => {
            println!("Analysis produced no report.");
        }
    }

    let path = output.join(format!("analysis-{submission_id}.json"));
    let json = serde_json::to_string_pretty(outcome).context("failed to serialize analysis")?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write analysis to {}", path.display()))?;
    eprintln!("Analysis saved to: {}", path.display());

    Ok(())
}

fn print_items(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{title}");
    for item in items {
        println!("  - {item}");
    }
}
