//! The `scriptmark validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(bundle_path: PathBuf) -> Result<()> {
    let bundles = if bundle_path.is_dir() {
        scriptmark_core::parser::load_bundle_directory(&bundle_path)?
    } else {
        vec![scriptmark_core::parser::parse_bundle(&bundle_path)?]
    };

    let mut total_warnings = 0;

    for bundle in &bundles {
        println!(
            "Bundle: {} ({} questions, {} answers)",
            bundle.exam_title,
            bundle.questions.len(),
            bundle.submission.answers.len()
        );

        let warnings = scriptmark_core::parser::validate_bundle(bundle);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All bundles valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
