//! The `scriptmark init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create scriptmark.toml
    if std::path::Path::new("scriptmark.toml").exists() {
        println!("scriptmark.toml already exists, skipping.");
    } else {
        std::fs::write("scriptmark.toml", SAMPLE_CONFIG)?;
        println!("Created scriptmark.toml");
    }

    // Create example bundle
    std::fs::create_dir_all("bundles")?;
    let example_path = std::path::Path::new("bundles/example.toml");
    if example_path.exists() {
        println!("bundles/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BUNDLE)?;
        println!("Created bundles/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit scriptmark.toml (API keys are only needed for --analyze)");
    println!("  2. Run: scriptmark validate --bundle bundles/example.toml");
    println!("  3. Run: scriptmark grade --bundle bundles/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# scriptmark configuration

[grading]
strategy = "lexical"
match_threshold = 0.6
max_keywords = 10
linguistic_cap = 8

[analysis]
enabled = false
provider = "gemini"

[analysis.providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[analysis.providers.mistral]
type = "mistral"
api_key = "${MISTRAL_API_KEY}"
"#;

const EXAMPLE_BUNDLE: &str = r#"[exam]
id = "oop-basics"
title = "OOP Basics"

[[questions]]
id = "q1"
text = "Explain polymorphism."
expected_answer = "Polymorphism allows objects of different types to be treated uniformly."
keywords = ["polymorphism", "objects", "types", "uniformly"]
marks = 10
order = 1

[[questions]]
id = "q2"
text = "What is encapsulation?"
expected_answer = "Encapsulation hides internal state behind a public interface so invariants cannot be violated from outside."
marks = 5
order = 2

[submission]
id = "sub-001"
student_id = "student-42"

[[submission.answers]]
question_id = "q1"
text = "Polymorphism is when objects of different types can be treated uniformly through a common interface."

[[submission.answers]]
question_id = "q2"
text = "Encapsulation means hiding the internal state of an object behind a public interface."
"#;
