//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn scriptmark() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("scriptmark").unwrap()
}

const BUNDLE: &str = r#"[exam]
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
expected_answer = "Encapsulation hides internal state behind a public interface."
marks = 5
order = 2

[submission]
id = "sub-001"
student_id = "student-42"

[[submission.answers]]
question_id = "q1"
text = "Polymorphism is when objects of different types can be treated uniformly."

[[submission.answers]]
question_id = "q2"
text = "Encapsulation hides the internal state of an object."
"#;

fn write_bundle(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("bundle.toml");
    std::fs::write(&path, BUNDLE).unwrap();
    path
}

#[test]
fn validate_valid_bundle() {
    let dir = TempDir::new().unwrap();
    let bundle = write_bundle(&dir);

    scriptmark()
        .arg("validate")
        .arg("--bundle")
        .arg(&bundle)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 questions"))
        .stdout(predicate::str::contains("All bundles valid"));
}

#[test]
fn validate_directory() {
    let dir = TempDir::new().unwrap();
    write_bundle(&dir);

    scriptmark()
        .arg("validate")
        .arg("--bundle")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("OOP Basics"));
}

#[test]
fn validate_nonexistent_file() {
    scriptmark()
        .arg("validate")
        .arg("--bundle")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_warns_on_unknown_question_reference() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"[exam]
id = "e1"
title = "Exam"

[[questions]]
id = "q1"
text = "Q"
expected_answer = "A"
marks = 5

[submission]
id = "s1"
student_id = "st1"

[[submission.answers]]
question_id = "q-ghost"
text = "answer to nothing"
"#,
    )
    .unwrap();

    scriptmark()
        .arg("validate")
        .arg("--bundle")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown question"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn grade_writes_summary_and_graded_bundle() {
    let dir = TempDir::new().unwrap();
    let bundle = write_bundle(&dir);
    let output = dir.path().join("results");

    scriptmark()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--bundle")
        .arg(&bundle)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("Total:"))
        .stderr(predicate::str::contains("Summary saved to:"));

    assert!(output.join("summary-sub-001.json").exists());
    assert!(output.join("graded-sub-001.json").exists());
}

#[test]
fn grade_with_semantic_strategy() {
    let dir = TempDir::new().unwrap();
    let bundle = write_bundle(&dir);
    let output = dir.path().join("results");

    scriptmark()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--bundle")
        .arg(&bundle)
        .arg("--strategy")
        .arg("semantic")
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("semantic strategy"));

    let summary: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(output.join("summary-sub-001.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["strategy"], "semantic");
    assert!(summary["answers"][0]["breakdown"]["content_similarity"].is_number());
}

#[test]
fn grade_rejects_unknown_strategy() {
    let dir = TempDir::new().unwrap();
    let bundle = write_bundle(&dir);

    scriptmark()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--bundle")
        .arg(&bundle)
        .arg("--strategy")
        .arg("telepathic")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scoring strategy"));
}

#[test]
fn grade_with_analysis_disabled_still_succeeds() {
    let dir = TempDir::new().unwrap();
    let bundle = write_bundle(&dir);
    let output = dir.path().join("results");

    scriptmark()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--bundle")
        .arg(&bundle)
        .arg("--output")
        .arg(&output)
        .arg("--analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("Analysis unavailable"));

    let outcome: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(output.join("analysis-sub-001.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(outcome["error"], "analysis is not configured");
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    scriptmark()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created scriptmark.toml"))
        .stdout(predicate::str::contains("Created bundles/example.toml"));

    assert!(dir.path().join("scriptmark.toml").exists());
    assert!(dir.path().join("bundles/example.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    scriptmark()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    scriptmark()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    scriptmark()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Automated answer grading engine"));
}

#[test]
fn version_output() {
    scriptmark()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("scriptmark"));
}
