//! End-to-end workflow test
//!
//! Runs the binary over a copy of the fixture project:
//! 1. Generate runners
//! 2. Compare against the golden output
//! 3. Re-run and check nothing changes
//! 4. Break a header and check the failure is isolated

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use walkdir::WalkDir;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Copy the fixture project into a scratch directory.
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let source = fixtures().join("project");
    for entry in WalkDir::new(&source) {
        let entry = entry.unwrap();
        let target = dir.path().join(entry.path().strip_prefix(&source).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
    dir
}

fn run_generator(root: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hdr-testgen"))
        .arg(root)
        .args(extra)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run hdr-testgen")
}

#[test]
fn test_e2e_workflow() {
    let project = setup_project();
    let root = project.path();
    let generated = root.join("gen/Sample/MyClass.UnitTests.gen.h");

    // Step 1: Generate
    let output = run_generator(root, &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "generation failed:\n{}\n{}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Summary:"));
    assert!(stdout.contains("Sample/MyClass.UnitTests.h: 3 tests"));
    assert!(stdout.contains("Utilities/Formatter.h: no tests"));

    // Step 2: Golden output
    let expected = fs::read_to_string(fixtures().join("expected/MyClass.UnitTests.gen.h")).unwrap();
    assert_eq!(fs::read_to_string(&generated).unwrap(), expected);
    assert!(!root.join("gen/Utilities").exists());

    // Step 3: Idempotent re-run
    let modified = fs::metadata(&generated).unwrap().modified().unwrap();
    let output = run_generator(root, &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("up to date"));
    assert_eq!(fs::metadata(&generated).unwrap().modified().unwrap(), modified);
    assert!(!root.join("gen/gen").exists());

    // Step 4: A broken header fails alone
    fs::write(
        root.join("Sample/Broken.h"),
        "namespace Sample { [[Fact]] void Free() {} }\n",
    )
    .unwrap();
    let output = run_generator(root, &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Broken.h"));
    assert!(stderr.contains("not declared inside a class"));
    assert_eq!(fs::read_to_string(&generated).unwrap(), expected);
}

#[test]
fn test_malformed_theory_is_skipped() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("Theories.h"),
        "class Theories\n{\npublic:\n\t[[Theory]]\n\t[[InlineData]]\n\t[[InlineData(7)]]\n\tvoid Check(int value) {}\n};\n",
    )
    .unwrap();

    let output = run_generator(dir.path(), &[]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("InlineData must have arguments"));

    let generated = fs::read_to_string(dir.path().join("gen/Theories.gen.h")).unwrap();
    assert!(generated.contains("testClass->Check(7);"));
    assert_eq!(generated.matches("state += ").count(), 1);
}

#[test]
fn test_config_file_changes_layout() {
    let project = setup_project();
    let root = project.path();
    fs::write(
        root.join("testgen.toml"),
        "[scan]\ngen_dir = \"out\"\n\n[runner]\nruntime_namespace = \"\"\nindent = \"  \"\n",
    )
    .unwrap();

    let output = run_generator(root, &[]);
    assert!(output.status.success());

    let generated = fs::read_to_string(root.join("out/Sample/MyClass.UnitTests.gen.h")).unwrap();
    assert!(generated.contains("\n  state += RunTest(className, \"DoWork_Success\""));
    assert!(!root.join("gen").exists());
}
