use std::{fs, path::PathBuf};

use tempfile::tempdir;

use pdl_cli::{Args, run};

/// Collects all .pdl files from a directory
fn collect_pdl_files(dir: PathBuf) -> Vec<String> {
    let mut files: Vec<String> = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("pdl")
            })
            .map(|path| path.to_string_lossy().to_string())
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demos are at workspace root, relative to workspace not the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args(inputs: Vec<String>, output: &PathBuf, print_default: bool) -> Args {
    Args {
        inputs,
        output: Some(output.to_string_lossy().to_string()),
        config: None,
        log_level: "off".to_string(),
        print_default,
    }
}

#[test]
fn e2e_smoke_test_demo_library() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_pdl_files(demos_path());
    assert!(!demos.is_empty(), "No demos found in demos/");

    let output = temp_dir.path().join("demos.rs");
    run(&args(demos.clone(), &output, false)).expect("Demo library failed to compile");

    let code = fs::read_to_string(&output).expect("Output was not written");
    assert!(code.contains("pub struct Case"));
    assert!(code.contains("pub struct Mesh"));
    assert!(code.contains("pub struct Solver"));

    let output = temp_dir.path().join("defaults.txt");
    run(&args(demos, &output, true)).expect("Failed to print defaults");

    let text = fs::read_to_string(&output).expect("Output was not written");
    assert!(text.contains("Case (set)"));
    assert!(text.contains("cells: int = 100"));
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_pdl_files(demos_path().join("errors"));
    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo in &error_demos {
        let output = temp_dir.path().join("error.rs");
        if run(&args(vec![demo.clone()], &output, false)).is_ok() {
            unexpectedly_succeeded.push(demo.clone());
        }
        assert!(!output.exists(), "Output written for failing demo {demo}");
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {path}");
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}
