use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::{TempDir, tempdir};

use jig::{JigError, State};
use jig_cli::{Args, report_lines, run};

const BANNER: &str = "// Code generated by jig; DO NOT EDIT.";

const LIBRARY: &str = "package generic\n\n//jigs: Stack(T)\n\n// StackT is a LIFO stack of T values.\ntype StackT []T\n";

/// A package directory `shapes` and a template library `generic` side by
/// side, plus a configuration file using the given typechecker command.
fn setup(check: &[&str], files: &[(&str, &str)]) -> (TempDir, PathBuf, PathBuf) {
    let root = tempdir().expect("Failed to create temp directory");
    let pkg = root.path().join("shapes");
    let lib = root.path().join("generic");
    fs::create_dir(&pkg).unwrap();
    fs::create_dir(&lib).unwrap();
    fs::write(lib.join("generic.go"), LIBRARY).unwrap();
    for (name, text) in files {
        fs::write(pkg.join(name), text).unwrap();
    }

    let command: Vec<String> = check.iter().map(|arg| format!("'{arg}'")).collect();
    let config = root.path().join("config.toml");
    fs::write(
        &config,
        format!(
            "[generate]\nlibrary = ['{}']\n\n[check]\ncommand = [{}]\n\n[imports]\ncommand = []\n",
            lib.display(),
            command.join(", ")
        ),
    )
    .unwrap();

    (root, pkg, config)
}

fn args(dir: &Path, config: &Path, flags: &[&str]) -> Args {
    Args {
        dir: dir.to_string_lossy().to_string(),
        clean: flags.contains(&"clean"),
        regen: flags.contains(&"regen"),
        missing: flags.contains(&"missing"),
        verbose: flags.contains(&"verbose"),
        nodoc: flags.contains(&"nodoc"),
        config: Some(config.to_string_lossy().to_string()),
        log_level: "off".to_string(),
    }
}

fn stale_stack_int() -> String {
    format!("{BANNER}\n\n//go:generate jig --regen\n\npackage shapes\n\n//jig:name StackInt\n// StackInt is stale.\ntype StackInt []string\n")
}

#[test]
fn e2e_clean_removes_generated_files() {
    let (_root, pkg, config) = setup(
        &["go", "vet", "."],
        &[("main.go", "package shapes\n"), ("shapes_jig.go", &stale_stack_int())],
    );

    let report = run(&args(&pkg, &config, &["clean", "verbose"])).expect("clean failed");

    assert!(report.is_success());
    assert!(!pkg.join("shapes_jig.go").exists());
    assert!(pkg.join("main.go").exists());

    let lines = report_lines(&report, true);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("removed "));
}

#[test]
fn e2e_missing_config_file_is_an_error() {
    let (root, pkg, _config) = setup(&["true"], &[("main.go", "package shapes\n")]);

    let err = run(&args(&pkg, &root.path().join("absent.toml"), &[])).unwrap_err();
    assert!(matches!(err, JigError::Config(_)));
}

#[cfg(unix)]
#[test]
fn e2e_forced_regeneration_with_nodoc() {
    let (_root, pkg, config) = setup(
        &["true"],
        &[
            ("main.go", "package shapes\n\n//jig:type StackInt\n"),
            ("shapes_jig.go", &stale_stack_int()),
        ],
    );

    let report = run(&args(&pkg, &config, &["missing", "nodoc", "verbose"])).expect("run failed");
    assert!(report.is_success(), "unexpected report: {report:?}");

    let text = fs::read_to_string(pkg.join("shapes_jig.go")).unwrap();
    assert!(text.contains("//jig:name StackInt\ntype StackInt []int\n"));
    assert!(!text.contains("stale"));
    assert!(!text.contains("LIFO"));

    let lines = report_lines(&report, true);
    assert!(lines.iter().any(|line| line.starts_with("generated StackInt from Stack(int)")));
    assert!(lines.iter().any(|line| line.starts_with("wrote ")));
}

#[cfg(unix)]
#[test]
fn e2e_unresolved_diagnostics_are_reported() {
    let (_root, pkg, config) = setup(
        &["sh", "-c", "echo ./main.go:3:11: undefined: FooBar; exit 1"],
        &[("main.go", "package shapes\n\nvar cache FooBar\n")],
    );

    let report = run(&args(&pkg, &config, &[])).expect("run failed");
    assert_eq!(report.state(), State::Stalled);
    assert!(!report.is_success());

    let lines = report_lines(&report, false);
    assert_eq!(
        lines,
        [format!("{}:3:11: undefined: FooBar", pkg.join("main.go").display())]
    );
}

#[cfg(unix)]
#[test]
fn e2e_failing_typechecker_aborts_without_writing() {
    let (_root, pkg, config) = setup(
        &["false"],
        &[("main.go", "package shapes\n"), ("shapes_jig.go", &stale_stack_int())],
    );

    let err = run(&args(&pkg, &config, &["regen"])).unwrap_err();
    assert!(matches!(err, JigError::Check(_)));
    assert_eq!(
        fs::read_to_string(pkg.join("shapes_jig.go")).unwrap(),
        stale_stack_int()
    );
}
