//! End-to-end tests of the `fvs` binary.
//!
//! Each test runs the compiled binary with `HOME` pointed at an empty
//! temporary directory and the `FVS_*` variables cleared, so no user
//! configuration leaks in. The build script compiles the mock engine from
//! `fvs-ffi`, so the happy paths run against a real shared library; each
//! invocation is its own process and gets fresh engine state.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const FVS_VARS: [&str; 5] = [
    "FVS_LIBRARY",
    "FVS_KEYFILE",
    "FVS_STOP_CODE",
    "FVS_STOP_YEAR",
    "FVS_LOG_LEVEL",
];

fn fvs(home: &Path, args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fvs"));
    cmd.args(args)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .env_remove("CLICOLOR_FORCE");
    for var in FVS_VARS {
        cmd.env_remove(var);
    }
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.output().expect("failed to run fvs binary")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// One stand, two 10-year cycles starting in 2010.
const STAND: &str = "\
STDIDENT
S248112    cli test stand
STANDCN 0123456789
INVYEAR 2010
TIMEINT 10
NUMCYCLE 2
TREES 12
PLOTS 4
PROCESS
STOP
";

fn write_keyfile(dir: &Path, content: &str) -> String {
    let path = dir.join("stand.key");
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

/// Whitespace-separated cells of the table row starting with `label`.
fn table_row(out: &str, label: &str) -> Vec<String> {
    out.lines()
        .find_map(|line| line.trim_start().strip_prefix(label))
        .unwrap_or_else(|| panic!("no `{label}` row in:\n{out}"))
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Commands that need no library
// ============================================================================

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();
    let output = fvs(home.path(), &["version"], &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    assert!(stdout.contains("fvs-ffi"));
}

#[test]
fn test_unknown_command_fails() {
    let home = TempDir::new().unwrap();
    let output = fvs(home.path(), &["grow"], &[]);
    assert!(!output.status.success());
}

// ============================================================================
// Error paths
// ============================================================================

#[test]
fn test_inspect_missing_library() {
    let home = TempDir::new().unwrap();
    let output = fvs(home.path(), &["inspect", "/nonexistent/FVSzz.so"], &[]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Error:"));
    assert!(err.contains("/nonexistent/FVSzz.so"));
}

#[test]
fn test_run_without_library() {
    let home = TempDir::new().unwrap();
    let output = fvs(home.path(), &["run"], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--library"));
}

#[test]
fn test_invalid_stop_code_from_env_fails_before_loading() {
    let home = TempDir::new().unwrap();
    let output = fvs(
        home.path(),
        &["run", "--library", "/nonexistent/FVSzz.so", "--keyfile", "x.key"],
        &[("FVS_STOP_CODE", "9")],
    );
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("invalid stop point code 9"), "stderr: {err}");
    assert!(!err.contains("Failed to load FVS library"));
}

#[test]
fn test_year_without_code_flag() {
    let home = TempDir::new().unwrap();
    let output = fvs(
        home.path(),
        &[
            "run",
            "--library",
            "/nonexistent/FVSzz.so",
            "--keyfile",
            "x.key",
            "--stop-year",
            "2010",
        ],
        &[],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("without a stop point code"));
}

#[test]
fn test_bad_config_file() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("fvs.yaml");
    std::fs::write(&config, "log_level: loud\n").unwrap();

    let output = fvs(
        home.path(),
        &["--config", config.to_str().unwrap(), "version"],
        &[],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid log level: loud"));
}

#[test]
fn test_default_config_file_is_read() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join(".fvs");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.yaml"), "library: /nonexistent/FVSqq.so\nkeyfile: x.key\n")
        .unwrap();

    let output = fvs(home.path(), &["dims"], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("/nonexistent/FVSqq.so"));
}

#[test]
fn test_flag_overrides_env_library() {
    let home = TempDir::new().unwrap();
    let output = fvs(
        home.path(),
        &["run", "--library", "/nonexistent/FVSaa.so", "--keyfile", "x.key"],
        &[("FVS_LIBRARY", "/nonexistent/FVSbb.so")],
    );
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("FVSaa.so"));
    assert!(!err.contains("FVSbb.so"));
}

// ============================================================================
// Against the mock engine
// ============================================================================

#[test]
fn test_inspect_reports_plain_spelling() {
    let home = TempDir::new().unwrap();
    let output = fvs(home.path(), &["inspect", env!("MOCK_FVS_PATH")], &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("(variant MK)"));
    assert_eq!(table_row(&out, "fvsSetCmdLine"), ["fvsSetCmdLine", "plain"]);
    assert!(out.contains("19 routines resolved, 0 under the decorated spelling"));
}

#[test]
fn test_inspect_reports_decorated_spelling() {
    let home = TempDir::new().unwrap();
    let output = fvs(home.path(), &["inspect", env!("MOCK_FVS_UNDERSCORE_PATH")], &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("(variant MU)"));
    assert_eq!(table_row(&out, "fvsStandID"), ["fvsstandid_", "decorated"]);
    assert!(out.contains("19 routines resolved, 19 under the decorated spelling"));
}

#[test]
fn test_run_finishes_with_finalizing_call() {
    let home = TempDir::new().unwrap();
    let keyfile = write_keyfile(home.path(), STAND);
    let output = fvs(
        home.path(),
        &["run", "--library", env!("MOCK_FVS_PATH"), "--keyfile", &keyfile],
        &[],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("run 1 (1 step): status running (0), restart stand complete (100)"));
    assert!(out.contains("Stand:      S248112 (cn 0123456789, mgmt -)"));
    assert!(out.contains("Dimensions: 12 trees, 2 cycles, 4 plots"));
    assert!(out.contains("run 2 (1 step): status finished (2)"));
    assert!(out.contains("Finished 1 stand(s) in 2 run call(s)"));
    assert!(!out.contains("run 3 "));
}

#[test]
fn test_run_max_steps_limits_run_calls() {
    let home = TempDir::new().unwrap();
    let keyfile = write_keyfile(home.path(), STAND);
    let output = fvs(
        home.path(),
        &[
            "run",
            "--library",
            env!("MOCK_FVS_PATH"),
            "--keyfile",
            &keyfile,
            "--stop-code",
            "-1",
            "--max-steps",
            "1",
        ],
        &[],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("run 1 (1 step): status running (0), restart stopped at AfterInventoryLoad (7)"));
    assert!(!out.contains("run 2 "));
    assert!(out.contains("Stopped after 1 run call(s)"));
    assert!(!out.contains("Finished"));
}

#[test]
fn test_run_pauses_once_at_configured_year() {
    let home = TempDir::new().unwrap();
    let keyfile = write_keyfile(home.path(), STAND);
    let config = home.path().join("fvs.yaml");
    std::fs::write(&config, "stop_point:\n  year: 2010\n").unwrap();

    // The configured year is completed by the code flag.
    let output = fvs(
        home.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "run",
            "--library",
            env!("MOCK_FVS_PATH"),
            "--keyfile",
            &keyfile,
            "--stop-code",
            "2",
        ],
        &[],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("run 1 (1 step): status running (0), restart stopped at AfterFirstEvmon (2)"));
    assert!(out.contains("run 2 (1 step): status running (0), restart stand complete (100)"));
    assert!(out.contains("Finished 1 stand(s) in 3 run call(s)"));
}

#[test]
fn test_dims_stops_after_inventory_load() {
    let home = TempDir::new().unwrap();
    let keyfile = write_keyfile(home.path(), STAND);
    let output = fvs(
        home.path(),
        &["dims", "--library", env!("MOCK_FVS_PATH"), "--keyfile", &keyfile],
        &[],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Stand S248112 (variant MK)"));
    assert_eq!(table_row(&out, "trees"), ["12", "3000"]);
    assert_eq!(table_row(&out, "cycles"), ["2", "40"]);
    assert_eq!(table_row(&out, "plots"), ["4", "500"]);
    assert_eq!(table_row(&out, "species"), ["3"]);
    assert_eq!(table_row(&out, "svs objs"), ["0", "1000"]);
    assert_eq!(table_row(&out, "snags"), ["0", "1000"]);
    assert_eq!(table_row(&out, "cwd"), ["0", "1000"]);
}
