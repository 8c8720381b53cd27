//! Integration tests driving the `scena` binary end to end.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn run_scena(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scena"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("execute scena")
}

fn write_scenario(dir: &Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).expect("create dirs");
    std::fs::write(path, contents).expect("write scenario file");
}

const PASSING: &str = concat!(
    "name: passing\n",
    "steps:\n",
    "  - given: nothing\n",
    "    run: \"true\"\n",
    "  - then: success\n",
    "    run: \"true\"\n",
);

const FAILING: &str = concat!(
    "name: failing\n",
    "steps:\n",
    "  - given: nothing\n",
    "    run: \"true\"\n",
    "  - then: doomed\n",
    "    run: \"echo assertion failed >&2; exit 1\"\n",
);

#[test]
fn test_passing_run_exits_zero() {
    let temp = TempDir::new().unwrap();
    write_scenario(temp.path(), "scenarios/ok.scenario.yaml", PASSING);

    let output = run_scena(temp.path(), &["run"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("passing"), "stdout: {stdout}");
    assert!(stdout.contains("1 total, 1 passed"), "stdout: {stdout}");
}

#[test]
fn test_failing_scenario_exits_one_with_detail() {
    let temp = TempDir::new().unwrap();
    write_scenario(temp.path(), "scenarios/bad.scenario.yaml", FAILING);
    write_scenario(temp.path(), "scenarios/ok.scenario.yaml", PASSING);

    let output = run_scena(temp.path(), &["run"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("assertion failed"), "stdout: {stdout}");
    assert!(stdout.contains("2 total, 1 passed, 1 failed"), "stdout: {stdout}");
}

#[test]
fn test_missing_path_exits_two() {
    let temp = TempDir::new().unwrap();

    let output = run_scena(temp.path(), &["run", "no-such-dir"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"), "stderr: {stderr}");
}

#[test]
fn test_only_and_skip_tags() {
    let temp = TempDir::new().unwrap();
    write_scenario(
        temp.path(),
        "scenarios/all.scenario.yaml",
        concat!(
            "- name: focused\n",
            "  only: true\n",
            "  steps:\n",
            "    - given: nothing\n",
            "      run: \"true\"\n",
            "- name: ordinary\n",
            "  steps:\n",
            "    - given: nothing\n",
            "      run: \"true\"\n",
            "- name: parked\n",
            "  skip: waiting on fix\n",
            "  steps:\n",
            "    - given: nothing\n",
            "      run: \"false\"\n",
        ),
    );

    let output = run_scena(temp.path(), &["run"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // The skip-tagged scenario's failing step never ran, and the untagged
    // one was deselected by `only` yet still reported.
    assert!(stdout.contains("3 total, 1 passed, 0 failed, 2 skipped"), "stdout: {stdout}");
    assert!(stdout.contains("waiting on fix"), "stdout: {stdout}");
}

#[test]
fn test_ignore_flag_excludes_a_directory() {
    let temp = TempDir::new().unwrap();
    write_scenario(temp.path(), "scenarios/ok.scenario.yaml", PASSING);
    write_scenario(temp.path(), "scenarios/wip/bad.scenario.yaml", FAILING);

    let output = run_scena(temp.path(), &["run", "scenarios", "-i", "scenarios/wip"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 total, 1 passed"), "stdout: {stdout}");
}

#[test]
fn test_malformed_file_reports_one_failed_scenario() {
    let temp = TempDir::new().unwrap();
    write_scenario(temp.path(), "scenarios/bad.scenario.yaml", "steps: [unterminated\n");
    write_scenario(temp.path(), "scenarios/ok.scenario.yaml", PASSING);

    let output = run_scena(temp.path(), &["run"]);
    // One bad unit fails the run but never hides its siblings.
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 total, 1 passed, 1 failed"), "stdout: {stdout}");
}

#[test]
fn test_fail_fast_aborts_remaining_scenarios() {
    let temp = TempDir::new().unwrap();
    // Lexicographic discovery order: a_bad runs first.
    write_scenario(temp.path(), "scenarios/a_bad.scenario.yaml", FAILING);
    write_scenario(temp.path(), "scenarios/b_ok.scenario.yaml", PASSING);

    let output = run_scena(temp.path(), &["run", "--fail-fast"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 failed"), "stdout: {stdout}");
    assert!(stdout.contains("1 aborted"), "stdout: {stdout}");
}

#[test]
fn test_slice_splits_the_run_set() {
    let temp = TempDir::new().unwrap();
    write_scenario(temp.path(), "scenarios/a.scenario.yaml", PASSING);
    write_scenario(
        temp.path(),
        "scenarios/b.scenario.yaml",
        &PASSING.replace("passing", "second"),
    );

    let output = run_scena(temp.path(), &["run", "--slice", "0/2"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 total, 1 passed, 0 failed, 1 skipped"), "stdout: {stdout}");
}

#[test]
fn test_event_log_records_the_lifecycle() {
    let temp = TempDir::new().unwrap();
    write_scenario(temp.path(), "scenarios/ok.scenario.yaml", PASSING);

    let output = run_scena(temp.path(), &["run", "--event-log", "events.jsonl"]);
    assert!(output.status.success());

    let raw = std::fs::read_to_string(temp.path().join("events.jsonl")).unwrap();
    let kinds: Vec<String> = raw
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["kind"].as_str().unwrap().to_string()
        })
        .collect();

    assert_eq!(
        kinds,
        [
            "scenario-discovered",
            "run-started",
            "scenario-selected",
            "scenario-started",
            "step-started",
            "step-finished",
            "step-started",
            "step-finished",
            "scenario-finished",
            "run-finished",
        ]
    );
}

#[test]
fn test_config_file_supplies_defaults() {
    let temp = TempDir::new().unwrap();
    write_scenario(temp.path(), "specs/ok.scenario.yaml", PASSING);
    std::fs::write(temp.path().join("scena.yaml"), "scenarios_dir: specs\n").unwrap();

    let output = run_scena(temp.path(), &["run"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 total, 1 passed"), "stdout: {stdout}");
}
