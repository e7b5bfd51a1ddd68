use std::path::{Path, PathBuf};
use std::process::Command;

#[path = "../../../tests/trace_helpers.rs"]
mod trace_helpers;

use trace_helpers::{unique_tmp_dir, write_trace};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn bin_path() -> &'static Path {
    Path::new(env!("CARGO_BIN_EXE_mcache-dynamic-rs"))
}

#[test]
fn no_args_prints_help_and_exits_nonzero() {
    let output = Command::new(bin_path()).output().unwrap();
    assert!(!output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Usage: mcache-dynamic-rs"));
}

#[test]
fn mixed_replay_counts_hits_over_gets_only() {
    let dir = unique_tmp_dir(&workspace_root(), "dynamic-basic");

    // SET 1 admits; SET 2 is routed to the non-resident side (freeing the
    // whole cache for it would only just cover the shortfall); the first
    // GET hits, the second misses and displaces item 1, the third hits.
    let trace = write_trace(
        &dir,
        "trace",
        "s 1 1 4\ns 2 2 4\ng 3 1 4\ng 4 2 4\ng 5 2 4\n",
    );

    let output = Command::new(bin_path())
        .arg(&trace)
        .args(["4", "transitions", "5", "1"])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8(output.stderr).unwrap()
    );

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "Object hit ratio: 0.6666667");
    assert_eq!(lines[1], "Byte hit ratio: 0.6666666666666666");
}

#[test]
fn malformed_action_is_fatal() {
    let dir = unique_tmp_dir(&workspace_root(), "dynamic-bad-action");
    let trace = write_trace(&dir, "trace", "s 1 1 4\nx 2 1 4\n");

    let output = Command::new(bin_path())
        .arg(&trace)
        .args(["4", "transitions", "5", "1"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("invalid action type"));
    assert!(stderr.contains("line 2"));
}

#[test]
fn unknown_accumulator_type_is_fatal() {
    let dir = unique_tmp_dir(&workspace_root(), "dynamic-bad-acc");
    let trace = write_trace(&dir, "trace", "s 1 1 4\n");

    let output = Command::new(bin_path())
        .arg(&trace)
        .args(["4", "fifo", "5", "1"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("unknown stats accumulator type"));
}

#[test]
fn identical_runs_print_identical_ratios() {
    let dir = unique_tmp_dir(&workspace_root(), "dynamic-determinism");
    let trace = write_trace(
        &dir,
        "trace",
        "s 1 10 3\ns 2 11 4\ns 3 12 5\ng 4 10 3\ng 5 11 4\ng 6 12 5\ng 7 10 3\n",
    );

    let run = || {
        let output = Command::new(bin_path())
            .arg(&trace)
            .args(["8", "states", "2", "2"])
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8(output.stderr.clone()).unwrap()
        );
        String::from_utf8(output.stdout).unwrap()
    };

    assert_eq!(run(), run());
}
