//! Concurrency tests for the bmi binary.
//!
//! These tests verify that multiple processes can safely:
//! - Append to the calculation log simultaneously (file locking)
//! - Read history while writers are active

use assert_cmd::Command;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::thread;
use tempfile::TempDir;

fn cli(temp_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bmi"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.join("config"))
        .arg("--data-dir")
        .arg(temp_dir.join("data"));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn history_ids(temp_dir: &Path) -> Vec<u64> {
    let output = cli(temp_dir)
        .args(["history", "--json"])
        .output()
        .expect("Failed to run history");
    assert!(output.status.success());

    let history: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    history.iter().map(|r| r["id"].as_u64().unwrap()).collect()
}

#[test]
fn test_concurrent_writers_get_distinct_ids() {
    let temp_dir = setup_test_dir();
    let root: PathBuf = temp_dir.path().to_path_buf();

    let writers: Vec<_> = (0..8)
        .map(|i| {
            let root = root.clone();
            thread::spawn(move || {
                let weight = format!("{}", 60 + i);
                cli(&root)
                    .args(["calc", "--height", "175", "--weight", weight.as_str()])
                    .assert()
                    .success();
            })
        })
        .collect();

    for writer in writers {
        writer.join().expect("writer thread panicked");
    }

    let log_content =
        std::fs::read_to_string(root.join("data/bmi_calculations.wal")).expect("Failed to read log");
    assert_eq!(log_content.lines().count(), 8, "every writer should append one line");

    let ids = history_ids(&root);
    let unique: HashSet<u64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), 8, "ids must not repeat: {:?}", ids);
    assert_eq!(unique, (1..=8).collect::<HashSet<u64>>());
}

#[test]
fn test_reads_during_writes() {
    let temp_dir = setup_test_dir();
    let root: PathBuf = temp_dir.path().to_path_buf();

    cli(&root)
        .args(["calc", "--height", "175", "--weight", "70"])
        .assert()
        .success();

    let writer_root = root.clone();
    let writer = thread::spawn(move || {
        for _ in 0..4 {
            cli(&writer_root)
                .args(["calc", "--height", "170", "--weight", "80"])
                .assert()
                .success();
        }
    });

    // Readers never see a torn line, so every read succeeds
    for _ in 0..4 {
        let ids = history_ids(&root);
        assert!(!ids.is_empty());
    }

    writer.join().expect("writer thread panicked");
    assert_eq!(history_ids(&root).len(), 5);
}

#[test]
fn test_export_while_writing() {
    let temp_dir = setup_test_dir();
    let root: PathBuf = temp_dir.path().to_path_buf();

    let writer_root = root.clone();
    let writer = thread::spawn(move || {
        for _ in 0..3 {
            cli(&writer_root)
                .args(["calc", "--height", "165", "--weight", "90"])
                .assert()
                .success();
        }
    });

    for _ in 0..3 {
        cli(&root).arg("export").assert().success();
    }

    writer.join().expect("writer thread panicked");

    cli(&root).arg("export").assert().success();
    let csv = std::fs::read_to_string(root.join("data/bmi_calculations.csv")).unwrap();
    assert_eq!(csv.lines().count(), 4);
}
