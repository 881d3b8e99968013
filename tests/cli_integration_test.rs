mod common;

use assert_cmd::Command;
use common::{recorded_run, write_file};
use indoc::indoc;
use reflexmap::statistics::{JsonWriter, ReportWriter};
use reflexmap::{ExperimentReport, RecommendationSettings};
use std::path::Path;
use tempfile::TempDir;

fn reflexmap() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_reflexmap"));
    cmd.env("NO_COLOR", "1");
    cmd
}

fn write_report(dir: &Path, name: &str, seed: i64) -> std::path::PathBuf {
    let result = recorded_run(&RecommendationSettings::default(), seed);
    let mut buffer = Vec::new();
    JsonWriter::new(&mut buffer)
        .write_report(&result.to_report().unwrap())
        .unwrap();
    write_file(dir, name, &String::from_utf8(buffer).unwrap())
}

#[test]
fn recommend_prints_tied_pairs_as_json() {
    let dir = TempDir::new().unwrap();
    let events = write_file(
        dir.path(),
        "events.json",
        indoc! {r#"
            [
              { "update": { "candidate": "c1", "cluster": "A", "value": 0.9 } },
              { "update": { "candidate": "c1", "cluster": "B", "value": 0.9 } },
              { "update": { "candidate": "c1", "cluster": "C", "value": 0.1 } }
            ]
        "#},
    );

    let output = reflexmap()
        .current_dir(dir.path())
        .args(["recommend", "--delta", "0.05", "--format", "json"])
        .arg(&events)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let pairs: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let clusters: Vec<&str> = pairs
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["cluster_id"].as_str().unwrap())
        .collect();
    assert_eq!(clusters, vec!["A", "B"]);
}

#[test]
fn recommend_fails_on_missing_events_file() {
    let dir = TempDir::new().unwrap();
    reflexmap()
        .current_dir(dir.path())
        .args(["recommend", "missing.json"])
        .assert()
        .failure();
}

#[test]
fn average_writes_parseable_report() {
    let dir = TempDir::new().unwrap();
    let first = write_report(dir.path(), "run1.json", 1);
    let second = write_report(dir.path(), "run2.json", 2);
    let output = dir.path().join("average.json");

    reflexmap()
        .current_dir(dir.path())
        .arg("average")
        .arg(&first)
        .arg(&second)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let report = ExperimentReport::load(&output).unwrap();
    assert!(report.averaged);
    assert_eq!(report.context.iterations, 2);
    assert_eq!(report.summary.candidates_total, 6);
    assert_eq!(report.summary.precision_std, 0.0);
}

#[test]
fn summarize_renders_markdown() {
    let dir = TempDir::new().unwrap();
    let report = write_report(dir.path(), "run.json", 1);

    let output = reflexmap()
        .current_dir(dir.path())
        .args(["summarize", "--format", "markdown"])
        .arg(&report)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let markdown = String::from_utf8(output).unwrap();
    assert!(markdown.contains("# Mapping Experiment Report"));
    assert!(markdown.contains("## Candidates in Mapping Order"));
}

#[test]
fn init_creates_config_once() {
    let dir = TempDir::new().unwrap();

    reflexmap().current_dir(dir.path()).arg("init").assert().success();
    assert!(dir.path().join(".reflexmap.toml").exists());

    reflexmap().current_dir(dir.path()).arg("init").assert().failure();
    reflexmap()
        .current_dir(dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = write_file(dir.path(), "bad.toml", "attraction_value_delta = -1.0");
    let events = write_file(dir.path(), "events.json", "[]");

    reflexmap()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("recommend")
        .arg(&events)
        .assert()
        .failure();
}
