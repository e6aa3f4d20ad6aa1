use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join(relative)
}

fn edp() -> Command {
    Command::cargo_bin("edp").unwrap()
}

#[test]
fn edp_schema_lists_columns() {
    edp()
        .args(["schema", "timeseries"])
        .assert()
        .success()
        .stdout(predicate::str::contains("required: region, var_name"))
        .stdout(predicate::str::contains("optional: id_ts, var_unit, source, comment"));
}

#[test]
fn edp_schema_rejects_unknown_kind() {
    edp()
        .args(["schema", "sequences"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("sequences"));
}

#[test]
fn edp_validate_accepts_scalars() {
    let input = repo_path("test_data/scalars/scalars.csv");
    edp()
        .args(["validate", "scalars", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("(5 rows)"));
}

#[test]
fn edp_validate_accepts_series_on_different_indices() {
    let input = repo_path("test_data/ts/stacked_mixed_stops.csv");
    edp()
        .args(["validate", "timeseries", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("(2 rows)"));
}

#[test]
fn edp_without_command_prints_usage() {
    edp()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn edp_validate_reports_missing_columns() {
    let input = repo_path("test_data/scalars/scalars_missing_region.csv");
    edp()
        .args(["validate", "scalars", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required columns: region"));

    let input = repo_path("test_data/ts/stacked_missing_required.csv");
    edp()
        .args(["validate", "timeseries", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("series"));
}

#[test]
fn edp_ts_stack_then_unstack_restores_sequence() {
    let out_dir = tempdir().unwrap();
    let stacked = out_dir.path().join("stacked.csv");
    let unstacked = out_dir.path().join("sequence.csv");
    let input = repo_path("test_data/ts/sequence.csv");

    edp()
        .args([
            "ts",
            "stack",
            input.to_str().unwrap(),
            stacked.to_str().unwrap(),
            "--region",
            "BE",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stacked 2 series"));
    let text = fs::read_to_string(&stacked).unwrap();
    assert!(text.starts_with("id_ts,region,var_name,timeindex_start"));
    assert!(text.contains("BE,BE-load-profile,2021-01-01 00:00:00,2021-01-01 03:00:00,H"));

    edp()
        .args(["ts", "unstack", stacked.to_str().unwrap(), unstacked.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 series (4 steps)"));
    let restored = fs::read_to_string(&unstacked).unwrap();
    assert_eq!(restored, fs::read_to_string(&input).unwrap());
}

#[test]
fn edp_ts_check_detects_shifted_index() {
    let stacked = repo_path("test_data/ts/stacked.csv");
    let sequence = repo_path("test_data/ts/sequence.csv");
    edp()
        .args(["ts", "check", stacked.to_str().unwrap(), sequence.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("2021-01-01 00:00:00"));

    let shifted = repo_path("test_data/ts/stacked_shifted.csv");
    edp()
        .args(["ts", "check", stacked.to_str().unwrap(), shifted.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("BE-solar-profile"));
}

#[test]
fn edp_scalars_filter_runs() {
    let out_dir = tempdir().unwrap();
    let out = out_dir.path().join("be.csv");
    let input = repo_path("test_data/scalars/scalars.csv");
    edp()
        .args([
            "scalars",
            "filter",
            input.to_str().unwrap(),
            out.to_str().unwrap(),
            "--column",
            "region",
            "--values",
            "BE",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kept 3 of 5 rows"));
    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert!(!text.contains("DE-ccgt"));
}

#[test]
fn edp_scalars_filter_matches_numbers() {
    let out_dir = tempdir().unwrap();
    let out = out_dir.path().join("large.csv");
    let input = repo_path("test_data/scalars/scalars.csv");
    edp()
        .args([
            "scalars",
            "filter",
            input.to_str().unwrap(),
            out.to_str().unwrap(),
            "--column",
            "var_value",
            "--values",
            "1200.0,3000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kept 2 of 5 rows"));
}

#[test]
fn edp_scalars_agg_runs() {
    let out_dir = tempdir().unwrap();
    let out = out_dir.path().join("agg.csv");
    let input = repo_path("test_data/scalars/scalars.csv");
    edp()
        .args([
            "scalars",
            "agg",
            input.to_str().unwrap(),
            out.to_str().unwrap(),
            "--over",
            "region",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aggregated 5 rows into 3 groups"));
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains(",ALL,"));
}

#[test]
fn edp_scalars_agg_rejects_unknown_method() {
    let out_dir = tempdir().unwrap();
    let input = repo_path("test_data/scalars/scalars.csv");
    edp()
        .args([
            "scalars",
            "agg",
            input.to_str().unwrap(),
            out_dir.path().join("agg.csv").to_str().unwrap(),
            "--over",
            "region",
            "--agg",
            "median",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("median"));
}

#[test]
fn edp_tables_writes_production_and_sinks() {
    let out_dir = tempdir().unwrap();
    let input = repo_path("test_data/results");
    edp()
        .args(["tables", input.to_str().unwrap(), out_dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 production rows"))
        .stdout(predicate::str::contains("2 sink rows"));

    let production = fs::read_to_string(out_dir.path().join("production_table.csv")).unwrap();
    let lines: Vec<&str> = production.lines().collect();
    assert!(lines[0].starts_with("region,carrier,tech,capacity,flow_out_electricity"));
    assert!(lines[1].starts_with("BE,electricity,ccgt,1200,5400000,200"));

    let sinks = fs::read_to_string(out_dir.path().join("sink_table.csv")).unwrap();
    assert!(sinks.starts_with("region,carrier,tech,var_name,var_value\n"));
    assert!(sinks.contains("BE,electricity,demand,flow_in_electricity,8100000"));
    assert!(!sinks.contains("pv"));
}

#[test]
fn edp_parametrize_fills_empty_values() {
    let work = tempdir().unwrap();
    let scalars = work.path().join("scalars.csv");
    fs::copy(repo_path("test_data/scalars/scalars.csv"), &scalars).unwrap();
    let spec = repo_path("test_data/scenarios/base.yml");
    edp()
        .args(["parametrize", spec.to_str().unwrap(), scalars.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 1 values"))
        .stdout(predicate::str::contains("Base 2050"));
    let text = fs::read_to_string(&scalars).unwrap();
    let row = text.lines().find(|l| l.contains("DE-pv")).unwrap();
    assert!(row.contains(",5000"));
}

#[test]
fn edp_parametrize_refuses_overwrite() {
    let work = tempdir().unwrap();
    let scalars = work.path().join("scalars.csv");
    fs::copy(repo_path("test_data/scalars/scalars.csv"), &scalars).unwrap();
    let before = fs::read_to_string(&scalars).unwrap();
    let spec = repo_path("test_data/scenarios/overwrite.yml");
    edp()
        .args(["parametrize", spec.to_str().unwrap(), scalars.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("overwrite existing data"));
    assert_eq!(fs::read_to_string(&scalars).unwrap(), before);
}
