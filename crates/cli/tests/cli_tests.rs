// End-to-end tests for the xlbench binary.
//
// Run with: cargo test -p xlbench-cli --test cli_tests -- --nocapture

use std::path::PathBuf;
use std::process::Command;

fn xlbench() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_xlbench"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("RUST_LOG");
    cmd.env_remove("XLBENCH_CONFIG");
    cmd
}

fn fixture() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../benchmarks/fixtures/hlpi.csv")
        .to_string_lossy()
        .to_string()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn run_json_reports_every_requested_variant() {
    let output = xlbench()
        .args(["run", "--data", &fixture(), "-n", "2", "--warmup", "0", "--json"])
        .args(["--variant", "ooxml-table", "--variant", "simple"])
        .output()
        .expect("xlbench run");
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["records"], 352);
    assert_eq!(report["warmup"], 0);
    let results = report["results"].as_array().unwrap();
    let names: Vec<&str> = results.iter().map(|r| r["variant"].as_str().unwrap()).collect();
    assert_eq!(names, ["ooxml-table", "simple"]);
    for r in results {
        assert_eq!(r["iterations"], 2);
        assert!(r["output_bytes"].as_u64().unwrap() > 0);
        assert!(r["min_ms"].as_f64().unwrap() <= r["max_ms"].as_f64().unwrap());
    }
}

#[test]
fn run_text_prints_summary_table() {
    let output = xlbench()
        .args(["run", "--data", &fixture(), "-n", "1", "--variant", "xlsxwriter"])
        .output()
        .expect("xlbench run");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("352 records"));
    assert!(stdout.contains("xlsxwriter"));
    assert!(stdout.contains("mean ms"));
}

#[test]
fn settings_file_supplies_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bench.toml");
    std::fs::write(
        &config,
        format!(
            "data = {:?}\niterations = 1\nwarmup = 0\nvariants = [\"xlsxwriter-table\"]\n",
            fixture()
        ),
    )
    .unwrap();

    let output = xlbench()
        .args(["run", "--json", "--config", config.to_str().unwrap()])
        .output()
        .expect("xlbench run");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["results"][0]["variant"], "xlsxwriter-table");
    assert_eq!(report["results"][0]["iterations"], 1);
}

#[test]
fn export_then_inspect() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("hlpi.xlsx");

    let output = xlbench()
        .args(["export", "--variant", "ooxml-table", "--data", &fixture(), "-o"])
        .arg(&out)
        .output()
        .expect("xlbench export");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(out.exists());

    let output = xlbench()
        .args(["inspect", "--json"])
        .arg(&out)
        .output()
        .expect("xlbench inspect");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["sheets"][0]["name"], "HlpiRecord");
    assert_eq!(value["sheets"][0]["rows"], 353);
    assert_eq!(value["tables"][0]["name"], "Table1");
    assert_eq!(value["tables"][0]["ref"], "A1:K353");
    assert_eq!(value["tables"][0]["auto_filter"], "A1:K353");
}

#[test]
fn unknown_variant_is_a_usage_error() {
    let output = xlbench()
        .args(["run", "--data", &fixture(), "--variant", "npoi"])
        .output()
        .expect("xlbench run");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_dataset_exits_4() {
    let output = xlbench()
        .args(["run", "--data", "/nonexistent/data.csv", "--variant", "simple"])
        .output()
        .expect("xlbench run");
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("hint:"));
}

#[test]
fn inspect_non_xlsx_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.xlsx");
    std::fs::write(&file, "just text").unwrap();

    let output = xlbench().arg("inspect").arg(&file).output().expect("xlbench inspect");
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("notes.xlsx"));

    let output = xlbench()
        .args(["inspect", "/nonexistent/book.xlsx"])
        .output()
        .expect("xlbench inspect");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn run_help_points_to_criterion_bench() {
    let output = xlbench().args(["run", "--help"]).output().expect("xlbench run --help");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("cargo bench -p xlbench-io --bench writers"));
}

#[test]
fn invalid_settings_exit_3() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "iterations = 0\n").unwrap();

    let output = xlbench()
        .args(["config", "--config", config.to_str().unwrap()])
        .output()
        .expect("xlbench config");
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn header_only_dataset_fails_table_variant_with_exit_5() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("empty.csv");
    std::fs::write(
        &data,
        "hlpi_name,series_ref,quarter,hlpi,nzhec,nzhec_name,nzhec_short,level,index,changeQ,changeA\n",
    )
    .unwrap();

    let output = xlbench()
        .args(["run", "-n", "1", "--variant", "ooxml-table", "--data"])
        .arg(&data)
        .output()
        .expect("xlbench run");
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("data row"));
}
