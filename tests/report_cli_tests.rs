// End-to-end report tests against recorded perf-script fixtures

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn damon_report() -> Command {
    assert_cmd::cargo::cargo_bin_cmd!("damon-report")
}

// ============================================================================
// raw
// ============================================================================

#[test]
fn test_raw_report_lists_snapshots() {
    damon_report()
        .arg("raw")
        .arg("--input")
        .arg(fixture("two_targets.perf"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("start_time: 1000000000\n"))
        .stdout(predicate::str::contains("relative_time: 400000000"))
        .stdout(predicate::str::contains("nr_regions: 3"))
        .stdout(predicate::str::contains("1000-2000 (4.000 KiB): 5"));
}

#[test]
fn test_raw_report_from_stdin() {
    damon_report()
        .arg("raw")
        .arg("--sz-bytes")
        .write_stdin(
            r#"{"target_id":7,"nr_regions":1,"start":0,"end":4096,"nr_accesses":3,"timestamp":42}"#,
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("target_id: 7"))
        .stdout(predicate::str::contains("0-1000 (4096): 3"));
}

#[test]
fn test_empty_trace_prints_nothing() {
    damon_report()
        .arg("raw")
        .write_stdin("# no events\n")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ============================================================================
// wss
// ============================================================================

#[test]
fn test_wss_percentiles_sorted_by_size() {
    damon_report()
        .args(["wss", "--sz-bytes", "--wss-range", "0,101,50", "--input"])
        .arg(fixture("two_targets.perf"))
        .assert()
        .success()
        .stdout("0 12288\n50 36864\n100 1572864\n");
}

#[test]
fn test_wss_percentiles_by_time() {
    damon_report()
        .args(["wss", "--sz-bytes", "--wss-sort", "time", "--wss-range", "0,100,20"])
        .arg("--input")
        .arg(fixture("two_targets.perf"))
        .assert()
        .success()
        .stdout("0 36864\n20 1048576\n40 12288\n60 1572864\n80 32768\n");
}

#[test]
fn test_wss_huge_percentiles_clamp() {
    damon_report()
        .args([
            "wss",
            "--sz-bytes",
            "--wss-range",
            "0,18446744073709551615,9223372036854775807",
            "--input",
        ])
        .arg(fixture("two_targets.perf"))
        .assert()
        .success()
        .stdout("0 12288\n9223372036854775807 1572864\n18446744073709551614 1572864\n");
}

#[test]
fn test_malformed_wss_range_fails() {
    damon_report()
        .args(["wss", "--wss-range", "0,101"])
        .arg("--input")
        .arg(fixture("two_targets.perf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed range"));
}

#[test]
fn test_unsupported_plot_fails_before_reading_trace() {
    damon_report()
        .args(["wss", "--plot", "wss.gif", "--input", "/nonexistent/trace.perf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported plot file type"))
        .stderr(predicate::str::contains("cannot open trace").not());
}

// ============================================================================
// record-profile
// ============================================================================

#[test]
fn test_record_profile_blocks() {
    damon_report()
        .arg("record-profile")
        .arg("--input")
        .arg(fixture("two_targets.perf"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "id: 0\ntime: 1000000000-1600000000 (600000000)\nnr_snapshots: 3\n\
             addr_space: 4096-65536 (61440)\nspace_gap0: 16384-32768\n",
        ))
        .stdout(predicate::str::contains(
            "id: 1\ntime: 1100000000-1500000000 (400000000)\nnr_snapshots: 2\n\
             addr_space: 1048576-3145728 (2097152)\nspace_gap0: 1572864-2097152\n",
        ));
}

// ============================================================================
// heatmap
// ============================================================================

#[test]
fn test_heatmap_default_target_pixels() {
    let assert = damon_report()
        .args(["heatmap", "--heatmap-res", "4", "2", "--input"])
        .arg(fixture("two_targets.perf"))
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    // Widest span is target 1's [2097152, 3145728), two accesses throughout
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "0\t0\t2");
    assert_eq!(lines[1], "0\t524288\t2");
    assert_eq!(lines[7], "150000000\t524288\t2");
}

#[test]
fn test_heatmap_absolute_coordinates() {
    damon_report()
        .args([
            "heatmap",
            "--heatmap-res",
            "1",
            "1",
            "--heatmap-abs-addr",
            "--heatmap-abs-time",
            "--input",
        ])
        .arg(fixture("two_targets.perf"))
        .assert()
        .success()
        .stdout("1100000000\t2097152\t2\n");
}

#[test]
fn test_heatmap_explicit_target_and_ranges() {
    damon_report()
        .args([
            "heatmap",
            "--heatmap-target",
            "0",
            "--heatmap-time-range",
            "1200000000",
            "1400000000",
            "--heatmap-space-range",
            "32768",
            "65536",
            "--heatmap-res",
            "1",
            "1",
            "--input",
        ])
        .arg(fixture("two_targets.perf"))
        .assert()
        .success()
        .stdout("0\t0\t7\n");
}

#[test]
fn test_heatmap_ascii_rendering() {
    damon_report()
        .args(["heatmap", "--heatmap-plot-ascii", "--input"])
        .arg(fixture("two_targets.perf"))
        .assert()
        .success()
        .stdout(predicate::str::contains("# temperature:"))
        .stdout(predicate::str::contains("# x-axis: space (2097152-3145728: 1024.000 KiB)"))
        .stdout(predicate::str::contains("# resolution: 80x40"));
}

#[test]
fn test_ascii_heatmap_with_plot_fails_before_reading_trace() {
    damon_report()
        .args([
            "heatmap",
            "--heatmap-plot-ascii",
            "--plot",
            "hm.png",
            "--input",
            "/nonexistent/trace.perf",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ascii heatmaps cannot be plotted"));
}

// ============================================================================
// logging
// ============================================================================

#[test]
fn test_rust_log_global_level_reaches_stderr() {
    damon_report()
        .env("RUST_LOG", "info")
        .args(["raw", "--input"])
        .arg(fixture("two_targets.perf"))
        .assert()
        .success()
        .stderr(predicate::str::contains("trace read"));
}

#[test]
fn test_default_logging_is_quiet() {
    damon_report()
        .env_remove("RUST_LOG")
        .args(["raw", "--input"])
        .arg(fixture("two_targets.perf"))
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

// ============================================================================
// reconstruction
// ============================================================================

#[test]
fn test_strict_reconstruction_rejects_target_switch() {
    damon_report()
        .args(["raw", "--strict", "--input"])
        .arg(fixture("target_switch.jsonl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_lenient_reconstruction_keeps_target_switch() {
    damon_report()
        .args(["raw", "--input"])
        .arg(fixture("target_switch.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("target_id: 0\nnr_regions: 2"));
}

#[test]
fn test_unparsable_event_reports_line() {
    damon_report()
        .arg("raw")
        .write_stdin("kdamond.0 1 [000] 1.0: damon:damon_aggregated: target_id=zero\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"));
}
