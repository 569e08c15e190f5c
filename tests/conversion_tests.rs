//! End-to-end conversion tests against the compiled binary
//!
//! Each test writes a small recorded top log to a temp directory, runs the
//! binary over it, and asserts on the rendered table.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const HEADER: &str =
    "    PID USER      PR  NI    VIRT    RES    SHR S  %CPU  %MEM     TIME+ COMMAND\n";

fn proc_line(pid: u32, cpu: &str, mem: &str, command: &str) -> String {
    format!(
        " {:6} root      20   0   10000   2000   1000 S {:>5} {:>5}   0:00.01 {}\n",
        pid, cpu, mem, command
    )
}

fn write_log(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn topcsv() -> Command {
    Command::cargo_bin("topcsv").unwrap()
}

/// Warm-up block with one process, then two retained blocks for pid 100.
fn three_block_log() -> String {
    let mut log = String::from(HEADER);
    log.push_str(&proc_line(100, "1.0", "0.5", "worker"));
    log.push_str(HEADER);
    log.push_str(&proc_line(100, "4.0", "0.5", "worker"));
    log.push_str(HEADER);
    log.push_str(&proc_line(100, "8.0", "0.5", "worker"));
    log
}

#[test]
fn test_e2e_cpu_series() {
    let dir = TempDir::new().unwrap();
    let input = write_log(&dir, "top.log", &three_block_log());

    topcsv()
        .arg(&input)
        .assert()
        .success()
        .stdout("command,1,2\nworker,4,8\n");
}

#[test]
fn test_e2e_zero_fill_and_ordering() {
    // Block A: {100: 10, 200: 50}; block B: {100: 10}. Totals 100 -> 20,
    // 200 -> 50, so 200 leads and its second column is zero-filled.
    let mut log = String::from(HEADER);
    log.push_str(&proc_line(999, "1.0", "0.1", "warmup"));
    log.push_str(HEADER);
    log.push_str(&proc_line(100, "10.0", "0.1", "steady"));
    log.push_str(&proc_line(200, "50.0", "0.1", "spike"));
    log.push_str(HEADER);
    log.push_str(&proc_line(100, "10.0", "0.1", "steady"));

    let dir = TempDir::new().unwrap();
    let input = write_log(&dir, "top.log", &log);

    topcsv()
        .arg(&input)
        .assert()
        .success()
        .stdout("command,1,2\nspike,50,0\nsteady,10,10\n");
}

#[test]
fn test_warm_up_discard_leaves_no_columns() {
    // Exactly two headers: the only completed block is the warm-up discard
    // and there is no trailing block, so the table has zero data columns.
    let mut log = String::from(HEADER);
    log.push_str(&proc_line(100, "4.0", "0.5", "worker"));
    log.push_str(HEADER);

    let dir = TempDir::new().unwrap();
    let input = write_log(&dir, "top.log", &log);

    topcsv().arg(&input).assert().success().stdout("command\n");
}

#[test]
fn test_metric_rounding() {
    let mut log = String::from(HEADER);
    log.push_str(HEADER);
    log.push_str(&proc_line(1, "4.6", "0.0", "high"));
    log.push_str(&proc_line(2, "4.4", "0.0", "low"));

    let dir = TempDir::new().unwrap();
    let input = write_log(&dir, "top.log", &log);

    topcsv()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("high,5\n"))
        .stdout(predicate::str::contains("low,4\n"));
}

#[test]
fn test_memory_metric_flag() {
    let mut log = String::from(HEADER);
    log.push_str(HEADER);
    log.push_str(&proc_line(100, "4.0", "2.7", "worker"));

    let dir = TempDir::new().unwrap();
    let input = write_log(&dir, "top.log", &log);

    topcsv()
        .arg("-m")
        .arg(&input)
        .assert()
        .success()
        .stdout("command,1\nworker,3\n");
}

#[test]
fn test_prettify_strips_executable_path() {
    let mut log = String::from(HEADER);
    log.push_str(HEADER);
    log.push_str(&proc_line(100, "4.0", "0.1", "/usr/bin/python3 manage.py runserver"));
    log.push_str(&proc_line(7, "1.0", "0.0", "[kworker/0:1-events]"));

    let dir = TempDir::new().unwrap();
    let input = write_log(&dir, "top.log", &log);

    topcsv()
        .arg("--prettify")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("python3 manage.py runserver,4\n"))
        .stdout(predicate::str::contains("[kworker/0:1-events],1\n"));
}

#[test]
fn test_names_first_token() {
    let mut log = String::from(HEADER);
    log.push_str(HEADER);
    log.push_str(&proc_line(100, "4.0", "0.1", "nginx: worker process"));

    let dir = TempDir::new().unwrap();
    let input = write_log(&dir, "top.log", &log);

    topcsv()
        .arg("--names")
        .arg("first-token")
        .arg(&input)
        .assert()
        .success()
        .stdout("command,1\nnginx:,4\n");
}

#[test]
fn test_idempotent_rerun() {
    let dir = TempDir::new().unwrap();
    let input = write_log(&dir, "top.log", &three_block_log());

    let first = topcsv().arg(&input).assert().success();
    let second = topcsv().arg(&input).assert().success();
    assert_eq!(first.get_output().stdout, second.get_output().stdout);
}

#[test]
fn test_output_files_mode_writes_sibling() {
    let dir = TempDir::new().unwrap();
    let input = write_log(&dir, "top.log", &three_block_log());

    let assert = topcsv().arg("-o").arg(&input).assert().success();

    let sibling = dir.path().join("top.log.csv");
    let written = fs::read(&sibling).unwrap();
    assert_eq!(written, b"command,1,2\nworker,4,8\n");
    // The stdout echo carries the same bytes as the sibling file.
    assert_eq!(assert.get_output().stdout, written);
}

#[test]
fn test_batch_continues_after_unreadable_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.log");
    let good = write_log(&dir, "good.log", &three_block_log());

    topcsv()
        .arg(&missing)
        .arg(&good)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.log"))
        .stderr(predicate::str::contains("1 of 2 file(s) failed"))
        .stdout(predicate::str::contains("worker,4,8\n"));
}

#[test]
fn test_fixture_log_cpu_series() {
    let fixture = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/top-sample.log");

    topcsv().arg(fixture).assert().success().stdout(
        "command,1,2,3\n\
         nginx: worker process,12,9,10\n\
         /usr/lib/postgresql/14/bin/postgres -D /var/lib/postgresql/14/main,3,4,2\n\
         [kworker/0:1-events],0,0,1\n",
    );
}

#[test]
fn test_uniform_column_count() {
    let fixture = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/top-sample.log");

    let assert = topcsv().arg(fixture).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let mut counts = stdout.lines().map(|line| line.split(',').count());
    let header_fields = counts.next().unwrap();
    assert_eq!(header_fields, 4);
    assert!(counts.all(|fields| fields == header_fields));
}
