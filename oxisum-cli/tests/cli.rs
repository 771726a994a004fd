//! End-to-end tests for the oxisum binary.

use std::io::Write;
use std::process::{Command, Stdio};

fn cmd() -> Command {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.push("oxisum");
    Command::new(path)
}

#[test]
fn help_mentions_usage() {
    let output = cmd().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("cksum"));
}

#[test]
fn version_mentions_the_tool() {
    let output = cmd().arg("--version").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("oxisum"));
}

#[test]
fn stdin_has_no_filename_column() {
    let mut child = cmd()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"abc").unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parts: Vec<&str> = stdout.split_whitespace().collect();
    assert_eq!(parts, ["1219131554", "3"]);
}

#[test]
fn file_output_includes_the_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("abc.txt");
    std::fs::write(&path, b"abc").unwrap();

    let output = cmd().arg(path.to_str().unwrap()).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parts: Vec<&str> = stdout.split_whitespace().collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "1219131554");
    assert_eq!(parts[1], "3");
    assert!(parts[2].ends_with("abc.txt"));
}

#[test]
fn empty_file_is_all_ones() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty");
    std::fs::write(&path, b"").unwrap();

    let output = cmd().arg(path.to_str().unwrap()).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parts: Vec<&str> = stdout.split_whitespace().collect();
    assert_eq!(parts[0], "4294967295");
    assert_eq!(parts[1], "0");
}

#[test]
fn multiple_files_one_line_each_and_failures_do_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    std::fs::write(&a, b"a").unwrap();
    std::fs::write(&b, b"123456789").unwrap();

    let output = cmd()
        .arg(a.to_str().unwrap())
        .arg(dir.path().join("missing").to_str().unwrap())
        .arg(b.to_str().unwrap())
        .output()
        .unwrap();
    // missing file fails the run but the other files still print
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.trim().lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("1220704766 1"));
    assert!(lines[1].starts_with("930766865 9"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("oxisum:"));
    assert!(stderr.contains("missing"));
}

#[test]
fn raw_mode_emits_big_endian_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("abc");
    std::fs::write(&path, b"abc").unwrap();

    let output = cmd()
        .arg("--raw")
        .arg(path.to_str().unwrap())
        .output()
        .unwrap();
    assert!(output.status.success());
    // 1219131554 = 0x48AA78A2
    assert_eq!(output.stdout, vec![0x48, 0xAA, 0x78, 0xA2]);
}

#[test]
fn raw_mode_rejects_multiple_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    std::fs::write(&a, b"x").unwrap();
    std::fs::write(&b, b"y").unwrap();

    let output = cmd()
        .arg("--raw")
        .arg(a.to_str().unwrap())
        .arg(b.to_str().unwrap())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--raw"));
}

#[test]
fn tagged_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("abc");
    std::fs::write(&path, b"abc").unwrap();

    let output = cmd()
        .arg("--tag")
        .arg(path.to_str().unwrap())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("CRC ("));
    assert!(stdout.contains("= 1219131554 3"));
}

#[test]
fn explicit_algorithm_selector() {
    let mut child = cmd()
        .args(["-a", "crc"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"a").unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.split_whitespace().collect::<Vec<_>>(),
        ["1220704766", "1"]
    );
}

#[test]
fn dash_reads_stdin_among_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f");
    std::fs::write(&path, b"abc").unwrap();

    let mut child = cmd()
        .arg(path.to_str().unwrap())
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"a").unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.trim().lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("1219131554 3"));
    assert_eq!(lines[1], "1220704766 1");
}
