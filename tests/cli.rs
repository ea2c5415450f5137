//! Runs the binary against stub converter and proxmark scripts.
#![cfg(unix)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Proxmark stand-in that logs `-c` commands to `calls`.
fn proxmark(dir: &Path, calls: &Path) -> PathBuf {
    stub(
        dir,
        "proxmark3",
        &format!("echo \"$1|$3\" >> '{}'\necho \"ok $3\"", calls.display()),
    )
}

fn roulette() -> Command {
    let mut cmd = Command::cargo_bin("amiibo-roulette").unwrap();
    cmd.env_remove("MFUBIN2EML")
        .env_remove("PROXMARK")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help() {
    roulette()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Load random amiibo"))
        .stdout(predicate::str::contains("--single"))
        .stdout(predicate::str::contains("--reveal"))
        .stdout(predicate::str::contains("--process"))
        .stdout(predicate::str::contains("/dev/ttyACM0"));
}

#[test]
fn test_missing_source() {
    roulette()
        .env("PROXMARK", "/bin/true")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_missing_proxmark_env() {
    roulette()
        .arg("/tags")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--proxmark"));
}

#[test]
fn test_process_requires_converter() {
    roulette()
        .env("PROXMARK", "/bin/true")
        .args(["--single", "--process", "/tags/a.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--mfubin2eml"));
}

#[test]
fn test_random_eml_end_to_end() {
    let tools = TempDir::new().unwrap();
    let tags = TempDir::new().unwrap();
    fs::write(tags.path().join("a.eml"), "A5A5").unwrap();
    fs::write(tags.path().join("b.eml"), "5A5A").unwrap();
    let calls = tools.path().join("calls");

    roulette()
        .env("PROXMARK", proxmark(tools.path(), &calls))
        .arg(tags.path())
        .arg("--reveal")
        .assert()
        .success()
        .stdout(predicate::str::contains("[+] Loading "))
        .stdout(predicate::str::contains("[+] hf mfu sim -t 7"));

    let calls = fs::read_to_string(&calls).unwrap();
    let lines: Vec<_> = calls.lines().collect();
    assert_eq!(lines.len(), 2);

    let loaded = lines[0].strip_prefix("/dev/ttyACM0|hf mfu eload -f ").unwrap();
    assert!(
        loaded == tags.path().join("a.eml").to_str().unwrap()
            || loaded == tags.path().join("b.eml").to_str().unwrap()
    );
    assert_eq!(lines[1], "/dev/ttyACM0|hf mfu sim -t 7");
}

#[test]
fn test_single_process_end_to_end() {
    let tools = TempDir::new().unwrap();
    let tags = TempDir::new().unwrap();
    let dump = tags.path().join("a.bin");
    fs::write(&dump, [0u8; 540]).unwrap();
    let calls = tools.path().join("calls");
    let converter = stub(
        tools.path(),
        "mfubin2eml",
        "printf '04A1B2C3\\n'\necho 'hf mf eload u X' >&2\necho 'hf mfu sim -t 7' >&2",
    );

    roulette()
        .env("PROXMARK", proxmark(tools.path(), &calls))
        .env("MFUBIN2EML", converter)
        .args(["--single", "--process", "--device", "/dev/ttyUSB3"])
        .arg(&dump)
        .assert()
        .success()
        .stdout(predicate::str::contains("[+] Invoking mfubin2eml"));

    let calls = fs::read_to_string(&calls).unwrap();
    let lines: Vec<_> = calls.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("/dev/ttyUSB3|hf mfu eload -f "));
    assert!(lines[0].ends_with(".eml"));
    assert_eq!(lines[1], "/dev/ttyUSB3|hf mfu sim -t 7");
}

#[test]
fn test_single_process_wrong_suffix() {
    let tools = TempDir::new().unwrap();
    let calls = tools.path().join("calls");
    let converter_ran = tools.path().join("converter-ran");
    let converter = stub(
        tools.path(),
        "mfubin2eml",
        &format!("touch '{}'", converter_ran.display()),
    );

    roulette()
        .env("PROXMARK", proxmark(tools.path(), &calls))
        .env("MFUBIN2EML", converter)
        .args(["--single", "--process", "/tags/a.eml"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("[!] "))
        .stdout(predicate::str::contains("internal error").not())
        .stdout(predicate::str::contains("does not end with .bin"));

    assert!(!converter_ran.exists());
    assert!(!calls.exists());
}

#[test]
fn test_no_matching_files() {
    let tools = TempDir::new().unwrap();
    let tags = TempDir::new().unwrap();
    fs::write(tags.path().join("a.bin"), "").unwrap();

    roulette()
        .env("PROXMARK", proxmark(tools.path(), &tools.path().join("calls")))
        .arg(tags.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("no files ending with .eml"));
}

#[test]
fn test_device_failure_exit_code() {
    let tools = TempDir::new().unwrap();
    let tags = TempDir::new().unwrap();
    fs::write(tags.path().join("a.eml"), "A5A5").unwrap();

    roulette()
        .env(
            "PROXMARK",
            stub(tools.path(), "proxmark3", "echo 'cannot open port'\nexit 1"),
        )
        .arg(tags.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[+] cannot open port"))
        .stdout(predicate::str::contains("failed with"));
}
