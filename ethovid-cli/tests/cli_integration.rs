// ============================================================================
// ethovid-cli/tests/cli_integration.rs
// ============================================================================
//
// Drives the compiled `ethovid` binary end to end, mirroring the teacher's
// own `cli_integration.rs` (an `assert_cmd::Command` against the compiled
// binary, with a tempdir standing in for real input/output files). These
// exercise argument parsing and the job-not-found/profile-not-found
// failure paths, which don't require a real video file or ffmpeg/opencv.
//
// AI-ASSISTANT-INFO: CLI integration tests driving the compiled binary

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::tempdir;

fn ethovid_cmd() -> Command {
    Command::cargo_bin("ethovid").expect("failed to find ethovid binary")
}

#[test]
fn help_lists_every_subcommand() {
    ethovid_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("submit"))
        .stdout(contains("status"))
        .stdout(contains("list"))
        .stdout(contains("cancel"))
        .stdout(contains("recommend"));
}

#[test]
fn status_for_an_unknown_job_id_fails_without_panicking() {
    ethovid_cmd()
        .args(["status", "does-not-exist"])
        .assert()
        .failure();
}

#[test]
fn cancel_for_an_unknown_job_id_reports_not_cancelled_as_json() {
    ethovid_cmd()
        .args(["--json", "cancel", "does-not-exist"])
        .assert()
        .success()
        .stdout(contains("\"cancelled\":false"));
}

#[test]
fn submit_with_an_unknown_profile_fails_before_touching_the_filesystem() {
    let input_dir = tempdir().expect("tempdir");
    let input_path = input_dir.path().join("session.mp4");
    std::fs::write(&input_path, b"not a real video").expect("write dummy input");
    let output_path = input_dir.path().join("out.mp4");

    ethovid_cmd()
        .args([
            "submit",
            input_path.to_str().unwrap(),
            output_path.to_str().unwrap(),
            "--profile",
            "does-not-exist",
        ])
        .assert()
        .failure();

    assert!(!output_path.exists());
}

#[test]
fn list_with_no_jobs_submitted_reports_none() {
    ethovid_cmd().arg("list").assert().success();
}
