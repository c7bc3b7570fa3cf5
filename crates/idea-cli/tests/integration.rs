#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn idea(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("idea").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_API_URL")
        .env_remove("IDEA_CONFIG")
        .env_remove("IDEA_VERBOSE")
        .env_remove("RUST_LOG");
    cmd
}

fn design_value(n: u32) -> Value {
    json!({
        "design_markdown": "# Overview\nTracks reading habits.\n# Goals\n- ship",
        "issues": (1..=n).map(|i| json!({
            "title": format!("Task {i}"),
            "body": "## Acceptance Criteria\n- works\n## Notes\n- none",
            "labels": ["backend"],
            "priority": "P1",
            "order": i
        })).collect::<Vec<_>>()
    })
}

fn write_design(dir: &TempDir, value: &Value) -> std::path::PathBuf {
    let path = dir.path().join("design.json");
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

// ---------------------------------------------------------------------------
// idea name
// ---------------------------------------------------------------------------

#[test]
fn name_truncates_to_default_length() {
    let dir = TempDir::new().unwrap();
    idea(&dir)
        .args(["name", "A tool that tracks reading habits"])
        .assert()
        .success()
        .stdout("a-tool-that-tracks-reading-hab\n");
}

#[test]
fn name_respects_max_len_and_json() {
    let dir = TempDir::new().unwrap();
    let output = idea(&dir)
        .args(["--json", "name", "Habit tracker app", "--max-len", "14"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["project_name"], "habit-tracker");
}

#[test]
fn name_reads_max_len_from_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("idea.yaml"), "naming:\n  max_len: 5\n").unwrap();
    idea(&dir)
        .args(["name", "Recipe planner"])
        .assert()
        .success()
        .stdout("recip\n");
}

// ---------------------------------------------------------------------------
// idea validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_conforming_design() {
    let dir = TempDir::new().unwrap();
    let path = write_design(&dir, &design_value(15));
    idea(&dir)
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid (15 issues)"))
        .stdout(predicate::str::contains("warning: design is missing heading '# Milestones'"));
}

#[test]
fn validate_rejects_order_zero_with_field_path() {
    let dir = TempDir::new().unwrap();
    let mut value = design_value(15);
    value["issues"][0]["order"] = json!(0);
    let path = write_design(&dir, &value);
    idea(&dir)
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("issues[0].order"));
}

#[test]
fn validate_json_lists_violations() {
    let dir = TempDir::new().unwrap();
    let path = write_design(&dir, &json!({"issues": []}));
    let output = idea(&dir).arg("--json").arg("validate").arg(&path).output().unwrap();
    assert!(!output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["valid"], false);
    let paths: Vec<&str> = value["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"design_markdown"));
}

#[test]
fn validate_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    idea(&dir)
        .args(["validate", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read nope.json"));
}

// ---------------------------------------------------------------------------
// idea config
// ---------------------------------------------------------------------------

#[test]
fn config_show_prints_defaults_and_hides_token() {
    let dir = TempDir::new().unwrap();
    idea(&dir)
        .args(["config", "show"])
        .env("GITHUB_TOKEN", "ghp_supersecret")
        .assert()
        .success()
        .stdout(predicate::str::contains("marker_label: idea-backlog"))
        .stdout(predicate::str::contains("# token: present"))
        .stdout(predicate::str::contains("ghp_supersecret").not());
}

#[test]
fn explicit_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    idea(&dir)
        .args(["--config", "missing.yaml", "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn blank_marker_with_managed_reconcile_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("idea.yaml"), "github:\n  marker_label: \"\"\n").unwrap();
    idea(&dir)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("github.marker_label must not be empty"));
}

// ---------------------------------------------------------------------------
// idea run / mcp (no generator spawned)
// ---------------------------------------------------------------------------

#[test]
fn run_rejects_short_idea() {
    let dir = TempDir::new().unwrap();
    idea(&dir)
        .arg("run")
        .write_stdin("abc\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 5 characters"));
}

#[test]
fn mcp_lists_generate_design() {
    let dir = TempDir::new().unwrap();
    let input = concat!(
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\",\"params\":{}}\n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/list\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"tools/call\",\"params\":{\"name\":\"generate_design\",\"arguments\":{\"idea\":\"app\"}}}\n",
    );
    let output = idea(&dir).arg("mcp").write_stdin(input).output().unwrap();
    assert!(output.status.success());

    let responses: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[1]["result"]["tools"][0]["name"], "generate_design");
    assert_eq!(responses[2]["result"]["isError"], true);
}

// ---------------------------------------------------------------------------
// idea sync
// ---------------------------------------------------------------------------

#[test]
fn sync_without_token_fails_before_network() {
    let dir = TempDir::new().unwrap();
    let path = write_design(&dir, &design_value(15));
    idea(&dir)
        .arg("sync")
        .arg("--design")
        .arg(&path)
        .args(["--name", "reading-tracker"])
        // Unroutable: any request would fail with a transport error instead.
        .env("GITHUB_API_URL", "http://127.0.0.1:1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GITHUB_TOKEN not found in environment"));
}

#[test]
fn sync_requires_a_name_source() {
    let dir = TempDir::new().unwrap();
    let path = write_design(&dir, &design_value(15));
    idea(&dir)
        .arg("sync")
        .arg("--design")
        .arg(&path)
        .env("GITHUB_TOKEN", "test-token")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no repository name"));
}

#[test]
fn sync_creates_repository_and_issues() {
    let mut server = mockito::Server::new();
    let user = server
        .mock("GET", "/user")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_body(r#"{"login":"octo"}"#)
        .create();
    let repo = server
        .mock("POST", "/user/repos")
        .match_body(mockito::Matcher::PartialJson(json!({
            "name": "a-tool-that-tracks-reading-hab",
            "description": "Repository for: A tool that tracks reading habits",
            "private": false
        })))
        .with_status(201)
        .with_body("{}")
        .create();
    let issues = server
        .mock("POST", "/repos/octo/a-tool-that-tracks-reading-hab/issues")
        .match_body(mockito::Matcher::Regex("idea-backlog".into()))
        .with_status(201)
        .with_body(r#"{"number":1,"title":"Task","html_url":"https://github.test/i/1"}"#)
        .expect(15)
        .create();

    let dir = TempDir::new().unwrap();
    let path = write_design(&dir, &design_value(15));
    idea(&dir)
        .arg("sync")
        .arg("--design")
        .arg(&path)
        .args(["--idea", "A tool that tracks reading habits"])
        .env("GITHUB_TOKEN", "test-token")
        .env("GITHUB_API_URL", server.url())
        .assert()
        .success()
        .stdout(predicate::str::contains("Repository: octo/a-tool-that-tracks-reading-hab (created)"))
        .stdout(predicate::str::contains("Created 15 issue(s), 0 failed, 0 skipped"))
        .stdout(predicate::str::contains("Outcome: success"))
        .stderr(predicate::str::contains("test-token").not());

    user.assert();
    repo.assert();
    issues.assert();
}

#[test]
fn sync_reports_partial_success_with_exit_code_2() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/user")
        .with_status(200)
        .with_body(r#"{"login":"octo"}"#)
        .create();
    server.mock("POST", "/user/repos").with_status(201).with_body("{}").create();
    server
        .mock("POST", "/repos/octo/reading-tracker/issues")
        .with_status(500)
        .with_body(r#"{"message":"boom"}"#)
        .create();

    let dir = TempDir::new().unwrap();
    let path = write_design(&dir, &design_value(15));
    let output = idea(&dir)
        .arg("--json")
        .arg("sync")
        .arg("--design")
        .arg(&path)
        .args(["--name", "reading-tracker"])
        .env("GITHUB_TOKEN", "test-token")
        .env("GITHUB_API_URL", server.url())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["outcome"], "partial_success");
    assert_eq!(value["report"]["failures"].as_array().unwrap().len(), 15);
    assert_eq!(value["report"]["failures"][0]["status"], 500);
}

#[test]
fn sync_aborts_on_unexplained_name_conflict() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/user")
        .with_status(200)
        .with_body(r#"{"login":"octo"}"#)
        .create();
    server
        .mock("POST", "/user/repos")
        .with_status(422)
        .with_body(r#"{"message":"name already exists on this account"}"#)
        .create();
    server
        .mock("GET", "/repos/octo/reading-tracker")
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create();
    let issues = server
        .mock("POST", "/repos/octo/reading-tracker/issues")
        .expect(0)
        .create();

    let dir = TempDir::new().unwrap();
    let path = write_design(&dir, &design_value(15));
    idea(&dir)
        .arg("sync")
        .arg("--design")
        .arg(&path)
        .args(["--name", "reading-tracker"])
        .env("GITHUB_TOKEN", "test-token")
        .env("GITHUB_API_URL", server.url())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("sync aborted at resolve_repo"))
        .stderr(predicate::str::contains("could not be fetched"))
        .stderr(predicate::function(|err: &str| err.matches("Not Found").count() == 1));

    issues.assert();
}

#[test]
fn sync_reuses_saved_project_name() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/user")
        .with_status(200)
        .with_body(r#"{"login":"octo"}"#)
        .create();
    let repo = server
        .mock("POST", "/user/repos")
        .match_body(mockito::Matcher::PartialJson(json!({
            "name": "saved-name",
            "description": "Repository for: Track what I read"
        })))
        .with_status(201)
        .with_body("{}")
        .create();
    let issues = server
        .mock("POST", "/repos/octo/saved-name/issues")
        .with_status(201)
        .with_body(r#"{"number":7,"title":"Task"}"#)
        .expect(15)
        .create();

    let dir = TempDir::new().unwrap();
    let mut bundle = design_value(15);
    bundle["project_name"] = json!("saved-name");
    bundle["idea"] = json!("Track what I read");
    let path = write_design(&dir, &bundle);
    idea(&dir)
        .arg("sync")
        .arg("--design")
        .arg(&path)
        .env("GITHUB_TOKEN", "test-token")
        .env("GITHUB_API_URL", server.url())
        .assert()
        .success();

    repo.assert();
    issues.assert();
}
