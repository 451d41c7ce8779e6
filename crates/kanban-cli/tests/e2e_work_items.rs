//! E2E CLI tests covering:
//! - `kb init` project bootstrap and the uninitialized-project error
//! - `kb user add/list`
//! - create/update/delete/show/list round trips through the SQLite store
//! - refusal codes (active delete, unknown assignee, missing item)
//!
//! Each test runs `kb` as a subprocess in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

fn kb_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kb"));
    cmd.current_dir(dir);
    cmd.env("KANBAN_LOG", "error");
    cmd.env_remove("KANBAN_DB");
    cmd.env_remove("KANBAN_FORMAT");
    cmd
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = kb_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("kb should not crash");
    assert!(
        output.status.success(),
        "kb {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

fn run_json_failure(dir: &Path, args: &[&str]) -> Value {
    let output = kb_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("kb should not crash");
    assert!(!output.status.success(), "kb {args:?} unexpectedly succeeded");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let json_start = stderr.find('{').expect("stderr should contain a JSON error");
    let mut stream = serde_json::Deserializer::from_str(&stderr[json_start..]).into_iter::<Value>();
    stream
        .next()
        .expect("one JSON value")
        .expect("stderr error should be valid JSON")
}

fn add_user(dir: &Path, name: &str) -> i64 {
    let email = format!("{}@example.com", name.to_lowercase());
    run_json(dir, &["user", "add", "--name", name, "--email", &email])["id"]
        .as_i64()
        .expect("user id")
}

fn create_item(dir: &Path, title: &str, user: i64, tags: &[&str]) -> i64 {
    let user = user.to_string();
    let mut args = vec!["create", "--title", title, "--user", user.as_str()];
    for tag in tags {
        args.extend_from_slice(&["--tag", tag]);
    }
    let json = run_json(dir, &args);
    assert_eq!(json["result"], "created");
    json["id"].as_i64().expect("work item id")
}

/// Initialized project with Adrian and Anna, Pasta active and Rice new.
fn kitchen() -> (TempDir, i64, i64) {
    let dir = TempDir::new().expect("tempdir");
    kb_cmd(dir.path()).arg("init").assert().success();

    let adrian = add_user(dir.path(), "Adrian");
    let anna = add_user(dir.path(), "Anna");

    let pasta = create_item(dir.path(), "Make Pasta", adrian, &["Doing"]);
    let rice = create_item(dir.path(), "Make Rice", anna, &["To Do"]);
    run_json(dir.path(), &["update", &pasta.to_string(), "--state", "active"]);

    (dir, pasta, rice)
}

fn titles(list: &Value) -> Vec<String> {
    let mut titles: Vec<String> = list
        .as_array()
        .expect("list output is an array")
        .iter()
        .map(|item| item["title"].as_str().expect("title").to_string())
        .collect();
    titles.sort();
    titles
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_store() {
    let dir = TempDir::new().unwrap();
    let json = run_json(dir.path(), &["init"]);

    assert!(dir.path().join(".kanban/config.toml").exists());
    assert!(dir.path().join(".kanban/kanban.sqlite3").exists());
    assert_eq!(json["schema_version"], 3);
}

#[test]
fn init_twice_requires_force() {
    let dir = TempDir::new().unwrap();
    kb_cmd(dir.path()).arg("init").assert().success();
    kb_cmd(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("kb init --force"));
    kb_cmd(dir.path()).args(["init", "--force"]).assert().success();
}

#[test]
fn commands_before_init_report_not_initialized() {
    let dir = TempDir::new().unwrap();
    let err = run_json_failure(dir.path(), &["list"]);
    assert_eq!(err["error"]["error_code"], "E1001");
}

#[test]
fn kanban_db_env_relocates_the_store() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("elsewhere/board.sqlite3");

    kb_cmd(dir.path())
        .env("KANBAN_DB", &db)
        .arg("init")
        .assert()
        .success();
    assert!(db.exists());
    assert!(!dir.path().join(".kanban/kanban.sqlite3").exists());

    kb_cmd(dir.path())
        .env("KANBAN_DB", &db)
        .args(["user", "add", "--name", "Adrian", "--email", "a@example.com"])
        .assert()
        .success();
}

#[test]
fn users_are_listed_in_id_order() {
    let dir = TempDir::new().unwrap();
    kb_cmd(dir.path()).arg("init").assert().success();
    add_user(dir.path(), "Adrian");
    add_user(dir.path(), "Anna");

    let users = run_json(dir.path(), &["user", "list"]);
    let names: Vec<&str> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Adrian", "Anna"]);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn show_reports_full_details() {
    let (dir, pasta, _) = kitchen();
    let details = run_json(dir.path(), &["show", &pasta.to_string()]);

    assert_eq!(details["title"], "Make Pasta");
    assert_eq!(details["state"], "active");
    assert_eq!(details["assigned_to_name"], "Adrian");
    assert_eq!(details["tags"], serde_json::json!(["Doing"]));
    assert!(details["created"].is_string());
    assert!(details["state_updated"].is_string());
}

#[test]
fn deleting_active_item_is_refused() {
    let (dir, pasta, _) = kitchen();

    let err = run_json_failure(dir.path(), &["delete", &pasta.to_string()]);
    assert_eq!(err["error"]["error_code"], "E2003");

    run_json(dir.path(), &["show", &pasta.to_string()]);
}

#[test]
fn deleting_inactive_item_removes_it() {
    let (dir, _, rice) = kitchen();

    let json = run_json(dir.path(), &["delete", &rice.to_string()]);
    assert_eq!(json["result"], "deleted");

    let err = run_json_failure(dir.path(), &["show", &rice.to_string()]);
    assert_eq!(err["error"]["error_code"], "E2001");

    let tags = run_json(dir.path(), &["tags"]);
    let names: Vec<&str> = tags
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"To Do"));
}

#[test]
fn update_with_unknown_user_is_a_bad_request() {
    let (dir, _, rice) = kitchen();

    let err = run_json_failure(dir.path(), &["update", &rice.to_string(), "--user", "45"]);
    assert_eq!(err["error"]["error_code"], "E2002");

    let details = run_json(dir.path(), &["show", &rice.to_string()]);
    assert_eq!(details["assigned_to_name"], "Anna");
}

#[test]
fn create_with_unknown_user_is_created_as_new() {
    let (dir, _, _) = kitchen();
    let created = run_json(
        dir.path(),
        &["create", "--title", "Play Computer", "--user", "45", "--tag", "Must Do"],
    );
    assert_eq!(created["result"], "created");
    let id = created["id"].as_i64().unwrap().to_string();

    let details = run_json(dir.path(), &["show", &id]);
    assert_eq!(details["state"], "new");
    assert_eq!(details["assigned_to_id"], 45);
    assert!(details["assigned_to_name"].is_null());

    let listed = run_json(dir.path(), &["list", "--user", "45"]);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Updating it still requires an existing assignee.
    let err = run_json_failure(dir.path(), &["update", &id, "--state", "active"]);
    assert_eq!(err["error"]["error_code"], "E2002");
}

#[test]
fn update_missing_item_is_not_found() {
    let (dir, _, _) = kitchen();
    let err = run_json_failure(dir.path(), &["update", "999", "--title", "Nope"]);
    assert_eq!(err["error"]["error_code"], "E2001");
}

#[test]
fn update_replaces_tags_and_keeps_other_fields() {
    let (dir, _, rice) = kitchen();
    let id = rice.to_string();

    run_json(dir.path(), &["update", &id, "--tag", "Some Tag2", "--tag", "Some Tag3"]);

    let details = run_json(dir.path(), &["show", &id]);
    assert_eq!(details["tags"], serde_json::json!(["Some Tag2", "Some Tag3"]));
    assert_eq!(details["title"], "Make Rice");
    assert_eq!(details["state"], "new");
}

#[test]
fn invalid_state_is_rejected_with_code() {
    let (dir, pasta, _) = kitchen();
    let err = run_json_failure(dir.path(), &["update", &pasta.to_string(), "--state", "doing"]);
    assert_eq!(err["error"]["error_code"], "E2004");
}

#[test]
fn state_change_moves_state_updated_but_title_change_does_not() {
    let (dir, _, rice) = kitchen();
    let id = rice.to_string();

    let before = run_json(dir.path(), &["show", &id]);
    run_json(dir.path(), &["update", &id, "--title", "Make Brown Rice"]);
    let retitled = run_json(dir.path(), &["show", &id]);
    assert_eq!(retitled["state_updated"], before["state_updated"]);

    run_json(dir.path(), &["update", &id, "--state", "resolved"]);
    let resolved = run_json(dir.path(), &["show", &id]);
    assert_ne!(resolved["state_updated"], before["state_updated"]);
    assert_eq!(resolved["created"], before["created"]);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[test]
fn list_filters_by_tag_user_and_state() {
    let (dir, _, _) = kitchen();

    assert_eq!(titles(&run_json(dir.path(), &["list"])), vec!["Make Pasta", "Make Rice"]);
    assert_eq!(titles(&run_json(dir.path(), &["list", "--tag", "Doing"])), vec!["Make Pasta"]);
    assert_eq!(titles(&run_json(dir.path(), &["list", "--user", "2"])), vec!["Make Rice"]);
    assert_eq!(
        titles(&run_json(dir.path(), &["list", "--state", "active"])),
        vec!["Make Pasta"]
    );
    assert!(titles(&run_json(dir.path(), &["list", "--tag", "doing"])).is_empty());
}

#[test]
fn shared_tag_names_map_to_one_tag() {
    let (dir, _, _) = kitchen();
    create_item(dir.path(), "Boil Water", 2, &["Doing", "Doing"]);

    let tags = run_json(dir.path(), &["tags"]);
    let doing = tags
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["name"] == "Doing")
        .count();
    assert_eq!(doing, 1);
    assert_eq!(run_json(dir.path(), &["list", "--tag", "Doing"]).as_array().unwrap().len(), 2);
}

#[test]
fn text_output_is_tab_separated() {
    let (dir, pasta, _) = kitchen();
    kb_cmd(dir.path())
        .args(["list", "--tag", "Doing", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{pasta}\tactive\tMake Pasta\tAdrian\tDoing")));
}

#[test]
fn completions_generate_for_bash() {
    let dir = TempDir::new().unwrap();
    kb_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kb"));
}
