//! Integration tests for the `td` CLI.
//!
//! Each test runs `td` as a subprocess against a data directory inside a
//! temp dir and checks stdout, stderr and the mirrored `tasks.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;

const FUTURE: &str = "2099-12-31";
const PDF: &str = "data:application/pdf;base64,JVBERg==";

/// Get the path to the built `td` binary.
fn td_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("td");
    path
}

/// Run `td -C data <args>` in `dir`, return (stdout, stderr, success).
fn run_td(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(td_bin())
        .args(["-C", "data"])
        .args(args)
        .current_dir(dir)
        .env_remove("TASKDESK_DIR")
        .env_remove("TASKDESK_LOG")
        .output()
        .expect("failed to run td");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `td` expecting success, return stdout.
fn run_td_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_td(dir, args);
    if !success {
        panic!(
            "td {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `td` expecting failure, return stderr.
fn run_td_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_td(dir, args);
    if success {
        panic!("td {:?} unexpectedly succeeded:\nstdout: {}", args, stdout);
    }
    stderr
}

/// Add a valid task and return its id.
fn add_task(dir: &Path, title: &str) -> String {
    let out = run_td_ok(
        dir,
        &[
            "add",
            "--title",
            title,
            "--due",
            FUTURE,
            "--email",
            "ops@example.com",
            "--phone",
            "123-456-7890",
            "--url",
            "https://example.com",
            "--attachment",
            PDF,
        ],
    );
    out.trim().to_string()
}

fn mirror(dir: &Path) -> serde_json::Value {
    let text = fs::read_to_string(dir.join("data").join("tasks.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn show_json(dir: &Path, id: &str) -> serde_json::Value {
    let out = run_td_ok(dir, &["show", id, "--json"]);
    serde_json::from_str(&out).unwrap()
}

fn write_config(dir: &Path, toml: &str) {
    let data = dir.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("taskdesk.toml"), toml).unwrap();
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

#[test]
fn test_add_list_show() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add_task(tmp.path(), "Plan offsite");
    assert_eq!(id.len(), 36);

    let out = run_td_ok(tmp.path(), &["list"]);
    assert!(out.contains(&format!("[ ] {} Plan offsite (due {}, Low)", id, FUTURE)));

    let out = run_td_ok(tmp.path(), &["show", &id]);
    assert!(out.contains("email:      ops@example.com"));
    assert!(out.contains("attachment: application/pdf (8 chars)"));

    let stored = mirror(tmp.path());
    assert_eq!(stored.as_array().unwrap().len(), 1);
    assert_eq!(stored[0]["id"], id.as_str());
    assert_eq!(stored[0]["dueDate"], FUTURE);
    assert_eq!(stored[0]["status"], "Pending");
    assert_eq!(stored[0]["color"], "#000000");
}

#[test]
fn test_add_json_round_trip() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_td_ok(
        tmp.path(),
        &[
            "--json",
            "add",
            "--title",
            "Quarterly review",
            "--due",
            FUTURE,
            "--email",
            "a@b.co",
            "--phone",
            "+12345678901",
            "--url",
            "http://example.org/q3",
            "--urgent",
            "--priority",
            "High",
            "--progress",
            "75",
            "--attachment",
            PDF,
            "--color",
            "#1a2B3c",
            "--status",
            "In Progress",
        ],
    );
    let created: serde_json::Value = serde_json::from_str(&out).unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["isUrgent"], true);
    assert_eq!(created["progress"], 75);
    assert_eq!(created["status"], "In Progress");

    let shown = show_json(tmp.path(), &id);
    assert_eq!(shown, created);
}

#[test]
fn test_add_invalid_reports_every_field() {
    let tmp = tempfile::TempDir::new().unwrap();
    let stderr = run_td_err(
        tmp.path(),
        &[
            "add",
            "--title",
            "ok title",
            "--due",
            FUTURE,
            "--email",
            "not-an-email",
            "--phone",
            "123-456-7890",
            "--url",
            "https://example.com",
            "--attachment",
            PDF,
            "--color",
            "red",
        ],
    );
    assert!(stderr.contains("email: Invalid email format"));
    assert!(stderr.contains("color: Invalid hex color (e.g., #FF0000)"));
    assert!(stderr.contains("error: task not saved: 2 invalid field(s)"));
    assert!(!tmp.path().join("data").join("tasks.json").exists());
}

#[test]
fn test_add_missing_required_fields() {
    let tmp = tempfile::TempDir::new().unwrap();
    let stderr = run_td_err(tmp.path(), &["add", "--title", "ab"]);
    assert!(stderr.contains("title: Task title must be at least 3 characters"));
    assert!(stderr.contains("dueDate: Due date is required"));
    assert!(stderr.contains("attachment: Attachment is required"));
}

#[test]
fn test_add_past_due_date_rejected() {
    let tmp = tempfile::TempDir::new().unwrap();
    let stderr = run_td_err(
        tmp.path(),
        &[
            "add",
            "--title",
            "Too late",
            "--due",
            "2000-01-01",
            "--email",
            "ops@example.com",
            "--phone",
            "123-456-7890",
            "--url",
            "https://example.com",
            "--attachment",
            PDF,
        ],
    );
    assert!(stderr.contains("dueDate: Due date cannot be in the past"));
}

#[test]
fn test_add_rejects_non_pdf_attachment() {
    let tmp = tempfile::TempDir::new().unwrap();
    let stderr = run_td_err(
        tmp.path(),
        &[
            "add",
            "--title",
            "Screenshot",
            "--due",
            FUTURE,
            "--email",
            "ops@example.com",
            "--phone",
            "123-456-7890",
            "--url",
            "https://example.com",
            "--attachment",
            "data:image/png;base64,iVBORw0KGgo=",
        ],
    );
    assert!(stderr.contains("attachment: Attachment must be a PDF (application/pdf)"));
}

#[test]
fn test_add_attach_file_encodes_data_url() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("brief.pdf"), b"%PDF").unwrap();
    let id = run_td_ok(
        tmp.path(),
        &[
            "add",
            "--title",
            "Read brief",
            "--due",
            FUTURE,
            "--email",
            "ops@example.com",
            "--phone",
            "123-456-7890",
            "--url",
            "https://example.com",
            "--attach-file",
            "brief.pdf",
        ],
    );
    let shown = show_json(tmp.path(), id.trim());
    assert_eq!(shown["attachment"], PDF);
}

#[test]
fn test_add_with_generic_set() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = run_td_ok(
        tmp.path(),
        &[
            "add",
            "--set",
            "title=Generic fields",
            "--set",
            "due_date=2099-12-31",
            "--set",
            "email=ops@example.com",
            "--set",
            "phone-number=123-456-7890",
            "--set",
            "url=https://example.com",
            "--set",
            "isUrgent=yes",
            "--set",
            "progress=30",
            "--set",
            &format!("attachment={}", PDF),
        ],
    );
    let shown = show_json(tmp.path(), id.trim());
    assert_eq!(shown["title"], "Generic fields");
    assert_eq!(shown["isUrgent"], true);
    assert_eq!(shown["progress"], 30);
}

#[test]
fn test_add_unknown_field_name() {
    let tmp = tempfile::TempDir::new().unwrap();
    let stderr = run_td_err(tmp.path(), &["add", "--set", "owner=me"]);
    assert!(stderr.contains("error: unknown field: owner"));
}

// ---------------------------------------------------------------------------
// Edit / delete
// ---------------------------------------------------------------------------

#[test]
fn test_edit_updates_in_place() {
    let tmp = tempfile::TempDir::new().unwrap();
    let first = add_task(tmp.path(), "First task");
    let second = add_task(tmp.path(), "Second task");

    let out = run_td_ok(
        tmp.path(),
        &["edit", &first, "--status", "In Progress", "--progress", "40"],
    );
    assert!(out.starts_with(&format!("[>] {} First task", first)));

    let stored = mirror(tmp.path());
    assert_eq!(stored[0]["id"], first.as_str());
    assert_eq!(stored[0]["progress"], 40);
    assert_eq!(stored[1]["id"], second.as_str());

    let counts: serde_json::Value =
        serde_json::from_str(&run_td_ok(tmp.path(), &["counts", "--json"])).unwrap();
    assert_eq!(counts["inProgress"], 1);
    assert_eq!(counts["pending"], 1);
    assert_eq!(counts["total"], 2);
}

#[test]
fn test_edit_invalid_leaves_task_unchanged() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add_task(tmp.path(), "Keep me");
    let before = show_json(tmp.path(), &id);

    let stderr = run_td_err(tmp.path(), &["edit", &id, "--email", "not-an-email"]);
    assert!(stderr.contains("email: Invalid email format"));
    assert!(stderr.contains("1 invalid field(s)"));

    assert_eq!(show_json(tmp.path(), &id), before);
}

#[test]
fn test_edit_unknown_id() {
    let tmp = tempfile::TempDir::new().unwrap();
    let stderr = run_td_err(tmp.path(), &["edit", "nope", "--title", "Whatever"]);
    assert!(stderr.contains("error: task not found: nope"));
}

#[test]
fn test_delete_twice_is_quiet() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add_task(tmp.path(), "Short lived");

    let out = run_td_ok(tmp.path(), &["delete", &id]);
    assert_eq!(out.trim(), format!("deleted {}", id));
    let out = run_td_ok(tmp.path(), &["delete", &id]);
    assert_eq!(out, "");

    assert_eq!(mirror(tmp.path()), serde_json::json!([]));
}

#[test]
fn test_delete_unknown_reported_by_policy() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_config(tmp.path(), "[store]\nunknown_id = \"report\"\n");
    let stderr = run_td_err(tmp.path(), &["delete", "nope"]);
    assert!(stderr.contains("error: task not found: nope"));
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

#[test]
fn test_seed_demo_tasks() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_td_ok(tmp.path(), &["seed"]);
    assert_eq!(out.trim(), "seeded 3 of 3 task(s)");

    let out = run_td_ok(tmp.path(), &["counts"]);
    insta::assert_snapshot!(out.trim_end(), @"pending 1 | in progress 1 | completed 1 | total 3");

    let out = run_td_ok(tmp.path(), &["list", "--status", "Completed"]);
    assert!(out.contains("Alice Johnson"));
    assert!(!out.contains("John Doe"));

    // same ids again are skipped
    let out = run_td_ok(tmp.path(), &["seed"]);
    assert_eq!(out.trim(), "seeded 0 of 3 task(s)");
}

#[test]
fn test_seed_todo_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(
        tmp.path().join("todos.json"),
        r#"[
  {"userId": 1, "id": 1, "title": "delectus aut autem", "completed": false},
  {"userId": 1, "id": 2, "title": "quis ut nam facilis", "completed": false},
  {"userId": 1, "id": 3, "title": "fugiat veniam minus", "completed": true},
  {"userId": 1, "id": 4, "title": "et porro tempora", "completed": false}
]"#,
    )
    .unwrap();

    let out = run_td_ok(
        tmp.path(),
        &[
            "--json",
            "seed",
            "--file",
            "todos.json",
            "--limit",
            "3",
            "--status-strategy",
            "alternate",
        ],
    );
    let result: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(result, serde_json::json!({"read": 3, "inserted": 3, "skipped": 0}));

    let stored = mirror(tmp.path());
    let statuses: Vec<&str> = stored
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["Pending", "In Progress", "Completed"]);
    assert_eq!(stored[0]["id"], "1");
    assert_eq!(stored[0]["priority"], "Low");
}

#[test]
fn test_seed_replace_drops_existing() {
    let tmp = tempfile::TempDir::new().unwrap();
    add_task(tmp.path(), "Will be dropped");
    run_td_ok(tmp.path(), &["seed", "--replace"]);
    let out = run_td_ok(tmp.path(), &["list"]);
    assert!(!out.contains("Will be dropped"));
    assert_eq!(mirror(tmp.path()).as_array().unwrap().len(), 3);
}

#[test]
fn test_seed_missing_file_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let stderr = run_td_err(tmp.path(), &["seed", "--file", "absent.json"]);
    assert!(stderr.contains("could not read seed file"));
}

#[test]
fn test_first_use_seeds_from_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_config(tmp.path(), "[seed]\ndemo = true\n");

    let out = run_td_ok(tmp.path(), &["list"]);
    assert!(out.contains("[ ] 1 John Doe (due 2026-01-15, High, urgent)"));
    assert!(out.contains("[>] 2 Jane Smith"));
    assert_eq!(mirror(tmp.path()).as_array().unwrap().len(), 3);
}

#[test]
fn test_first_use_seed_failure_is_not_fatal() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_config(tmp.path(), "[seed]\nfile = \"missing.json\"\n");

    let (stdout, stderr, success) = run_td(tmp.path(), &["list"]);
    assert!(success);
    assert!(stderr.contains("warning: could not read seed file"));
    assert_eq!(stdout.trim(), "no tasks");
}

#[test]
fn test_corrupt_mirror_is_not_fatal() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("data")).unwrap();
    fs::write(tmp.path().join("data").join("tasks.json"), "{truncated").unwrap();

    let (stdout, stderr, success) = run_td(tmp.path(), &["list"]);
    assert!(success);
    assert!(stderr.contains("warning: stored tasks are not valid JSON"));
    assert_eq!(stdout.trim(), "no tasks");

    // reading leaves the file alone; the next change rewrites it
    let text = fs::read_to_string(tmp.path().join("data").join("tasks.json")).unwrap();
    assert_eq!(text, "{truncated");

    let out = run_td_ok(tmp.path(), &["seed", "--replace"]);
    assert_eq!(out.trim(), "seeded 3 of 3 task(s)");
    assert_eq!(mirror(tmp.path()).as_array().unwrap().len(), 3);

    let id = add_task(tmp.path(), "After recovery");
    assert_eq!(show_json(tmp.path(), &id)["title"], "After recovery");
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

#[test]
fn test_fields_table() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_td_ok(tmp.path(), &["fields"]);
    insta::assert_snapshot!(out.trim_end(), @r"
    NAME         LABEL        KIND      DEFAULT
    title        Task Title   text      -
    dueDate      Due Date     date      -
    status       Status       select    Pending
    email        Email        email     -
    phoneNumber  Phone Number tel       -
    url          URL          url       -
    isUrgent     Urgent Task  checkbox  false
    priority     Priority     radio     Low
    progress     Progress (%) range     0
    attachment   Attachment   file      -
    color        Color        color     #000000
    ");
}

#[test]
fn test_list_rejects_bad_status() {
    let tmp = tempfile::TempDir::new().unwrap();
    let stderr = run_td_err(tmp.path(), &["list", "--status", "Blocked"]);
    assert!(stderr.contains("invalid status filter"));
}

#[test]
fn test_invalid_config_is_an_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_config(tmp.path(), "[store]\nunknown_id = \"shout\"\n");
    let stderr = run_td_err(tmp.path(), &["counts"]);
    assert!(stderr.contains("invalid config"));
}

#[test]
fn test_data_dir_from_env() {
    let tmp = tempfile::TempDir::new().unwrap();
    let output = Command::new(td_bin())
        .args(["seed"])
        .current_dir(tmp.path())
        .env("TASKDESK_DIR", tmp.path().join("from-env"))
        .env_remove("TASKDESK_LOG")
        .output()
        .expect("failed to run td");
    assert!(output.status.success());
    assert!(tmp.path().join("from-env").join("tasks.json").exists());
}
