//! CLI integration tests for flagdeck
//!
//! These tests drive the binary end to end: project setup, toggling,
//! history navigation, import/export and the read-only queries.

use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CATALOG: &str = r#"[
  {
    "id": "user-auth",
    "name": "User Authentication",
    "version": "1.2.0",
    "enabled": true,
    "description": "Email/password and Google OAuth sign-in",
    "backend": {"routes": [{"method": "POST", "path": "/api/auth/login", "handler": "authController.login"}]},
    "health": {"endpoint": "/health/auth", "timeout": 5000}
  },
  {
    "id": "video-upload",
    "name": "Video Upload",
    "enabled": true,
    "dependencies": {"requires": ["user-auth"]}
  },
  {
    "id": "ai-generation",
    "name": "AI Video Generation",
    "enabled": true,
    "dependencies": {"requires": ["video-upload"]},
    "fallback": "video-upload"
  },
  {
    "id": "social-publishing",
    "name": "Social Publishing",
    "enabled": true,
    "dependencies": {"requires": ["ai-generation", "user-auth"]}
  },
  {
    "id": "analytics",
    "name": "Analytics Dashboard",
    "enabled": false
  }
]"#;

/// Get a command instance for the flagdeck binary
fn flagdeck() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("flagdeck"))
}

/// Runs flagdeck inside `dir` with text output
fn run_in(dir: &Path) -> assert_cmd::Command {
    let mut cmd = flagdeck();
    cmd.current_dir(dir).args(["--format", "text"]);
    cmd
}

/// Create a temporary project seeded from the sample catalog
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("features.json"), CATALOG).unwrap();
    flagdeck().arg("init").arg(dir.path()).assert().success();
    dir
}

fn json_of(cmd: &mut assert_cmd::Command) -> Value {
    let assert = cmd.args(["--format", "json"]).assert().success();
    serde_json::from_slice(&assert.get_output().stdout).unwrap()
}

fn status_of(dir: &Path, id: &str) -> String {
    let list = json_of(flagdeck().current_dir(dir).arg("list"));
    list.as_array()
        .unwrap()
        .iter()
        .find(|f| f["id"] == id)
        .map(|f| f["status"].as_str().unwrap().to_string())
        .unwrap()
}

// =============================================================================
// Initialization
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    flagdeck()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized flagdeck project"))
        .stdout(predicate::str::contains("0 features"));

    assert!(dir.path().join(".flagdeck").is_dir());
    assert!(dir.path().join(".flagdeck/config.toml").is_file());
    assert!(dir.path().join(".flagdeck/.gitignore").is_file());
    assert!(dir.path().join(".flagdeck/history.jsonl").is_file());
    assert!(dir.path().join(".flagdeck/HEAD").is_file());
}

#[test]
fn test_init_seeds_from_source() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("flags.json"), CATALOG).unwrap();

    flagdeck()
        .arg("init")
        .arg(dir.path())
        .args(["--source", "flags.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 features"));

    let config = fs::read_to_string(dir.path().join(".flagdeck/config.toml")).unwrap();
    assert!(config.contains("source = \"flags.json\""));
}

#[test]
fn test_init_is_idempotent() {
    let dir = setup_project();

    run_in(dir.path()).args(["disable", "analytics"]).assert().success();
    run_in(dir.path()).args(["enable", "analytics"]).assert().success();
    flagdeck().arg("init").arg(dir.path()).assert().success();

    let history = json_of(flagdeck().current_dir(dir.path()).arg("history"));
    assert_eq!(history.as_array().unwrap().len(), 2);
}

#[test]
fn test_commands_outside_project_fail() {
    let dir = TempDir::new().unwrap();

    run_in(dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("flagdeck init"));
}

// =============================================================================
// Listing and details
// =============================================================================

#[test]
fn test_list_shows_resolved_status() {
    let dir = setup_project();

    run_in(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Features (5)"))
        .stdout(predicate::str::contains("[+] user-auth"))
        .stdout(predicate::str::contains("[-] analytics"));
}

#[test]
fn test_list_filters() {
    let dir = setup_project();

    run_in(dir.path())
        .args(["list", "--search", "VIDEO"])
        .assert()
        .success()
        .stdout(predicate::str::contains("video-upload"))
        .stdout(predicate::str::contains("ai-generation"))
        .stdout(predicate::str::contains("analytics").not());

    run_in(dir.path())
        .args(["list", "--status", "manual"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Features (1)"))
        .stdout(predicate::str::contains("analytics"));
}

#[test]
fn test_show_feature_details() {
    let dir = setup_project();

    run_in(dir.path())
        .args(["show", "user-auth"])
        .assert()
        .success()
        .stdout(predicate::str::contains("User Authentication"))
        .stdout(predicate::str::contains("/api/auth/login"))
        .stdout(predicate::str::contains("/health/auth"))
        .stdout(predicate::str::contains("Required by:"))
        .stdout(predicate::str::contains("social-publishing"));
}

#[test]
fn test_show_unknown_feature_fails() {
    let dir = setup_project();

    run_in(dir.path())
        .args(["show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Feature not found: nope"));
}

// =============================================================================
// Toggling
// =============================================================================

#[test]
fn test_disable_cascades_to_dependents() {
    let dir = setup_project();

    run_in(dir.path())
        .args(["disable", "user-auth"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user-auth: disabled"))
        .stdout(predicate::str::contains("video-upload is now disabled-dependency"))
        .stdout(predicate::str::contains("social-publishing is now disabled-dependency"));

    assert_eq!(status_of(dir.path(), "user-auth"), "disabled-manual");
    assert_eq!(status_of(dir.path(), "ai-generation"), "disabled-dependency");
}

#[test]
fn test_enable_already_enabled_is_noop() {
    let dir = setup_project();

    run_in(dir.path())
        .args(["enable", "user-auth"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already enabled"));

    let history = json_of(flagdeck().current_dir(dir.path()).arg("history"));
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[test]
fn test_toggle_flips_flag() {
    let dir = setup_project();

    run_in(dir.path()).args(["toggle", "analytics"]).assert().success();
    assert_eq!(status_of(dir.path(), "analytics"), "active");

    run_in(dir.path()).args(["toggle", "analytics"]).assert().success();
    assert_eq!(status_of(dir.path(), "analytics"), "disabled-manual");
}

#[test]
fn test_toggle_unknown_feature_fails() {
    let dir = setup_project();

    run_in(dir.path())
        .args(["toggle", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Feature not found: ghost"));
}

// =============================================================================
// History
// =============================================================================

#[test]
fn test_undo_redo() {
    let dir = setup_project();

    run_in(dir.path()).args(["disable", "user-auth"]).assert().success();

    run_in(dir.path())
        .arg("undo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Undid to snapshot 1 of 2"));
    assert_eq!(status_of(dir.path(), "video-upload"), "active");

    run_in(dir.path())
        .arg("redo")
        .assert()
        .success()
        .stdout(predicate::str::contains("disable user-auth"));
    assert_eq!(status_of(dir.path(), "video-upload"), "disabled-dependency");

    run_in(dir.path())
        .arg("redo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to redo"));
}

#[test]
fn test_undo_at_start_fails() {
    let dir = setup_project();

    run_in(dir.path())
        .arg("undo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to undo"));
}

#[test]
fn test_change_after_undo_discards_redo() {
    let dir = setup_project();

    run_in(dir.path()).args(["disable", "user-auth"]).assert().success();
    run_in(dir.path()).arg("undo").assert().success();
    run_in(dir.path()).args(["enable", "analytics"]).assert().success();

    let history = json_of(flagdeck().current_dir(dir.path()).arg("history"));
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["action"], "enable analytics");
    assert_eq!(entries[1]["current"], true);

    run_in(dir.path()).arg("redo").assert().failure();
}

#[test]
fn test_history_listing_marks_cursor() {
    let dir = setup_project();

    run_in(dir.path())
        .args(["disable", "analytics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already disabled"));
    run_in(dir.path()).args(["enable", "analytics"]).assert().success();
    run_in(dir.path()).arg("undo").assert().success();

    run_in(dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("History (2 snapshots)"))
        .stdout(predicate::str::contains("* 1"))
        .stdout(predicate::str::contains("enable analytics"));
}

#[test]
fn test_reset_restores_source() {
    let dir = setup_project();

    run_in(dir.path()).args(["disable", "user-auth"]).assert().success();
    run_in(dir.path()).args(["enable", "analytics"]).assert().success();

    run_in(dir.path())
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 snapshots discarded"));

    assert_eq!(status_of(dir.path(), "user-auth"), "active");
    let history = json_of(flagdeck().current_dir(dir.path()).arg("history"));
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[test]
fn test_sync_records_source_changes() {
    let dir = setup_project();

    run_in(dir.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already in sync"));

    // analytics is the only feature switched off in the catalog
    let updated = CATALOG.replace("\"enabled\": false", "\"enabled\": true");
    fs::write(dir.path().join("features.json"), updated).unwrap();

    run_in(dir.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Synced 5 features"));
    assert_eq!(status_of(dir.path(), "analytics"), "active");

    run_in(dir.path()).arg("undo").assert().success();
    assert_eq!(status_of(dir.path(), "analytics"), "disabled-manual");
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn test_status_counts() {
    let dir = setup_project();

    let status = json_of(flagdeck().current_dir(dir.path()).arg("status"));
    assert_eq!(status["summary"]["total"], 5);
    assert_eq!(status["summary"]["active"], 4);
    assert_eq!(status["summary"]["manual"], 1);
    assert_eq!(status["summary"]["blocked"], 0);
    assert_eq!(status["history"]["can_undo"], false);
}

#[test]
fn test_blocked_lists_direct_blockers() {
    let dir = setup_project();
    run_in(dir.path()).args(["disable", "video-upload"]).assert().success();

    let blocked = json_of(flagdeck().current_dir(dir.path()).arg("blocked"));
    let blocked = blocked.as_array().unwrap();
    assert_eq!(blocked.len(), 2);

    let social = blocked.iter().find(|b| b["id"] == "social-publishing").unwrap();
    assert_eq!(social["blockedBy"], serde_json::json!(["ai-generation"]));
}

#[test]
fn test_why_follows_chain_to_root_cause() {
    let dir = setup_project();
    run_in(dir.path()).args(["disable", "user-auth"]).assert().success();

    run_in(dir.path())
        .args(["why", "social-publishing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("social-publishing is blocked by ai-generation"))
        .stdout(predicate::str::contains("video-upload is blocked by user-auth"))
        .stdout(predicate::str::contains("user-auth is disabled by administrator"));
}

#[test]
fn test_preview_messages() {
    let dir = setup_project();
    run_in(dir.path()).args(["disable", "user-auth"]).assert().success();

    run_in(dir.path())
        .arg("preview")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Feature is currently disabled by administrator.",
        ))
        .stdout(predicate::str::contains(
            "Unavailable: Dependency user-auth is offline.",
        ));
}

#[test]
fn test_graph_tree_and_dot() {
    let dir = setup_project();

    run_in(dir.path())
        .arg("graph")
        .assert()
        .success()
        .stdout(predicate::str::contains("[+] user-auth"))
        .stdout(predicate::str::contains("└── [+] video-upload").or(predicate::str::contains("├── [+] video-upload")));

    run_in(dir.path())
        .args(["graph", "--dot"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph features"))
        .stdout(predicate::str::contains("\"video-upload\" -> \"user-auth\""));
}

#[test]
fn test_graph_json_orders_dependencies_first() {
    let dir = setup_project();

    let graph = json_of(flagdeck().current_dir(dir.path()).arg("graph"));
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 5);

    let order: Vec<&str> = graph["order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap())
        .collect();
    assert_eq!(order.len(), 5);
    let pos = |id: &str| order.iter().position(|o| *o == id).unwrap();
    assert!(pos("user-auth") < pos("video-upload"));
    assert!(pos("video-upload") < pos("ai-generation"));
    assert!(pos("ai-generation") < pos("social-publishing"));
}

#[test]
fn test_graph_json_has_no_order_with_cycle() {
    let dir = setup_project();
    let looped = r#"[
        {"id": "a", "enabled": true, "dependencies": {"requires": ["b"]}},
        {"id": "b", "enabled": true, "dependencies": {"requires": ["a"]}}
    ]"#;
    fs::write(dir.path().join("looped.json"), looped).unwrap();
    run_in(dir.path()).args(["import", "looped.json"]).assert().success();

    let graph = json_of(flagdeck().current_dir(dir.path()).arg("graph"));
    assert!(graph["order"].is_null());
    assert_eq!(graph["edges"].as_array().unwrap().len(), 2);
}

#[test]
fn test_check_clean_catalog() {
    let dir = setup_project();

    run_in(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("No dependency problems"));
}

#[test]
fn test_check_reports_cycles_and_missing() {
    let dir = setup_project();
    let broken = r#"[
        {"id": "a", "enabled": true, "dependencies": {"requires": ["b"]}},
        {"id": "b", "enabled": true, "dependencies": {"requires": ["a"]}},
        {"id": "c", "enabled": true, "dependencies": {"requires": ["ghost"]}}
    ]"#;
    fs::write(dir.path().join("broken.json"), broken).unwrap();
    run_in(dir.path()).args(["import", "broken.json"]).assert().success();

    run_in(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("cycle:   a <-> b"))
        .stdout(predicate::str::contains("c requires unknown feature ghost"))
        .stderr(predicate::str::contains("2 dependency problem(s) found"));

    assert_eq!(status_of(dir.path(), "a"), "disabled-dependency");
    assert_eq!(status_of(dir.path(), "c"), "disabled-dependency");
}

// =============================================================================
// Import / export
// =============================================================================

#[test]
fn test_export_import_round_trip() {
    let dir = setup_project();
    run_in(dir.path()).args(["disable", "user-auth"]).assert().success();

    run_in(dir.path())
        .args(["export", "--output", "snapshot.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 5 features"));

    let exported: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("snapshot.json")).unwrap())
            .unwrap();
    assert_eq!(exported[0]["id"], "user-auth");
    assert_eq!(exported[0]["enabled"], false);
    assert!(exported[0].get("status").is_none());

    run_in(dir.path()).arg("reset").assert().success();
    run_in(dir.path())
        .args(["import", "snapshot.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 5 features"));

    assert_eq!(status_of(dir.path(), "user-auth"), "disabled-manual");
}

#[test]
fn test_export_to_stdout_uses_camel_case() {
    let dir = setup_project();

    run_in(dir.path())
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"dependencies\""))
        .stdout(predicate::str::contains("\"fallback\": \"video-upload\""));
}

#[test]
fn test_import_from_stdin() {
    let dir = setup_project();

    run_in(dir.path())
        .args(["import", "-"])
        .write_stdin(r#"[{"id": "solo", "enabled": true}]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 features"));

    assert_eq!(status_of(dir.path(), "solo"), "active");
}

#[test]
fn test_invalid_import_leaves_history_untouched() {
    let dir = setup_project();

    for bad in [
        "not json",
        r#"{"id": "a", "enabled": true}"#,
        "[]",
        r#"[{"id": "a"}]"#,
        r#"[{"id": "", "enabled": true}]"#,
        r#"[{"id": "a", "enabled": true}, {"id": "a", "enabled": false}]"#,
        r#"[{"id": "a", "enabled": true, "dependencies": {"requires": "b"}}]"#,
    ] {
        run_in(dir.path())
            .arg("import")
            .write_stdin(bad)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid import"));
    }

    let history = json_of(flagdeck().current_dir(dir.path()).arg("history"));
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[test]
fn test_context_document_shape() {
    let dir = setup_project();
    run_in(dir.path()).args(["disable", "video-upload"]).assert().success();

    let assert = run_in(dir.path()).arg("context").assert().success();
    let doc: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();

    assert_eq!(doc["summary"]["total"], 5);
    assert_eq!(doc["summary"]["blocked"], 2);
    assert_eq!(doc["history"]["len"], 2);

    let features = doc["features"].as_array().unwrap();
    assert_eq!(features.len(), 5);
    let ai = features.iter().find(|f| f["id"] == "ai-generation").unwrap();
    assert_eq!(ai["status"], "disabled-dependency");
    assert_eq!(ai["blockedBy"], serde_json::json!(["video-upload"]));
    assert_eq!(ai["requires"], serde_json::json!(["video-upload"]));
}

// =============================================================================
// Output modes
// =============================================================================

#[test]
fn test_json_success_message() {
    let dir = setup_project();

    let value = json_of(flagdeck().current_dir(dir.path()).args(["enable", "user-auth"]));
    assert_eq!(value["success"], true);
}

#[test]
fn test_verbose_logs_to_stderr() {
    let dir = setup_project();

    run_in(dir.path())
        .args(["--verbose", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[verbose:list]"));
}
