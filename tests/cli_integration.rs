//! Integration tests for the `todoister` CLI.
//!
//! Each test seeds a cache in a temp directory, points the API at a port
//! nothing listens on, and runs `todoister` as a subprocess. Every read
//! therefore exercises the offline fallback to the cached snapshot.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use todoister::io::cache::CacheStore;
use todoister::model::{CachedSnapshot, Comment, Label, Project, Section, Snapshot, Task};

/// Get the path to the built `todoister` binary.
fn bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("todoister");
    path
}

fn sample() -> Snapshot {
    let mut draft = Task::new("t2", "p1", "Write draft").in_section("s1");
    draft.description = "Outline first".into();
    Snapshot {
        projects: vec![
            Project::new("p1", "Work"),
            Project::new("p2", "Reports").with_parent("p1"),
            Project::new("p3", "Home"),
            Project::new("p4", "Garden").with_parent("p3"),
        ],
        sections: vec![Section::new("s1", "p1", "Writing")],
        tasks: vec![
            Task::new("t1", "p1", "Email Bob"),
            draft,
            Task::new("t3", "p2", "Review PR 12"),
            Task::new("t4", "p2", "Review PR 13"),
            Task::new("t5", "p2", "Archive Q2").completed("2026-09-30T10:00:00Z"),
            Task::new("t6", "p4", "Plant bulbs").with_labels(&["outside"]),
        ],
        labels: vec![Label::new("l1", "outside")],
        comments: vec![
            Comment::on_task("c1", "t6", "tulips"),
            Comment::on_project("c2", "p1", "standup at nine"),
        ],
    }
}

/// Write a config pointing at an unreachable API and a cache under `root`,
/// returning the config path.
fn create_test_env(root: &Path, seed: Option<Snapshot>) -> PathBuf {
    let cache_dir = root.join("cache");
    let config_path = root.join("config.toml");
    fs::write(
        &config_path,
        format!(
            "[api]\nbase_url = \"http://127.0.0.1:1\"\n\n[cache]\ndir = \"{}\"\n",
            cache_dir.display()
        ),
    )
    .unwrap();

    if let Some(snapshot) = seed {
        CacheStore::new(&cache_dir, env!("CARGO_PKG_VERSION"))
            .save(&CachedSnapshot::new("tok-1", snapshot))
            .unwrap();
    }
    config_path
}

/// Run `todoister` with the given args, returning (stdout, stderr, success).
fn run(config: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(bin())
        .args(args)
        .arg("--config")
        .arg(config)
        .args(["--token", "test-token"])
        .env_remove("TODOISTER_LOG")
        .output()
        .expect("failed to run todoister");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `todoister` expecting success, return stdout.
fn run_ok(config: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run(config, args);
    if !success {
        panic!(
            "todoister {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `todoister` expecting failure, return stderr.
fn run_err(config: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run(config, args);
    if success {
        panic!("todoister {:?} unexpectedly succeeded:\nstdout: {}", args, stdout);
    }
    stderr
}

// ---------------------------------------------------------------------------
// Read command tests
// ---------------------------------------------------------------------------

#[test]
fn test_list_all() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), Some(sample()));

    let out = run_ok(&config, &["list"]);
    assert_eq!(
        out,
        "# Projects\n  # Work\n    # Reports\n  # Home\n    # Garden\n"
    );
}

#[test]
fn test_offline_fallback_warns() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), Some(sample()));

    let (_, stderr, success) = run(&config, &["ls"]);
    assert!(success);
    assert!(stderr.contains("sync failed, using cached data"));
    assert!(!stderr.contains('\x1b'), "piped stderr should carry no color codes");
}

#[test]
fn test_list_subtree_by_nested_name() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), Some(sample()));

    let out = run_ok(&config, &["ls", "garden"]);
    assert_eq!(out, "# Garden\n");

    let out = run_ok(&config, &["ls", "#Work"]);
    assert_eq!(out, "# Work\n  # Reports\n");
}

#[test]
fn test_list_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), Some(sample()));

    let out = run_ok(&config, &["list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let projects = parsed["projects"].as_array().unwrap();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0]["name"], "Work");
    assert_eq!(projects[0]["children"][0]["name"], "Reports");
    assert_eq!(projects[1]["children"][0]["id"], "p4");
}

#[test]
fn test_list_json_carries_tasks_sections_and_comments() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), Some(sample()));

    let out = run_ok(&config, &["list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let work = &parsed["projects"][0];
    assert_eq!(work["comments"][0], "standup at nine");
    assert_eq!(work["tasks"][0]["content"], "Email Bob");
    assert_eq!(work["sections"][0]["name"], "Writing");
    assert_eq!(work["sections"][0]["tasks"][0]["content"], "Write draft");

    let reports = &work["children"][0];
    let open: Vec<_> = reports["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["content"].as_str().unwrap())
        .collect();
    assert_eq!(open, vec!["Review PR 12", "Review PR 13"]);

    let garden = &parsed["projects"][1]["children"][0];
    assert_eq!(garden["tasks"][0]["labels"][0], "outside");
    assert_eq!(garden["tasks"][0]["comments"][0], "tulips");
}

#[test]
fn test_list_unknown_project() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), Some(sample()));

    let stderr = run_err(&config, &["ls", "Nowhere"]);
    assert!(stderr.contains("project not found: Nowhere"));
}

#[test]
fn test_tasks_with_sections() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), Some(sample()));

    let out = run_ok(&config, &["tasks", "work"]);
    assert_eq!(
        out,
        "\n# Work\n\n  - Email Bob\n\n  /Writing\n\n  - Write draft\n    Outline first\n"
    );
}

#[test]
fn test_tasks_canonical_path_and_completed_hidden() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), Some(sample()));

    let out = run_ok(&config, &["tasks", "reports"]);
    assert!(out.contains("# Work/Reports"));
    assert!(out.contains("Review PR 12"));
    assert!(!out.contains("Archive Q2"));
}

#[test]
fn test_tasks_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), Some(sample()));

    let out = run_ok(&config, &["tasks", "Home/Garden", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed[0]["path"], "Home/Garden");
    assert_eq!(parsed[0]["tasks"][0]["content"], "Plant bulbs");
    assert_eq!(parsed[0]["tasks"][0]["labels"][0], "outside");
    assert_eq!(parsed[0]["tasks"][0]["comments"][0], "tulips");
}

#[test]
fn test_no_cache_and_no_network_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), None);

    let stderr = run_err(&config, &["list"]);
    assert!(stderr.contains("no cached data"));
}

#[test]
fn test_version() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), None);

    let out = run_ok(&config, &["version"]);
    assert_eq!(out, format!("todoister v{}\n", env!("CARGO_PKG_VERSION")));
}

// ---------------------------------------------------------------------------
// Write command tests (all of these fail before any request is sent)
// ---------------------------------------------------------------------------

#[test]
fn test_check_ambiguous_prefix() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), Some(sample()));

    let stderr = run_err(&config, &["check", "Work/Reports", "review"]);
    assert!(stderr.contains("'review' matches 2 tasks in 'Work/Reports'"));
    assert!(stderr.contains("  - Review PR 12"));
    assert!(stderr.contains("  - Review PR 13"));
}

#[test]
fn test_check_no_match() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), Some(sample()));

    let stderr = run_err(&config, &["check", "-p", "Work/Reports", "archive"]);
    assert!(stderr.contains("no open task in 'Work/Reports' starts with 'archive'"));
}

#[test]
fn test_check_single_name_means_top_level_project() {
    let tmp = tempfile::TempDir::new().unwrap();
    let seed = Snapshot {
        projects: vec![
            Project::new("p1", "Work"),
            Project::new("p2", "Reports").with_parent("p1"),
            Project::new("p5", "Reports"),
        ],
        tasks: vec![Task::new("t1", "p2", "Alpha report")],
        ..Default::default()
    };
    let config = create_test_env(tmp.path(), Some(seed));

    let stderr = run_err(&config, &["check", "Reports", "Alpha"]);
    assert!(stderr.contains("no open task in 'Reports' starts with 'Alpha'"));
}

#[test]
fn test_check_nested_name_alone_is_not_found() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), Some(sample()));

    let stderr = run_err(&config, &["check", "Reports", "review"]);
    assert!(stderr.contains("project not found: Reports"));
}

#[test]
fn test_delete_requires_force() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), Some(sample()));

    let stderr = run_err(&config, &["delete", "project", "Work/Reports"]);
    assert!(stderr.contains("without --force"));
}

#[test]
fn test_add_project_rejects_unknown_color() {
    let tmp = tempfile::TempDir::new().unwrap();
    let config = create_test_env(tmp.path(), Some(sample()));

    let stderr = run_err(&config, &["add", "project", "Work/New", "--color", "chartreuse"]);
    assert!(stderr.contains("unknown color 'chartreuse'"));
}
