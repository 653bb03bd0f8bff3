//! CLI tests for `engine diff` and `engine config`.
//!
//! Spawns the engine binary and verifies exit codes and printed output.

use std::fs;
use std::process::Command;

use engine::exit_codes;
use serde_json::{Value, json};

fn write_json(dir: &std::path::Path, name: &str, value: &Value) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string(value).expect("json")).expect("write");
    path
}

#[test]
fn diff_reports_changed_fields_with_changed_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let original = write_json(temp.path(), "a.json", &json!({"count": 0, "tags": ["x"]}));
    let current = write_json(temp.path(), "b.json", &json!({"count": 1, "tags": ["x"]}));

    let output = Command::new(env!("CARGO_BIN_EXE_engine"))
        .arg("diff")
        .arg(&original)
        .arg(&current)
        .output()
        .expect("engine diff");

    assert_eq!(output.status.code(), Some(exit_codes::CHANGED));
    let printed: Value = serde_json::from_slice(&output.stdout).expect("stdout json");
    assert_eq!(printed, json!({"count": 1}));
}

#[test]
fn diff_of_equal_snapshots_exits_ok() {
    let temp = tempfile::tempdir().expect("tempdir");
    let original = write_json(temp.path(), "a.json", &json!({"n": 1, "list": null}));
    let current = write_json(temp.path(), "b.json", &json!({"n": 1.0, "list": []}));

    let status = Command::new(env!("CARGO_BIN_EXE_engine"))
        .arg("diff")
        .arg(&original)
        .arg(&current)
        .status()
        .expect("engine diff");

    assert_eq!(status.code(), Some(exit_codes::OK));
}

#[test]
fn diff_rejects_non_object_snapshot() {
    let temp = tempfile::tempdir().expect("tempdir");
    let original = write_json(temp.path(), "a.json", &json!([1, 2]));
    let current = write_json(temp.path(), "b.json", &json!({}));

    let status = Command::new(env!("CARGO_BIN_EXE_engine"))
        .arg("diff")
        .arg(&original)
        .arg(&current)
        .status()
        .expect("engine diff");

    assert_eq!(status.code(), Some(exit_codes::INVALID));
}

#[test]
fn config_init_writes_loadable_defaults() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("engine.toml");

    let status = Command::new(env!("CARGO_BIN_EXE_engine"))
        .arg("config")
        .arg("--path")
        .arg(&path)
        .arg("--init")
        .status()
        .expect("engine config --init");
    assert_eq!(status.code(), Some(exit_codes::OK));

    let loaded = engine::io::config::load_config(&path).expect("load");
    assert_eq!(loaded, engine::io::config::EngineConfig::default());
}
