//! The `stowd` binary, driven as a subprocess.

use std::path::PathBuf;
use std::process::{Command, Output};

use stow_core::StowConfig;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn stowd(args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_stowd"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stowd {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

#[test]
fn plan_prints_moves_as_json() {
    let snapshot = fixture("snapshot.json");
    let output = stowd(&["plan", "--snapshot", snapshot.to_str().unwrap(), "--request-id", "r-1"]);

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["request_id"], "r-1");
    assert_eq!(plan["moves"][0]["item_id"], "ITEM-1");
    assert_eq!(plan["moves"][0]["warehouse_id"], "WH-B");
    assert_eq!(plan["moves"][1]["item_id"], "ITEM-2");
    assert_eq!(plan["moves"][1]["warehouse_id"], "WH-A");
    assert_eq!(plan["unallocated"][0]["id"], "ITEM-3");
}

#[test]
fn compare_reports_both_packers() {
    let snapshot = fixture("snapshot.json");
    let output = stowd(&["compare", "--snapshot", snapshot.to_str().unwrap(), "--format", "json"]);

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["packer"], "wfd");
    assert_eq!(reports[1]["packer"], "first_fit");
    assert_eq!(reports[0]["moves"], 2);
    assert_eq!(reports[0]["unallocated"], 1);
}

#[test]
fn init_config_prints_loadable_toml() {
    let output = stowd(&["init-config", "--data-dir", "/srv/stowgrid"]);

    let config = StowConfig::from_toml_str(&String::from_utf8(output.stdout).unwrap()).unwrap();
    assert_eq!(config.data_dir, PathBuf::from("/srv/stowgrid"));
    assert_eq!(config.queue.max_redeliveries, 15);
}

#[test]
fn import_then_serve_one_request() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().to_str().unwrap();
    let seed = fixture("seed.json");

    stowd(&["import", "--snapshot", seed.to_str().unwrap(), "--data-dir", data_dir]);
    assert!(dir.path().join("stowgrid.redb").exists());

    let out = dir.path().join("plans.jsonl");
    let mut child = Command::new(env!("CARGO_BIN_EXE_stowd"))
        .args(["serve", "--data-dir", data_dir])
        .env("RUST_LOG", "off")
        .env("STOW_SINK", "json_lines")
        .env("STOW_SINK_PATH", &out)
        .env_remove("MOCK_OUTPUT")
        .stdin(std::process::Stdio::piped())
        .spawn()
        .unwrap();
    {
        use std::io::Write;
        let mut stdin = child.stdin.take().unwrap();
        writeln!(stdin, r#"{{"request_id":"req-1","supply_id":"sup-1"}}"#).unwrap();
    }
    assert!(child.wait().unwrap().success());

    let written = std::fs::read_to_string(&out).unwrap();
    let plan: serde_json::Value = serde_json::from_str(written.trim()).unwrap();
    assert_eq!(plan["request_id"], "req-1");
    assert_eq!(plan["source_id"], "hub");
}
