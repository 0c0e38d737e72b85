//! End-to-end tests of the scan pipeline and the binary.

use std::fs;
use std::path::PathBuf;
use std::process::Command as Process;

use uimap::{load_config, render, scan, OutputFormat, Options};

const TREE: &str = r#"
control_type: Window
name: Login
bounds: "0,0,400,200"
children:
  - control_type: Text
    name: User Name
    bounds: "10,10,80,18"
  - control_type: Edit
    automation_id: txtUser
    bounds: "100,11,200,20"
  - control_type: Button
    name: Sign In
    bounds: "10,60,80,24"
"#;

/// Scratch directory unique to one test.
fn scratch(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("uimap-{}-{}", test, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_scan_maps_labels_to_locators() {
    let dir = scratch("scan");
    let tree = dir.join("login.yaml");
    fs::write(&tree, TREE).unwrap();

    let options = Options {
        tree,
        ..Options::default()
    };
    let map = scan(&options, load_config(None).unwrap()).unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Sign In", "User Name"]);
    assert!(map["User Name"].ends_with("/*[@AutomationId='txtUser' and @ControlType='ControlType.Edit']"));

    let json: serde_json::Value =
        serde_json::from_str(&render(&map, OutputFormat::Json).unwrap()).unwrap();
    assert_eq!(json["Sign In"], map["Sign In"].as_str());
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_cache_is_written_and_reused() {
    let dir = scratch("cache");
    let tree = dir.join("login.yaml");
    fs::write(&tree, TREE).unwrap();
    let config_path = dir.join("uimap.yaml");
    fs::write(&config_path, "cache:\n  enabled: true\n  format: yaml\n").unwrap();

    let options = Options {
        tree,
        config: Some(config_path.clone()),
        cache: Some(dir.join("scan")),
        ..Options::default()
    };
    let first = scan(&options, load_config(Some(&config_path)).unwrap()).unwrap();
    let written = dir.join("scan.yaml");
    assert!(written.exists());

    let second = scan(&options, load_config(Some(&config_path)).unwrap()).unwrap();
    assert_eq!(first, second);
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_definitions_rename_components() {
    let dir = scratch("definitions");
    let tree = dir.join("login.yaml");
    fs::write(&tree, TREE).unwrap();
    let definitions = dir.join("definitions.yaml");
    fs::write(
        &definitions,
        "- label: Login Button\n  xpath: \"/*[@Name='Sign In' and @ControlType='ControlType.Button']\"\n",
    )
    .unwrap();

    let options = Options {
        tree,
        definitions: Some(definitions),
        ..Options::default()
    };
    let map = scan(&options, load_config(None).unwrap()).unwrap();
    assert!(map.contains_key("Login Button"));
    assert!(!map.contains_key("Sign In"));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_tree_is_an_error() {
    let options = Options {
        tree: PathBuf::from("/nonexistent/uimap/tree.yaml"),
        ..Options::default()
    };
    let err = scan(&options, load_config(None).unwrap()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read recorded tree"));
}

#[test]
fn test_binary_prints_yaml_map() {
    let dir = scratch("binary");
    let tree = dir.join("login.yaml");
    fs::write(&tree, TREE).unwrap();

    let output = Process::new(env!("CARGO_BIN_EXE_uimap"))
        .arg(&tree)
        .env("RUST_LOG", "off")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let map: std::collections::BTreeMap<String, String> = serde_yaml::from_str(&stdout).unwrap();
    assert!(map.contains_key("User Name"));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_binary_rejects_unknown_option() {
    let output = Process::new(env!("CARGO_BIN_EXE_uimap"))
        .arg("--verbose")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown option"));
}
