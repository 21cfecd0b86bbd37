//! Tests that run the `devgen` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const HINT: &str = "to see all available markers";

/// Run the binary inside `dir` with colors off.
fn devgen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_devgen"))
        .current_dir(dir)
        .env_remove("DEVGEN_LOG")
        .env_remove("RUST_LOG")
        .arg("--no-color")
        .args(args)
        .output()
        .expect("run devgen")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

const WIDGET: &str = "/// +kubebuilder:object:root\npub struct Widget { pub size: u32 }\n";

const MISPLACED_UNION: &str =
    "/// +kubebuilder:object:root\npub struct Widget;\n\n/// +union\npub struct NotAnEnum;\n";

const CONFIG_DEFAULTS: &str = "[options]\ndefaults = [\"paths=api\", \"output:dir=from-config\"]\n";

#[test]
fn test_no_generators_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let output = devgen(dir.path(), &["paths=./api"]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("no generators specified"));
    assert!(err.contains("Usage:"));
    assert!(err.contains(HINT));
}

#[test]
fn test_unknown_option_names_the_token() {
    let dir = TempDir::new().unwrap();
    let output = devgen(dir.path(), &["crds", "bogus:thing=1"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("bogus:thing=1"));
}

#[test]
fn test_generate_writes_artifacts() {
    let dir = project(&[("api/widget_types.rs", WIDGET)]);
    let output = devgen(dir.path(), &["crds", "paths=api", "output:dir=out"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let crd = fs::read_to_string(dir.path().join("out/workspace.devfile.io_widgets.yaml")).unwrap();
    assert!(crd.contains("kind: Widget"));
}

#[test]
fn test_generation_failure_prints_hint_without_usage() {
    let dir = project(&[("api/types.rs", MISPLACED_UNION)]);
    let output = devgen(
        dir.path(),
        &["interfaces", "crds", "paths=api", "output:dir=out"],
    );

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("interfaces"));
    assert!(err.contains(HINT));
    assert!(!err.contains("Usage:"));
    let crd = dir.path().join("out/workspace.devfile.io_widgets.yaml");
    assert!(crd.exists());
}

#[test]
fn test_stdout_output_keeps_progress_on_stderr() {
    let dir = project(&[("api/widget_types.rs", WIDGET)]);
    let output = devgen(dir.path(), &["crds", "output:stdout", "paths=api"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = String::from_utf8_lossy(&output.stdout);
    assert!(out.contains("apiVersion: apiextensions.k8s.io/v1"));
    assert!(out.contains("kind: Widget"));
    assert!(!out.contains("Running generators"));
    assert!(stderr(&output).contains("Running generators"));
    assert!(!dir.path().join("config").exists());
}

#[test]
fn test_config_defaults_apply_before_arguments() {
    let dir = project(&[
        ("api/widget_types.rs", WIDGET),
        ("devgen.toml", CONFIG_DEFAULTS),
    ]);
    let output = devgen(dir.path(), &["crds", "output:dir=from-cli"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("from-cli").exists());
    assert!(!dir.path().join("from-config").exists());
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    let output = devgen(dir.path(), &["--config", "absent.toml", "crds"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("absent.toml"));
}

#[test]
fn test_init_config() {
    let dir = TempDir::new().unwrap();

    assert!(devgen(dir.path(), &["--init-config"]).status.success());
    let content = fs::read_to_string(dir.path().join("devgen.toml")).unwrap();
    assert!(content.contains("[options]"));

    let again = devgen(dir.path(), &["--init-config"]);
    assert_eq!(again.status.code(), Some(1));
    let forced = devgen(dir.path(), &["--init-config", "--force"]);
    assert!(forced.status.success());
}

#[test]
fn test_which_markers_json() {
    let dir = TempDir::new().unwrap();
    let output = devgen(dir.path(), &["crds", "-wwww"]);

    assert!(output.status.success());
    let docs: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = docs
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|c| c["markers"].as_array().unwrap())
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"crds"));
    assert!(names.contains(&"kubebuilder:resource"));
    assert!(!names.contains(&"deepcopy"));
}

#[test]
fn test_which_markers_does_not_generate() {
    let dir = project(&[("api/widget_types.rs", WIDGET)]);
    let output = devgen(dir.path(), &["crds", "paths=api", "output:dir=out", "-w"]);

    assert!(output.status.success());
    assert!(stderr(&output).contains("+crds"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_detailed_help_lists_options_by_role() {
    let dir = TempDir::new().unwrap();
    let output = devgen(dir.path(), &["-hh"]);

    assert!(output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Options"));
    assert!(err.contains("generators"));
    assert!(err.contains("common options"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    let output = devgen(dir.path(), &["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}
