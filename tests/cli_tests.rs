//! CLI-level tests: exit codes and user-facing output.

use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_config_fails_with_nonzero_exit() {
    let output = Command::cargo_bin("windfall")
        .unwrap()
        .args(["build", "/nonexistent/windfall.toml"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(text.contains("failed to read config"));
}

#[test]
fn test_empty_toolchain_build_fails() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("windfall.toml");
    fs::write(
        &config,
        format!(
            r#"
            [build]
            lfs_dir = "{base}/lfs"
            sources_dir = "{base}/sources"
            tools_dir = "{base}/tools"
            "#,
            base = temp.path().display()
        ),
    )
    .unwrap();

    let output = Command::cargo_bin("windfall")
        .unwrap()
        .arg("build")
        .arg(&config)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(text.contains("no toolchain packages"));
}

#[test]
fn test_show_prints_resolved_configuration() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("windfall.toml");
    fs::write(
        &config,
        r#"
        [meta]
        name = "TestLinux"
        version = "2.0"

        [[packages]]
        name = "zlib"
        version = "1.3"
        url = "https://example.org/zlib-1.3.tar.gz"
        build = ["make"]
        "#,
    )
    .unwrap();

    let output = Command::cargo_bin("windfall")
        .unwrap()
        .arg("show")
        .arg(&config)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("TestLinux 2.0"));
    assert!(stdout.contains("System packages:    1"));
}
