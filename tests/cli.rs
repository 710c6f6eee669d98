use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MISSING_ENGINE: &str = "podman-sandbox-test-missing-engine";

fn cmd(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("podman-sandbox").unwrap();
    cmd.env("PODMAN_SANDBOX_CONFIG_DIR", config_dir)
        .env("PODMAN_SANDBOX_ENGINE", MISSING_ENGINE)
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version() {
    let temp_dir = TempDir::new().unwrap();
    cmd(temp_dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("podman-sandbox"));
}

#[test]
fn test_configure_show_defaults() {
    let temp_dir = TempDir::new().unwrap();
    cmd(temp_dir.path())
        .args(["configure", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current configuration:"))
        .stdout(predicate::str::contains("Image: alpine:latest"))
        .stdout(predicate::str::contains("Memory limit: unlimited"))
        .stdout(predicate::str::contains("Auto-commit: disabled"));

    // Showing the defaults does not create the file
    assert!(!temp_dir.path().join("config.json").exists());
}

#[test]
fn test_configure_memory_persists() {
    let temp_dir = TempDir::new().unwrap();
    cmd(temp_dir.path())
        .args(["configure", "--memory", "512m", "--auto-commit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration changes:"))
        .stdout(predicate::str::contains("- unlimited"))
        .stdout(predicate::str::contains("+ 512m"))
        .stdout(predicate::str::contains("+ enabled"))
        .stdout(predicate::str::contains("(unchanged)"))
        .stdout(predicate::str::contains("Container is not running."));

    let content = fs::read_to_string(temp_dir.path().join("config.json")).unwrap();
    let config: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(config["memory_limit"], "512m");
    assert_eq!(config["auto_commit"], true);
    assert_eq!(config["image"], "alpine:latest");

    cmd(temp_dir.path())
        .args(["configure", "--show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"memory_limit\": \"512m\""));
}

#[test]
fn test_configure_without_options_fails() {
    let temp_dir = TempDir::new().unwrap();
    cmd(temp_dir.path())
        .arg("configure")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No configuration options provided"));
}

#[test]
fn test_status_without_engine() {
    let temp_dir = TempDir::new().unwrap();
    cmd(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not_created"))
        .stdout(predicate::str::contains("Running: no"));
}

#[test]
fn test_status_json() {
    let temp_dir = TempDir::new().unwrap();
    let output = cmd(temp_dir.path())
        .args(["status", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["container"]["status"], "not_created");
    assert_eq!(value["committed_image"], serde_json::Value::Null);
}

#[test]
fn test_execute_not_running() {
    let temp_dir = TempDir::new().unwrap();
    cmd(temp_dir.path())
        .args(["execute", "ls -la"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not running"));
}

#[test]
fn test_stop_and_commit_not_running() {
    let temp_dir = TempDir::new().unwrap();
    for subcommand in ["stop", "commit"] {
        cmd(temp_dir.path())
            .arg(subcommand)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("is not running"));
    }
}

#[test]
fn test_reset_without_saved_state() {
    let temp_dir = TempDir::new().unwrap();
    cmd(temp_dir.path())
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved state found"));
}

#[test]
fn test_list_without_engine() {
    let temp_dir = TempDir::new().unwrap();
    cmd(temp_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No containers found."));
}

#[test]
fn test_start_reports_engine_failure() {
    let temp_dir = TempDir::new().unwrap();
    cmd(temp_dir.path())
        .args(["start", "--image", "python:3.11-alpine"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to start container"))
        .stderr(predicate::str::contains(MISSING_ENGINE));

    // The image choice is kept even though the start failed
    let content = fs::read_to_string(temp_dir.path().join("config.json")).unwrap();
    assert!(content.contains("python:3.11-alpine"));
}

#[cfg(unix)]
mod fake_engine {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    /// Shell script standing in for podman: the sandbox is always running
    /// with `$FAKE_MOUNT` mounted, and `exec` exits with 7
    const SCRIPT: &str = r#"#!/bin/sh
echo "$@" >> "$FAKE_LOG"
case "$1" in
  ps) echo podman-sandbox ;;
  inspect) echo "$FAKE_MOUNT" ;;
  exec) exit 7 ;;
esac
exit 0
"#;

    struct Fixture {
        temp_dir: TempDir,
        engine: PathBuf,
        log: PathBuf,
        workdir: PathBuf,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let engine = root.join("fake-podman");
        fs::write(&engine, SCRIPT).unwrap();
        fs::set_permissions(&engine, fs::Permissions::from_mode(0o755)).unwrap();
        let workdir = root.join("project");
        fs::create_dir(&workdir).unwrap();

        Fixture {
            log: root.join("calls.log"),
            engine,
            workdir,
            temp_dir,
        }
    }

    impl Fixture {
        fn cmd(&self, mount: &Path) -> Command {
            let mut cmd = cmd(&self.temp_dir.path().join("config"));
            cmd.env("PODMAN_SANDBOX_ENGINE", &self.engine)
                .env("FAKE_LOG", &self.log)
                .env("FAKE_MOUNT", mount)
                .current_dir(&self.workdir);
            cmd
        }

        fn calls(&self) -> String {
            fs::read_to_string(&self.log).unwrap_or_default()
        }
    }

    #[test]
    fn test_execute_forwards_exit_code() {
        let fixture = fixture();
        fixture
            .cmd(&fixture.workdir)
            .args(["execute", "exit 7"])
            .assert()
            .code(7)
            .stderr(predicate::str::contains("Directory changed").not());

        let calls = fixture.calls();
        assert!(calls.contains("exec podman-sandbox sh -c exit 7"));
        assert!(!calls.contains("run -d"));
    }

    #[test]
    fn test_execute_remounts_changed_directory() {
        let fixture = fixture();
        let elsewhere = fixture.temp_dir.path().join("elsewhere");
        fixture
            .cmd(&elsewhere)
            .args(["execute", "-i", "pwd"])
            .assert()
            .code(7)
            .stderr(predicate::str::contains("Directory changed, restarting container..."));

        let calls = fixture.calls();
        let volume = format!("-v {}:/workspace:Z", fixture.workdir.display());
        assert!(calls.contains("rm -f podman-sandbox"));
        assert!(calls.contains(&volume));
        assert!(calls.contains("exec -it podman-sandbox sh -c pwd"));
    }

    #[test]
    fn test_start_already_running() {
        let fixture = fixture();
        fixture
            .cmd(&fixture.workdir)
            .arg("start")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("already running"));
    }
}
