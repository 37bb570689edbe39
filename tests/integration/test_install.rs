//! Integration tests for build, install, clean and verify

use crate::helpers::{TestWorkspace, run_rpm_rail, run_rpm_rail_raw};
use anyhow::Result;

const INSTALL_CONFIG: &str = r#"[manifest]
files = ["pkg.spec", "*.py"]

[builder]
command = "true"
args = []

[build]
command = ["touch", "built.stamp"]

[install]
bin = ["main.py"]
lib = ["*.py"]
etc = ["README"]
bindir = "/usr/bin"
"#;

#[test]
fn test_install_into_destdir() -> Result<()> {
  let ws = TestWorkspace::with_config(INSTALL_CONFIG)?;
  let dest = tempfile::TempDir::new()?;
  let destdir = dest.path().to_string_lossy().to_string();

  let output = run_rpm_rail(&ws.path, &["install", "--destdir", &destdir])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Installed 4 files"), "stdout: {}", stdout);
  // The build step runs first
  assert!(ws.file_exists("built.stamp"));
  assert!(dest.path().join("usr/bin/main.py").is_file());
  assert!(dest.path().join("usr/share/pkg/main.py").is_file());
  assert!(dest.path().join("usr/share/pkg/util.py").is_file());
  assert!(dest.path().join("etc/pkg/README").is_file());

  Ok(())
}

#[test]
fn test_install_libdir_flag_overrides_default() -> Result<()> {
  let ws = TestWorkspace::with_config(INSTALL_CONFIG)?;
  let dest = tempfile::TempDir::new()?;
  let destdir = dest.path().to_string_lossy().to_string();

  run_rpm_rail(
    &ws.path,
    &["install", "--destdir", &destdir, "--libdir", "/opt/pkg"],
  )?;

  assert!(dest.path().join("opt/pkg/util.py").is_file());
  assert!(!dest.path().join("usr/share/pkg").exists());

  Ok(())
}

#[test]
fn test_build_skipped_when_unconfigured() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_rpm_rail(&ws.path, &["build"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("skipping"), "stdout: {}", stdout);
  Ok(())
}

#[test]
fn test_clean_removes_transient_files() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("main.pyc", "bytecode")?;
  ws.write_file("util.pyo", "bytecode")?;
  ws.write_file("notes~", "backup")?;

  let output = run_rpm_rail(&ws.path, &["clean"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Removed 3 transient files"), "stdout: {}", stdout);
  assert!(!ws.file_exists("main.pyc"));
  assert!(!ws.file_exists("util.pyo"));
  assert!(!ws.file_exists("notes~"));
  assert!(ws.file_exists("main.py"));

  Ok(())
}

#[test]
fn test_clean_dist_removes_release_artifacts() -> Result<()> {
  let ws = TestWorkspace::new()?;
  run_rpm_rail(&ws.path, &["localdist"])?;
  ws.write_file("pkg-1.0/leftover", "stale")?;
  assert!(ws.file_exists("pkg-1.0.tar.bz2"));

  run_rpm_rail(&ws.path, &["cleandist"])?;

  assert!(!ws.file_exists("pkg-1.0"));
  assert!(!ws.file_exists("pkg-1.0.tar.bz2"));
  assert!(ws.file_exists("pkg.spec"));

  Ok(())
}

#[test]
fn test_verify_runs_configured_checker() -> Result<()> {
  let ws = TestWorkspace::with_config(
    r#"[manifest]
files = ["pkg.spec"]

[verify]
command = ["true"]
"#,
  )?;

  let output = run_rpm_rail(&ws.path, &["verify"])?;
  assert!(String::from_utf8_lossy(&output.stdout).contains("Verification passed"));

  Ok(())
}

#[test]
fn test_verify_failure_propagates_status() -> Result<()> {
  let ws = TestWorkspace::with_config(
    r#"[manifest]
files = ["pkg.spec"]

[verify]
command = ["sh", "-c", "exit 5"]
"#,
  )?;

  let output = run_rpm_rail_raw(&ws.path, &["verify"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(5));
  assert!(stderr.contains("Command failed"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_verify_without_checker_is_an_error() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_rpm_rail_raw(&ws.path, &["verify"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert!(!output.status.success());
  assert!(stderr.contains("verify.command"), "stderr: {}", stderr);

  Ok(())
}
