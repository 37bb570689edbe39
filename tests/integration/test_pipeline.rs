//! Integration tests for the local (copy-mode) pipeline

use crate::helpers::{TestWorkspace, run_rpm_rail, run_rpm_rail_raw};
use anyhow::Result;

#[test]
fn test_localrpm_leaves_only_the_archive() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_rpm_rail(&ws.path, &["localrpm"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("pkg-1.0.tar.bz2"), "stdout: {}", stdout);
  assert_eq!(
    ws.listing()?,
    vec!["README", "main.py", "pkg-1.0.tar.bz2", "pkg.spec", "rpm-rail.toml", "util.py"]
  );
  assert!(!ws.file_exists("pkg-1.0"));
  assert!(!ws.file_exists("pkg-1.0.tar"));

  Ok(())
}

#[test]
fn test_localdist_archive_contents() -> Result<()> {
  let ws = TestWorkspace::new()?;
  run_rpm_rail(&ws.path, &["localdist"])?;

  assert_eq!(
    ws.archive_entries("pkg-1.0.tar.bz2")?,
    vec!["pkg-1.0", "pkg-1.0/README", "pkg-1.0/main.py", "pkg-1.0/pkg.spec", "pkg-1.0/util.py"]
  );

  Ok(())
}

#[test]
fn test_localdist_is_reproducible() -> Result<()> {
  let ws = TestWorkspace::new()?;

  run_rpm_rail(&ws.path, &["localdist"])?;
  let first = std::fs::read(ws.path.join("pkg-1.0.tar.bz2"))?;
  run_rpm_rail(&ws.path, &["localdist"])?;
  let second = std::fs::read(ws.path.join("pkg-1.0.tar.bz2"))?;

  assert_eq!(first, second);
  Ok(())
}

#[test]
fn test_stale_staging_is_cleaned_first() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("pkg-1.0/leftover", "from a failed run")?;

  run_rpm_rail(&ws.path, &["localrpm"])?;
  assert!(!ws.file_exists("pkg-1.0"));

  Ok(())
}

#[test]
fn test_missing_manifest_entry() -> Result<()> {
  let ws = TestWorkspace::with_config(
    r#"[manifest]
files = ["pkg.spec", "AUTHORS", "main.py"]

[builder]
command = "true"
args = []
"#,
  )?;

  let output = run_rpm_rail_raw(&ws.path, &["localrpm"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("Manifest entry matched no files: AUTHORS"), "stderr: {}", stderr);
  // Files copied before the failure stay for inspection
  assert!(ws.file_exists("pkg-1.0/pkg.spec"));
  assert!(!ws.file_exists("pkg-1.0/main.py"));
  assert!(!ws.file_exists("pkg-1.0.tar.bz2"));

  Ok(())
}

#[test]
fn test_builder_exit_status_is_propagated() -> Result<()> {
  let ws = TestWorkspace::with_config(
    r#"[manifest]
files = ["pkg.spec", "*.py"]

[builder]
command = "sh"
args = ["-c", "echo building $1 >&2; exit 3", "sh"]
"#,
  )?;

  let output = run_rpm_rail_raw(&ws.path, &["localrpm"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(3));
  assert!(stderr.contains("building"), "builder output should pass through: {}", stderr);
  assert!(stderr.contains("Package build failed"), "stderr: {}", stderr);
  assert!(ws.file_exists("pkg-1.0.tar.bz2"));

  Ok(())
}

#[test]
fn test_missing_release_declaration() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("pkg.spec", "Name: pkg\nVersion: 1.0\n")?;

  let output = run_rpm_rail_raw(&ws.path, &["localrpm"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("No release declaration found"), "stderr: {}", stderr);
  assert!(!ws.file_exists("pkg-1.0"));

  Ok(())
}

#[test]
fn test_dry_run_changes_nothing() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let before = ws.listing()?;

  let output = run_rpm_rail(&ws.path, &["localrpm", "--dry-run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("clean-dist"));
  assert!(stdout.contains("build-rpm"));
  assert_eq!(ws.listing()?, before);

  Ok(())
}

#[test]
fn test_plan_json() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_rpm_rail(&ws.path, &["plan", "rpm", "--json"])?;
  let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(plan["target"], "rpm");
  assert_eq!(
    plan["steps"],
    serde_json::json!(["changelog", "tag", "clean-dist", "export", "tar", "build-rpm"])
  );
  assert_eq!(plan["release"]["tag"], "V1_0_1");

  Ok(())
}

#[test]
fn test_version_output() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_rpm_rail(&ws.path, &["version"])?;
  assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1.0-1");

  let output = run_rpm_rail(&ws.path, &["version", "--json"])?;
  let summary: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(summary["name"], "pkg");
  assert_eq!(summary["tag"], "V1_0_1");

  Ok(())
}

#[test]
fn test_directory_flag() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let elsewhere = tempfile::TempDir::new()?;
  let dir = ws.path.to_string_lossy().to_string();

  let output = run_rpm_rail(elsewhere.path(), &["-C", &dir, "version"])?;
  assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1.0-1");

  Ok(())
}
