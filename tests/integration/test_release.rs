//! Integration tests for tagging, changelog regeneration and the release pipeline

use crate::helpers::{TestWorkspace, git, run_rpm_rail, run_rpm_rail_raw};
use anyhow::Result;

#[test]
fn test_tag_commits_pending_changes() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("main.py", "print('changed')\n")?;

  let output = run_rpm_rail(&ws.path, &["tag"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("V1_0_1"), "stdout: {}", stdout);
  assert_eq!(ws.tags()?, vec!["V1_0_1"]);
  assert_eq!(ws.git_log(1)?, vec!["Release 1.0-1"]);

  Ok(())
}

#[test]
fn test_tag_twice_fails() -> Result<()> {
  let ws = TestWorkspace::new()?;
  run_rpm_rail(&ws.path, &["tag"])?;

  let output = run_rpm_rail_raw(&ws.path, &["cvstag"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("Tag already exists: V1_0_1"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_tag_force_moves_tag() -> Result<()> {
  let ws = TestWorkspace::new()?;
  run_rpm_rail(&ws.path, &["tag"])?;
  let head = ws.commit_file("util.py", "VALUE = 2\n", "Late fix")?;

  run_rpm_rail(&ws.path, &["tag", "--force"])?;
  let output = git(&ws.path, &["rev-list", "-n", "1", "V1_0_1"])?;
  assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), head);

  Ok(())
}

#[test]
fn test_changelog_is_regenerated_and_committed() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.commit_file("main.py", "print('two')\n", "Second change")?;

  run_rpm_rail(&ws.path, &["changelog"])?;
  let changelog = ws.read_file("ChangeLog")?;

  assert!(changelog.contains("Test User  <test@example.com>"), "changelog:\n{}", changelog);
  assert!(changelog.contains("\t* Second change"));
  assert!(changelog.contains("\t* Initial package import"));
  let newest = changelog.find("Second change").unwrap_or(usize::MAX);
  let oldest = changelog.find("Initial package import").unwrap_or(0);
  assert!(newest < oldest, "newest entry should come first");

  let subject = ws.git_log(1)?;
  assert!(subject[0].starts_with("Generated by rpm-rail changelog"), "{:?}", subject);

  // Running again leaves history alone: its own commit is not listed
  run_rpm_rail(&ws.path, &["changelog"])?;
  assert_eq!(ws.git_log(2)?.iter().filter(|s| s.starts_with("Generated")).count(), 1);

  Ok(())
}

#[test]
fn test_dist_without_tag_fails() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_rpm_rail_raw(&ws.path, &["dist"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("Tag not found: V1_0_1"), "stderr: {}", stderr);
  assert!(!ws.file_exists("pkg-1.0.tar.bz2"));

  Ok(())
}

#[test]
fn test_dist_exports_tagged_tree_only() -> Result<()> {
  let ws = TestWorkspace::new()?;
  run_rpm_rail(&ws.path, &["tag"])?;
  // Uncommitted work after the tag must not reach the archive
  ws.write_file("scratch.py", "unreleased\n")?;

  run_rpm_rail(&ws.path, &["dist"])?;

  let entries = ws.archive_entries("pkg-1.0.tar.bz2")?;
  assert!(entries.contains(&"pkg-1.0/pkg.spec".to_string()), "entries: {:?}", entries);
  assert!(entries.contains(&"pkg-1.0/rpm-rail.toml".to_string()));
  assert!(!entries.iter().any(|e| e.ends_with("scratch.py")));
  assert!(!ws.file_exists("pkg-1.0"));

  Ok(())
}

#[test]
fn test_rpm_end_to_end() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_rpm_rail(&ws.path, &["rpm"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("rpm complete"), "stdout: {}", stdout);
  assert_eq!(ws.tags()?, vec!["V1_0_1"]);
  assert!(ws.file_exists("ChangeLog"));
  assert!(ws.file_exists("pkg-1.0.tar.bz2"));
  assert!(!ws.file_exists("pkg-1.0"));

  // The tag points at the changelog commit, so the export carries it
  let entries = ws.archive_entries("pkg-1.0.tar.bz2")?;
  assert!(entries.contains(&"pkg-1.0/ChangeLog".to_string()), "entries: {:?}", entries);

  Ok(())
}

#[test]
fn test_rpm_outside_repository() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  std::fs::write(dir.path().join("pkg.spec"), crate::helpers::SPEC)?;

  let output = run_rpm_rail_raw(dir.path(), &["tag"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(2));
  assert!(stderr.contains("Git repository not found"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_changelog_before_first_commit() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  git(dir.path(), &["init", "--initial-branch=main"])?;
  std::fs::write(dir.path().join("pkg.spec"), crate::helpers::SPEC)?;

  let output = run_rpm_rail_raw(dir.path(), &["changelog"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("Repository has no commits yet"), "stderr: {}", stderr);
  assert!(!dir.path().join("ChangeLog").exists());

  Ok(())
}
