//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const SPEC: &str = r#"%define name pkg
Name: %{name}
Version: 1.0
Release: 1
Summary: Test package
License: GPL

%description
Package used by the rpm-rail integration tests.
"#;

pub const CONFIG: &str = r#"[manifest]
files = ["pkg.spec", "*.py", "README"]

[builder]
command = "true"
args = []
"#;

/// A packaging project inside a git repository
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Spec file, sources and rpm-rail.toml, committed as the initial import
  pub fn new() -> Result<Self> {
    Self::with_config(CONFIG)
  }

  pub fn with_config(config: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(path.join("pkg.spec"), SPEC)?;
    std::fs::write(path.join("rpm-rail.toml"), config)?;
    std::fs::write(path.join("main.py"), "print('hello')\n")?;
    std::fs::write(path.join("util.py"), "VALUE = 1\n")?;
    std::fs::write(path.join("README"), "Test package\n")?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial package import"])?;

    Ok(Self { _root: root, path })
  }

  /// Write a file relative to the workspace root
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let full = self.path.join(path);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(full, content)?;
    Ok(())
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Write one file and commit it; returns the new HEAD
  pub fn commit_file(&self, path: &str, content: &str, message: &str) -> Result<String> {
    self.write_file(path, content)?;
    self.commit(message)
  }

  /// Entry paths inside a `.tar.bz2` in the workspace root
  pub fn archive_entries(&self, name: &str) -> Result<Vec<String>> {
    let file = std::fs::File::open(self.path.join(name))?;
    let mut archive = tar::Archive::new(bzip2::read::BzDecoder::new(file));
    let mut entries = Vec::new();
    for entry in archive.entries()? {
      entries.push(entry?.path()?.to_string_lossy().trim_end_matches('/').to_string());
    }
    Ok(entries)
  }

  /// Get git log subjects (newest first)
  pub fn git_log(&self, n: usize) -> Result<Vec<String>> {
    let output = git(&self.path, &["log", &format!("-{}", n), "--format=%s"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  pub fn tags(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["tag", "--list"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  /// Sorted names of the entries directly under the workspace root (excluding .git)
  pub fn listing(&self) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(&self.path)? {
      let name = entry?.file_name().to_string_lossy().to_string();
      if name != ".git" {
        names.push(name);
      }
    }
    names.sort();
    Ok(names)
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run rpm-rail and return its output whatever the exit status
pub fn run_rpm_rail_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_rpm-rail");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("RUST_LOG")
    .env_remove("DESTDIR")
    .env_remove("BINDIR")
    .env_remove("LIBDIR")
    .env_remove("ETCDIR")
    .env_remove("RPM_RAIL_CONFIG")
    .env("SOURCE_DATE_EPOCH", "1700000000")
    .output()
    .context("Failed to run rpm-rail")
}

/// Run rpm-rail and fail unless it exits successfully
pub fn run_rpm_rail(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_rpm_rail_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "rpm-rail command failed: rpm-rail {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
