//! System git backend - zero dependencies
//!
//! Uses git porcelain and plumbing commands for all operations:
//! - Safe subprocess execution (isolated environment)
//! - stderr captured and surfaced verbatim on failure

use crate::core::error::{RailError, RailResult, ResultExt, VcsError};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Directory git runs in (the project root, possibly below the top level)
  pub(crate) repo_path: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> RailResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(RailError::Vcs(VcsError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(RailError::message(format!("Failed to open git repository: {}", stderr)));
    }

    tracing::debug!(top_level = %String::from_utf8_lossy(&output.stdout).trim(), "opened git repository");
    Ok(Self {
      repo_path: path.to_path_buf(),
    })
  }

  /// Run git with `args`, turning a nonzero exit into `VcsError::CommandFailed`
  pub(crate) fn run(&self, args: &[&str]) -> RailResult<Output> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.first().copied().unwrap_or_default()))?;

    if !output.status.success() {
      return Err(RailError::Vcs(VcsError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        code: output.status.code(),
      }));
    }

    Ok(output)
  }

  /// Run git with `args` and report only whether it exited zero
  pub(crate) fn git_succeeds(&self, args: &[&str]) -> RailResult<bool> {
    let status = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.first().copied().unwrap_or_default()))?
      .status;
    Ok(status.success())
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}
