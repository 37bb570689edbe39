//! Release operations for SystemGit (commit, tag, export, history)

use super::system_git::SystemGit;
use super::{CommitInfo, VersionControl};
use crate::core::error::{RailError, RailResult, ResultExt, VcsError};
use crate::ui::progress::FileProgress;
use crate::utils::path_to_git_format;
use std::path::Path;

impl SystemGit {
  /// Check for uncommitted changes to tracked files
  pub fn has_pending_changes(&self) -> RailResult<bool> {
    let output = self.run(&["status", "--porcelain", "--untracked-files=no"])?;
    Ok(!output.stdout.is_empty())
  }

  /// Get all commit SHAs reachable from HEAD (newest first)
  pub fn rev_list_head(&self) -> RailResult<Vec<String>> {
    let output = self.run(&["rev-list", "HEAD"])?;

    let commits = String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .collect();

    Ok(commits)
  }

  /// Get commit metadata for a single SHA
  pub fn get_commit(&self, sha: &str) -> RailResult<CommitInfo> {
    // %an (author name) %ae (author email) %at (author time) %B (body)
    let format = "--format=%an%n%ae%n%at%n%B";
    let output = self.run(&["log", "-1", format, sha])?;
    parse_commit_output(&output.stdout)
  }
}

impl VersionControl for SystemGit {
  fn commit_all(&self, message: &str) -> RailResult<bool> {
    if !self.has_pending_changes()? {
      tracing::debug!("no pending changes to commit");
      return Ok(false);
    }
    self.run(&["commit", "-a", "-m", message])?;
    Ok(true)
  }

  fn commit_path(&self, path: &Path, message: &str) -> RailResult<bool> {
    let path = path_to_git_format(path);
    self.run(&["add", "--", &path])?;

    // diff --cached --quiet exits 1 when the index differs from HEAD
    if self.git_succeeds(&["diff", "--cached", "--quiet", "--", &path])? {
      tracing::debug!(path = %path, "unchanged, nothing to commit");
      return Ok(false);
    }
    self.run(&["commit", "-m", message, "--", &path])?;
    Ok(true)
  }

  fn tag_exists(&self, tag: &str) -> RailResult<bool> {
    self.git_succeeds(&["rev-parse", "--verify", "--quiet", &format!("refs/tags/{}", tag)])
  }

  fn create_tag(&self, tag: &str, message: &str, force: bool) -> RailResult<()> {
    if !force && self.tag_exists(tag)? {
      return Err(RailError::Vcs(VcsError::TagAlreadyExists { tag: tag.to_string() }));
    }

    let mut args = vec!["tag", "-a"];
    if force {
      args.push("-f");
    }
    args.extend([tag, "-m", message]);
    self.run(&args)?;
    Ok(())
  }

  fn export(&self, tag: &str, module: &Path, dest: &Path) -> RailResult<usize> {
    if !self.tag_exists(tag)? {
      return Err(RailError::Vcs(VcsError::TagNotFound { tag: tag.to_string() }));
    }

    let treeish = if module.as_os_str().is_empty() {
      tag.to_string()
    } else {
      format!("{}:{}", tag, path_to_git_format(module))
    };

    let listing = self.run(&["ls-tree", "-r", "--name-only", &treeish])?;
    let total = listing.stdout.split(|b| *b == b'\n').filter(|l| !l.is_empty()).count();
    let output = self.run(&["archive", "--format=tar", &treeish])?;

    let mut progress = FileProgress::new(total, format!("Exporting {}", tag));
    let mut archive = tar::Archive::new(output.stdout.as_slice());
    let mut written = 0;
    for entry in archive.entries().context("Failed to read git archive stream")? {
      let mut entry = entry.context("Failed to read git archive entry")?;
      // git archive emits a pax global header carrying the commit id
      if entry.header().entry_type() == tar::EntryType::XGlobalHeader {
        continue;
      }
      entry
        .unpack_in(dest)
        .with_context(|| format!("Failed to export into {}", dest.display()))?;
      if entry.header().entry_type().is_file() {
        progress.inc();
      }
      written += 1;
    }

    tracing::info!(tag, entries = written, dest = %dest.display(), "exported tagged tree");
    Ok(written)
  }

  fn history(&self) -> RailResult<Vec<CommitInfo>> {
    if !self.git_succeeds(&["rev-parse", "--verify", "--quiet", "HEAD"])? {
      return Err(RailError::Vcs(VcsError::EmptyHistory {
        path: self.repo_path.clone(),
      }));
    }
    let shas = self.rev_list_head()?;

    use rayon::prelude::*;

    shas.par_iter().map(|sha| self.get_commit(sha)).collect()
  }
}

/// Parse git log output into CommitInfo
///
/// Format is %an%n%ae%n%at%n%B
fn parse_commit_output(data: &[u8]) -> RailResult<CommitInfo> {
  let output = String::from_utf8_lossy(data);
  let mut lines = output.lines();

  let author = lines.next().ok_or_else(|| RailError::message("Missing author name"))?.to_string();
  let author_email = lines.next().ok_or_else(|| RailError::message("Missing author email"))?.to_string();
  let timestamp = lines
    .next()
    .and_then(|s| s.parse::<i64>().ok())
    .ok_or_else(|| RailError::message("Missing/invalid author timestamp"))?;

  // Rest is commit message
  let message: Vec<&str> = lines.collect();
  let message = message.join("\n").trim().to_string();

  Ok(CommitInfo {
    author,
    author_email,
    message,
    timestamp,
  })
}
