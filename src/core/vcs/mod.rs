pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

use crate::core::error::RailResult;
use std::path::Path;

/// Information about a commit
#[derive(Debug, Clone)]
pub struct CommitInfo {
  pub author: String,
  pub author_email: String,
  pub message: String,
  pub timestamp: i64,
}

impl CommitInfo {
  /// Get the first line of the commit message
  pub fn summary(&self) -> &str {
    self.message.lines().next().unwrap_or("")
  }
}

/// Version control capabilities the release pipeline needs
///
/// `SystemGit` is the production backend; tests substitute in-memory fakes.
pub trait VersionControl {
  /// Commit every pending change to tracked files. Returns false when there was nothing to commit.
  fn commit_all(&self, message: &str) -> RailResult<bool>;

  /// Stage and commit only `path`. Returns false when it is unchanged.
  fn commit_path(&self, path: &Path, message: &str) -> RailResult<bool>;

  fn tag_exists(&self, tag: &str) -> RailResult<bool>;

  /// Create an annotated tag on HEAD, replacing an existing one when `force` is set
  fn create_tag(&self, tag: &str, message: &str, force: bool) -> RailResult<()>;

  /// Write the tree of `module` as recorded under `tag` into `dest`. Returns the number of entries written.
  fn export(&self, tag: &str, module: &Path, dest: &Path) -> RailResult<usize>;

  /// Full history, newest first. Fails with `EmptyHistory` before the first commit.
  fn history(&self) -> RailResult<Vec<CommitInfo>>;
}
