//! Staging directory lifecycle
//!
//! `clean` is idempotent and always runs before `create`; the pipeline relies
//! on that ordering rather than on a lock.

use crate::core::context::ReleaseContext;
use crate::core::error::{PipelineError, RailError, RailResult, ResultExt};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Remove the staging directory and any tarball sharing its stem
///
/// Returns the paths that were actually removed.
pub fn clean(ctx: &ReleaseContext) -> RailResult<Vec<PathBuf>> {
  let mut removed = Vec::new();

  for path in [ctx.staging_dir(), ctx.tar_path(), ctx.archive_path()] {
    if remove_path(&path).with_context(|| format!("Failed to remove {}", path.display()))? {
      tracing::debug!(path = %path.display(), "removed stale artifact");
      removed.push(path);
    }
  }

  Ok(removed)
}

/// Create the empty staging directory
pub fn create(ctx: &ReleaseContext) -> RailResult<PathBuf> {
  let dir = ctx.staging_dir();

  if dir.is_dir() && !is_empty_dir(&dir)? {
    return Err(RailError::Pipeline(PipelineError::StagingConflict { path: dir }));
  }

  fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
  tracing::debug!(path = %dir.display(), "created staging directory");
  Ok(dir)
}

pub fn is_empty_dir(dir: &Path) -> RailResult<bool> {
  Ok(fs::read_dir(dir)?.next().is_none())
}

fn remove_path(path: &Path) -> io::Result<bool> {
  let meta = match fs::symlink_metadata(path) {
    Ok(meta) => meta,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
    Err(e) => return Err(e),
  };

  if meta.is_dir() {
    fs::remove_dir_all(path)?;
  } else {
    fs::remove_file(path)?;
  }
  Ok(true)
}
