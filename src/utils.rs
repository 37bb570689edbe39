//! Utility functions for path handling and pattern expansion

use crate::core::error::RailResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Convert a path to Git format (always forward slashes)
///
/// Git expects paths with forward slashes, even on Windows.
pub fn path_to_git_format(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}

/// Expand a root-relative path or glob pattern into existing paths (sorted)
///
/// Plain paths without glob metacharacters are returned as-is when they exist.
pub fn expand_pattern(root: &Path, pattern: &str) -> RailResult<Vec<PathBuf>> {
  if !pattern.contains(['*', '?', '[']) {
    let path = root.join(pattern);
    return Ok(if fs::symlink_metadata(&path).is_ok() { vec![path] } else { vec![] });
  }

  let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
  let full = format!("{}/{}", escaped_root.trim_end_matches('/'), pattern);

  let mut matches = Vec::new();
  for entry in glob::glob(&full)? {
    matches.push(entry?);
  }
  matches.sort();
  Ok(matches)
}

/// Copy a file or directory tree, preserving permissions and symlinks
///
/// Paths listed in `skip` are pruned from the walk together with everything below them.
pub fn copy_recursive(src: &Path, dst: &Path, skip: &[PathBuf]) -> RailResult<usize> {
  let meta = fs::symlink_metadata(src)?;

  if !meta.is_dir() {
    if let Some(parent) = dst.parent() {
      fs::create_dir_all(parent)?;
    }
    copy_entry(src, dst, &meta)?;
    return Ok(1);
  }

  let mut copied = 0;
  let walker = walkdir::WalkDir::new(src)
    .follow_links(false)
    .into_iter()
    .filter_entry(|entry| !skip.iter().any(|path| entry.path() == path));
  for entry in walker {
    let entry = entry?;
    let rel = entry.path().strip_prefix(src)?;
    let target = dst.join(rel);
    let meta = entry.metadata()?;

    if meta.is_dir() {
      fs::create_dir_all(&target)?;
    } else {
      copy_entry(entry.path(), &target, &meta)?;
      copied += 1;
    }
  }
  Ok(copied)
}

fn copy_entry(src: &Path, dst: &Path, meta: &fs::Metadata) -> RailResult<()> {
  if meta.file_type().is_symlink() {
    #[cfg(unix)]
    {
      std::os::unix::fs::symlink(fs::read_link(src)?, dst)?;
      return Ok(());
    }
  }

  fs::copy(src, dst)?;
  Ok(())
}
