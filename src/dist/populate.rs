//! Filling the staging directory
//!
//! Two interchangeable sources: the working tree filtered through the static
//! manifest (`localdist`), or the tagged snapshot from version control
//! (`dist`). The caller picks one; populators never branch on mode.

use crate::core::context::ReleaseContext;
use crate::core::error::{ConfigError, PipelineError, RailError, RailResult, ResultExt, VcsError};
use crate::core::vcs::VersionControl;
use crate::dist::staging::is_empty_dir;
use crate::ui::progress::FileProgress;
use crate::utils::{copy_recursive, expand_pattern};
use std::fs;
use std::path::Path;

pub trait SourcePopulator {
  /// Short label for logs ("copy", "export")
  fn mode(&self) -> &'static str;

  /// Fill `staging` and return the number of files written
  fn populate(&self, ctx: &ReleaseContext, staging: &Path) -> RailResult<usize>;
}

/// Copies the manifest entries from the working tree
///
/// Entries are processed in manifest order. Files copied before a missing
/// entry is hit stay in the staging directory.
pub struct CopyPopulator<'a> {
  manifest: &'a [String],
}

impl<'a> CopyPopulator<'a> {
  pub fn new(manifest: &'a [String]) -> Self {
    Self { manifest }
  }

  pub fn from_context(ctx: &'a ReleaseContext) -> RailResult<Self> {
    if ctx.config.manifest.files.is_empty() {
      return Err(RailError::Config(ConfigError::MissingField {
        field: "manifest.files".to_string(),
      }));
    }
    Ok(Self::new(&ctx.config.manifest.files))
  }
}

impl SourcePopulator for CopyPopulator<'_> {
  fn mode(&self) -> &'static str {
    "copy"
  }

  fn populate(&self, ctx: &ReleaseContext, staging: &Path) -> RailResult<usize> {
    let mut progress = FileProgress::new(self.manifest.len(), "Staging files");
    let mut copied = 0;
    // Never stage the staging directory or our own archives into themselves,
    // whether matched directly or found while walking a parent directory
    let own_outputs = [staging.to_path_buf(), ctx.tar_path(), ctx.archive_path()];

    for entry in self.manifest {
      let matches = expand_pattern(&ctx.root, entry)?;
      if matches.is_empty() {
        return Err(RailError::Pipeline(PipelineError::SourceMissing { entry: entry.clone() }));
      }

      for src in matches {
        if own_outputs.iter().any(|output| src.starts_with(output)) {
          continue;
        }
        let rel = src.strip_prefix(&ctx.root)?;
        copied += copy_recursive(&src, &staging.join(rel), &own_outputs)
          .with_context(|| format!("Failed to copy {} into staging", rel.display()))?;
      }
      progress.inc();
    }

    tracing::info!(files = copied, staging = %staging.display(), "copied manifest into staging");
    Ok(copied)
  }
}

/// Exports the tree recorded under the release tag
pub struct ExportPopulator<'a> {
  vcs: &'a dyn VersionControl,
}

impl<'a> ExportPopulator<'a> {
  pub fn new(vcs: &'a dyn VersionControl) -> Self {
    Self { vcs }
  }
}

impl SourcePopulator for ExportPopulator<'_> {
  fn mode(&self) -> &'static str {
    "export"
  }

  fn populate(&self, ctx: &ReleaseContext, staging: &Path) -> RailResult<usize> {
    if staging.is_dir() && !is_empty_dir(staging)? {
      return Err(RailError::Vcs(VcsError::ExportConflict {
        path: staging.to_path_buf(),
      }));
    }
    fs::create_dir_all(staging).with_context(|| format!("Failed to create {}", staging.display()))?;

    let tag = ctx.tag();
    if !tag.is_ref_safe() {
      tracing::warn!(tag = %tag, "release tag contains characters outside [A-Za-z0-9_]");
    }
    self.vcs.export(tag.as_str(), &ctx.config.vcs.module, staging)
  }
}
