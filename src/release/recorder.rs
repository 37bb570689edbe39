//! Recording a release in version control
//!
//! Two independent sub-operations, each safe to retry but not atomic together:
//! tagging (commit pending work, then tag) and changelog regeneration
//! (render history, then commit just that file).

use crate::core::context::ReleaseContext;
use crate::core::error::{RailResult, ResultExt};
use crate::core::external;
use crate::core::vcs::VersionControl;
use crate::release::changelog;
use crate::release::tag::ReleaseTag;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOutcome {
  pub tag: ReleaseTag,
  /// Whether pending changes were committed before tagging
  pub committed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogOutcome {
  pub path: PathBuf,
  /// False when the regenerated document matched the committed one
  pub committed: bool,
}

pub struct ReleaseRecorder<'a> {
  ctx: &'a ReleaseContext,
  vcs: &'a dyn VersionControl,
}

impl<'a> ReleaseRecorder<'a> {
  pub fn new(ctx: &'a ReleaseContext, vcs: &'a dyn VersionControl) -> Self {
    Self { ctx, vcs }
  }

  /// Commit pending changes, then create the release tag
  pub fn record_tag(&self, force: bool) -> RailResult<TagOutcome> {
    let tag = self.ctx.tag();
    if !tag.is_ref_safe() {
      tracing::warn!(tag = %tag, "release tag contains characters outside [A-Za-z0-9_]");
    }

    let message = format!("Release {}", self.ctx.metadata.full_version());
    let committed = self.vcs.commit_all(&message)?;
    self.vcs.create_tag(tag.as_str(), &message, force)?;
    tracing::info!(tag = %tag, committed, force, "tagged release");

    Ok(TagOutcome { tag, committed })
  }

  /// Render the changelog from history and commit only that document
  pub fn regenerate_changelog(&self) -> RailResult<ChangelogOutcome> {
    let rel = self.ctx.config.vcs.changelog.clone();
    let path = self.ctx.root.join(&rel);

    let content = if self.ctx.config.vcs.changelog_command.is_empty() {
      let history = self.vcs.history()?;
      tracing::debug!(commits = history.len(), "rendering changelog from history");
      changelog::render(&history).into_bytes()
    } else {
      external::capture(&self.ctx.root, &self.ctx.config.vcs.changelog_command)?
    };

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    let message = changelog::commit_message(Utc::now().date_naive());
    let committed = self.vcs.commit_path(&rel, &message)?;
    tracing::info!(path = %path.display(), committed, "regenerated changelog");

    Ok(ChangelogOutcome { path, committed })
  }

  /// Changelog first, then tag, so the tag covers the regenerated document
  pub fn record(&self, force: bool) -> RailResult<(ChangelogOutcome, TagOutcome)> {
    let changelog = self.regenerate_changelog()?;
    let tag = self.record_tag(force)?;
    Ok((changelog, tag))
  }
}
