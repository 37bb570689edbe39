//! Release context - resolve once, pass everywhere
//!
//! # Design
//!
//! Every stage derives its paths from the same `{root, metadata}` pair instead
//! of a process-wide staging path. `ReleaseContext` is built once in main.rs
//! and passed by reference to each stage.
//!
//! ```text
//! main.rs:
//!   ReleaseContext::build() -> &ReleaseContext
//!   |
//!   v
//! dist/staging.rs, dist/archive.rs, release/recorder.rs:
//!   fn stage(ctx: &ReleaseContext)
//! ```

use crate::core::config::RailConfig;
use crate::core::error::RailResult;
use crate::release::metadata::PackageMetadata;
use crate::release::tag::ReleaseTag;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared, immutable state for one pipeline run
#[derive(Clone)]
pub struct ReleaseContext {
  /// Project root (absolute path). All artifacts are created here.
  pub root: PathBuf,

  /// Metadata resolved from the descriptor
  pub metadata: PackageMetadata,

  /// rpm-rail.toml (or defaults)
  pub config: Arc<RailConfig>,
}

impl ReleaseContext {
  /// Load config and resolve package metadata for `root`
  pub fn build(root: &Path, config_path: Option<&Path>) -> RailResult<Self> {
    let config = RailConfig::load(root, config_path)?;
    Self::with_config(root, config)
  }

  /// Resolve package metadata using an already-loaded config
  pub fn with_config(root: &Path, config: RailConfig) -> RailResult<Self> {
    let descriptor = config.descriptor_path(root)?;
    let metadata = PackageMetadata::resolve(&descriptor, config.package.name.as_deref())?;

    Ok(Self {
      root: root.to_path_buf(),
      metadata,
      config: Arc::new(config),
    })
  }

  /// `<root>/<name>-<version>`
  pub fn staging_dir(&self) -> PathBuf {
    self.root.join(self.metadata.stem())
  }

  /// `<root>/<name>-<version>.tar`
  pub fn tar_path(&self) -> PathBuf {
    self.root.join(format!("{}.tar", self.metadata.stem()))
  }

  /// `<root>/<name>-<version>.tar.bz2`
  pub fn archive_path(&self) -> PathBuf {
    self.root.join(format!("{}.tar.bz2", self.metadata.stem()))
  }

  /// Version control tag for this release
  pub fn tag(&self) -> ReleaseTag {
    ReleaseTag::format(&self.metadata.version, &self.metadata.release)
  }

  /// Snapshot for `version --json`
  pub fn summary(&self) -> ReleaseSummary {
    ReleaseSummary {
      name: self.metadata.name.clone(),
      version: self.metadata.version.clone(),
      release: self.metadata.release.clone(),
      tag: self.tag().to_string(),
      staging_dir: self.staging_dir(),
      archive: self.archive_path(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ReleaseSummary {
  pub name: String,
  pub version: String,
  pub release: String,
  pub tag: String,
  pub staging_dir: PathBuf,
  pub archive: PathBuf,
}
