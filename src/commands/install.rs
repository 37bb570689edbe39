//! `build`, `install`, `clean` and `verify`
//!
//! Thin glue around the configured commands and file sets. The distributed
//! sources themselves are opaque.

use crate::core::context::ReleaseContext;
use crate::core::error::{ConfigError, PipelineError, RailError, RailResult, ResultExt};
use crate::core::external;
use crate::utils::{copy_recursive, expand_pattern};
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Install prefixes after applying flags, environment and config
#[derive(Debug, Clone, Default)]
pub struct InstallDirs {
  pub destdir: Option<PathBuf>,
  pub bindir: Option<PathBuf>,
  pub libdir: Option<PathBuf>,
  pub etcdir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDirs {
  pub bindir: PathBuf,
  pub libdir: PathBuf,
  pub etcdir: PathBuf,
}

impl InstallDirs {
  /// Flags/environment first, then rpm-rail.toml, then `/usr/bin`, `/usr/share/<name>`, `/etc/<name>`
  pub fn resolve(&self, ctx: &ReleaseContext) -> ResolvedDirs {
    let install = &ctx.config.install;
    let name = &ctx.metadata.name;
    let pick = |flag: &Option<PathBuf>, config: &Option<PathBuf>, default: PathBuf| {
      flag.clone().or_else(|| config.clone()).unwrap_or(default)
    };

    ResolvedDirs {
      bindir: pick(&self.bindir, &install.bindir, PathBuf::from("/usr/bin")),
      libdir: pick(&self.libdir, &install.libdir, Path::new("/usr/share").join(name)),
      etcdir: pick(&self.etcdir, &install.etcdir, Path::new("/etc").join(name)),
    }
  }

  /// `DESTDIR` + `dir` (the absolute `dir` is re-rooted under `DESTDIR`)
  pub fn target(&self, dir: &Path) -> PathBuf {
    match &self.destdir {
      Some(destdir) => {
        let relative: PathBuf = dir
          .components()
          .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
          .collect();
        destdir.join(relative)
      }
      None => dir.to_path_buf(),
    }
  }
}

/// Run the configured build command; nothing to do when unset
pub fn build(ctx: &ReleaseContext) -> RailResult<bool> {
  if !ctx.config.build.is_configured() {
    tracing::debug!("no [build] command configured");
    return Ok(false);
  }
  external::run(&ctx.root, &ctx.config.build.command)?;
  Ok(true)
}

/// Run the configured static checker
pub fn verify(ctx: &ReleaseContext) -> RailResult<()> {
  if !ctx.config.verify.is_configured() {
    return Err(RailError::Config(ConfigError::MissingField {
      field: "verify.command".to_string(),
    }));
  }
  external::run(&ctx.root, &ctx.config.verify.command)
}

/// Copy the `[install]` file sets into their directories; returns files copied
pub fn install_files(ctx: &ReleaseContext, dirs: &InstallDirs) -> RailResult<usize> {
  let resolved = dirs.resolve(ctx);
  let install = &ctx.config.install;
  let mut copied = 0;

  for (patterns, dir) in [
    (&install.bin, &resolved.bindir),
    (&install.lib, &resolved.libdir),
    (&install.etc, &resolved.etcdir),
  ] {
    if patterns.is_empty() {
      continue;
    }
    let target = dirs.target(dir);
    fs::create_dir_all(&target).with_context(|| format!("Failed to create {}", target.display()))?;

    for pattern in patterns {
      let matches = expand_pattern(&ctx.root, pattern)?;
      if matches.is_empty() {
        return Err(RailError::Pipeline(PipelineError::SourceMissing { entry: pattern.clone() }));
      }
      for src in matches {
        let Some(file_name) = src.file_name() else {
          continue;
        };
        copied += copy_recursive(&src, &target.join(file_name), &[])
          .with_context(|| format!("Failed to install {} into {}", src.display(), target.display()))?;
      }
    }
    tracing::debug!(dir = %target.display(), "installed file set");
  }

  Ok(copied)
}

/// Remove files matching the `[clean]` patterns; returns files removed
pub fn clean(ctx: &ReleaseContext) -> RailResult<Vec<PathBuf>> {
  let mut removed = Vec::new();
  for pattern in &ctx.config.clean.patterns {
    for path in expand_pattern(&ctx.root, pattern)? {
      if path.is_file() {
        fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
        removed.push(path);
      }
    }
  }
  Ok(removed)
}
