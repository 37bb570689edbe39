//! Hand the archive to the external package builder (`rpmbuild -ta`)

use crate::core::config::BuilderConfig;
use crate::core::error::{PipelineError, RailError, RailResult};
use std::path::Path;
use std::process::Command;

pub trait PackageBuilder {
  fn build(&self, archive: &Path) -> RailResult<()>;
}

/// Build-from-tarball invocation: `<command> <args...> <archive>`
///
/// Output is inherited so the builder's diagnostics reach the user verbatim.
#[derive(Debug, Clone)]
pub struct RpmBuild {
  pub command: String,
  pub args: Vec<String>,
}

impl RpmBuild {
  pub fn from_config(config: &BuilderConfig) -> Self {
    Self {
      command: config.command.clone(),
      args: config.args.clone(),
    }
  }

  /// Command line as shown to the user
  pub fn command_line(&self, archive: &Path) -> String {
    let mut parts = vec![self.command.clone()];
    parts.extend(self.args.iter().cloned());
    parts.push(archive.display().to_string());
    parts.join(" ")
  }
}

impl PackageBuilder for RpmBuild {
  fn build(&self, archive: &Path) -> RailResult<()> {
    if !archive.is_file() {
      return Err(RailError::with_help(
        format!("Archive not found: {}", archive.display()),
        "Run `rpm-rail localdist` or `rpm-rail dist` first.",
      ));
    }

    let line = self.command_line(archive);
    tracing::info!(command = %line, "invoking package builder");

    let status = Command::new(&self.command)
      .args(&self.args)
      .arg(archive)
      .status()
      .map_err(|e| {
        RailError::with_help(
          format!("Failed to execute {}: {}", self.command, e),
          "Install rpm-build or point [builder] command at your package builder.",
        )
      })?;

    if !status.success() {
      return Err(RailError::Pipeline(PipelineError::BuildFailed {
        command: line,
        code: status.code(),
      }));
    }
    Ok(())
  }
}
