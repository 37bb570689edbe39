//! Opaque external commands (build, verify, changelog converter)
//!
//! Commands are configured in argv form and run from the project root. Their
//! output is never reinterpreted: stdout/stderr are inherited unless the
//! caller needs stdout as data.

use crate::core::error::{PipelineError, RailError, RailResult};
use std::path::Path;
use std::process::{Command, Stdio};

/// Render argv for messages (`rpmbuild -ta pkg-1.0.tar.bz2`)
pub fn display_command(argv: &[String]) -> String {
  argv.join(" ")
}

fn command(root: &Path, argv: &[String]) -> RailResult<Command> {
  let (program, args) = argv
    .split_first()
    .ok_or_else(|| RailError::message("Empty command line"))?;
  let mut cmd = Command::new(program);
  cmd.current_dir(root).args(args);
  Ok(cmd)
}

fn spawn_error(argv: &[String], err: std::io::Error) -> RailError {
  RailError::with_help(
    format!("Failed to execute {}: {}", display_command(argv), err),
    "Check that the program is installed and on PATH.",
  )
}

/// Run with inherited stdio; nonzero exit → `ExternalFailed`
pub fn run(root: &Path, argv: &[String]) -> RailResult<()> {
  tracing::debug!(command = %display_command(argv), "running external command");
  let status = command(root, argv)?.status().map_err(|e| spawn_error(argv, e))?;

  if !status.success() {
    return Err(RailError::Pipeline(PipelineError::ExternalFailed {
      command: display_command(argv),
      code: status.code(),
    }));
  }
  Ok(())
}

/// Run and capture stdout; stderr stays on the terminal
pub fn capture(root: &Path, argv: &[String]) -> RailResult<Vec<u8>> {
  tracing::debug!(command = %display_command(argv), "capturing external command");
  let output = command(root, argv)?
    .stdin(Stdio::null())
    .stderr(Stdio::inherit())
    .output()
    .map_err(|e| spawn_error(argv, e))?;

  if !output.status.success() {
    return Err(RailError::Pipeline(PipelineError::ExternalFailed {
      command: display_command(argv),
      code: output.status.code(),
    }));
  }
  Ok(output.stdout)
}
