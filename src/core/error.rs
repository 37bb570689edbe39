//! Error types for rpm-rail with contextual messages and exit codes
//!
//! Every pipeline stage fails fast: nothing here is recovered internally. The
//! error carries enough context for the user, and external tool failures keep
//! the tool's own exit status and diagnostics.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for rpm-rail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, missing descriptor fields, missing sources)
  User,
  /// System error (git, I/O)
  System,
  /// Propagated exit status of an external tool
  External(i32),
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    match self {
      ExitCode::User => 1,
      ExitCode::System => 2,
      ExitCode::External(code) => code,
    }
  }
}

/// Main error type for rpm-rail
#[derive(Debug)]
pub enum RailError {
  /// Configuration errors
  Config(ConfigError),

  /// Release pipeline stage errors
  Pipeline(PipelineError),

  /// Version control errors
  Vcs(VcsError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl RailError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RailError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    RailError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RailError::Message { message, context, help } => RailError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      RailError::Io(err) => RailError::Io(io::Error::new(err.kind(), format!("{}: {}", ctx_str, err))),
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      RailError::Config(_) => ExitCode::User,
      RailError::Pipeline(e) => e.exit_code(),
      RailError::Vcs(e) => e.exit_code(),
      RailError::Io(_) => ExitCode::System,
      RailError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      RailError::Config(e) => e.help_message(),
      RailError::Pipeline(e) => e.help_message(),
      RailError::Vcs(e) => e.help_message(),
      RailError::Message { help, .. } => help.clone(),
      RailError::Io(_) => None,
    }
  }
}

impl fmt::Display for RailError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RailError::Config(e) => write!(f, "{}", e),
      RailError::Pipeline(e) => write!(f, "{}", e),
      RailError::Vcs(e) => write!(f, "{}", e),
      RailError::Io(e) => write!(f, "I/O error: {}", e),
      RailError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for RailError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      RailError::Io(e) => Some(e),
      RailError::Pipeline(PipelineError::ArchiveWriteError { source, .. }) => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for RailError {
  fn from(err: io::Error) -> Self {
    RailError::Io(err)
  }
}

impl From<String> for RailError {
  fn from(msg: String) -> Self {
    RailError::message(msg)
  }
}

impl From<&str> for RailError {
  fn from(msg: &str) -> Self {
    RailError::message(msg)
  }
}

impl From<ConfigError> for RailError {
  fn from(err: ConfigError) -> Self {
    RailError::Config(err)
  }
}

impl From<PipelineError> for RailError {
  fn from(err: PipelineError) -> Self {
    RailError::Pipeline(err)
  }
}

impl From<VcsError> for RailError {
  fn from(err: VcsError) -> Self {
    RailError::Vcs(err)
  }
}

impl From<toml_edit::de::Error> for RailError {
  fn from(err: toml_edit::de::Error) -> Self {
    RailError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for RailError {
  fn from(err: serde_json::Error) -> Self {
    RailError::message(format!("JSON error: {}", err))
  }
}

impl From<glob::PatternError> for RailError {
  fn from(err: glob::PatternError) -> Self {
    RailError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<glob::GlobError> for RailError {
  fn from(err: glob::GlobError) -> Self {
    RailError::message(format!("Glob error: {}", err))
  }
}

impl From<walkdir::Error> for RailError {
  fn from(err: walkdir::Error) -> Self {
    RailError::message(format!("Directory walk error: {}", err))
  }
}

impl From<std::path::StripPrefixError> for RailError {
  fn from(err: std::path::StripPrefixError) -> Self {
    RailError::message(format!("Path strip prefix error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// No descriptor configured and none could be discovered
  DescriptorNotFound { root: PathBuf },

  /// More than one `.spec` file and none configured
  AmbiguousDescriptor { candidates: Vec<PathBuf> },

  /// Missing required field
  MissingField { field: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::DescriptorNotFound { .. } | ConfigError::AmbiguousDescriptor { .. } => {
        Some("Set `descriptor = \"<name>.spec\"` under [package] in rpm-rail.toml.".to_string())
      }
      ConfigError::MissingField { field } => Some(format!("Add `{}` to rpm-rail.toml.", field)),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::DescriptorNotFound { root } => {
        write!(f, "No package descriptor (*.spec) found in {}", root.display())
      }
      ConfigError::AmbiguousDescriptor { candidates } => {
        let names: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
        write!(f, "Multiple package descriptors found: {}", names.join(", "))
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field in config: {}", field)
      }
    }
  }
}

/// Release pipeline stage errors
#[derive(Debug)]
pub enum PipelineError {
  /// Descriptor lacks a version, release or name declaration
  MetadataMissing { descriptor: PathBuf, field: String },

  /// Staging directory exists and is not empty
  StagingConflict { path: PathBuf },

  /// Manifest entry matched nothing in the working tree
  SourceMissing { entry: String },

  /// Writing the tarball failed
  ArchiveWriteError { path: PathBuf, source: io::Error },

  /// The package builder exited nonzero
  BuildFailed { command: String, code: Option<i32> },

  /// A configured external command (build, verify, changelog converter) failed
  ExternalFailed { command: String, code: Option<i32> },
}

impl PipelineError {
  fn exit_code(&self) -> ExitCode {
    match self {
      PipelineError::BuildFailed { code, .. } | PipelineError::ExternalFailed { code, .. } => match code {
        Some(code) if *code != 0 => ExitCode::External(*code),
        _ => ExitCode::System,
      },
      PipelineError::ArchiveWriteError { .. } => ExitCode::System,
      _ => ExitCode::User,
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      PipelineError::MetadataMissing { field, .. } => Some(format!(
        "Add a `{}:` line to the descriptor preamble.",
        capitalize(field)
      )),
      PipelineError::StagingConflict { .. } => Some("Run `rpm-rail clean-dist` to remove stale staging output.".to_string()),
      PipelineError::SourceMissing { .. } => Some("Check the [manifest] files list in rpm-rail.toml.".to_string()),
      PipelineError::ArchiveWriteError { .. } => {
        Some("The staging directory was left in place for inspection.".to_string())
      }
      _ => None,
    }
  }
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

impl fmt::Display for PipelineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PipelineError::MetadataMissing { descriptor, field } => {
        write!(f, "No {} declaration found in {}", field, descriptor.display())
      }
      PipelineError::StagingConflict { path } => {
        write!(f, "Staging directory already exists and is not empty: {}", path.display())
      }
      PipelineError::SourceMissing { entry } => {
        write!(f, "Manifest entry matched no files: {}", entry)
      }
      PipelineError::ArchiveWriteError { path, source } => {
        write!(f, "Failed to write archive {}: {}", path.display(), source)
      }
      PipelineError::BuildFailed { command, code } => match code {
        Some(code) => write!(f, "Package build failed: {} exited with status {}", command, code),
        None => write!(f, "Package build failed: {} was terminated by a signal", command),
      },
      PipelineError::ExternalFailed { command, code } => match code {
        Some(code) => write!(f, "Command failed: {} exited with status {}", command, code),
        None => write!(f, "Command failed: {} was terminated by a signal", command),
      },
    }
  }
}

/// Version control errors
#[derive(Debug)]
pub enum VcsError {
  /// Git command failed
  CommandFailed {
    command: String,
    stderr: String,
    code: Option<i32>,
  },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Release tag does not exist
  TagNotFound { tag: String },

  /// Release tag already exists
  TagAlreadyExists { tag: String },

  /// Export target directory is not empty
  ExportConflict { path: PathBuf },

  /// Repository has no commits, so there is no history to render
  EmptyHistory { path: PathBuf },
}

impl VcsError {
  fn exit_code(&self) -> ExitCode {
    match self {
      VcsError::CommandFailed { code: Some(code), .. } if *code != 0 => ExitCode::External(*code),
      VcsError::CommandFailed { .. } | VcsError::RepoNotFound { .. } => ExitCode::System,
      _ => ExitCode::User,
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      VcsError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      VcsError::TagNotFound { tag } => Some(format!("Create it first with `rpm-rail tag` (expected tag {}).", tag)),
      VcsError::TagAlreadyExists { .. } => {
        Some("Bump Version/Release in the descriptor, or pass --force to move the tag.".to_string())
      }
      VcsError::ExportConflict { .. } => Some("Run `rpm-rail clean-dist` before exporting.".to_string()),
      VcsError::EmptyHistory { .. } => Some("Commit the package sources first.".to_string()),
      VcsError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for VcsError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VcsError::CommandFailed { command, stderr, .. } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      VcsError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      VcsError::TagNotFound { tag } => write!(f, "Tag not found: {}", tag),
      VcsError::TagAlreadyExists { tag } => write!(f, "Tag already exists: {}", tag),
      VcsError::ExportConflict { path } => {
        write!(f, "Export target is not empty: {}", path.display())
      }
      VcsError::EmptyHistory { path } => {
        write!(f, "Repository has no commits yet: {}", path.display())
      }
    }
  }
}

/// Result type alias for rpm-rail
pub type RailResult<T> = Result<T, RailError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> RailResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RailResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RailError>,
{
  fn context(self, ctx: impl Into<String>) -> RailResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> RailResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &RailError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for RailError {
  fn from(err: anyhow::Error) -> Self {
    RailError::message(err.to_string())
  }
}
