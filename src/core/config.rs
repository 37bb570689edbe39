use crate::core::error::{ConfigError, RailError, RailResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for rpm-rail
/// Searched in order: rpm-rail.toml, .rpm-rail.toml, .config/rpm-rail.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RailConfig {
  #[serde(default)]
  pub package: PackageConfig,
  #[serde(default)]
  pub manifest: ManifestConfig,
  #[serde(default)]
  pub vcs: VcsConfig,
  #[serde(default)]
  pub builder: BuilderConfig,
  #[serde(default)]
  pub build: CommandConfig,
  #[serde(default)]
  pub verify: CommandConfig,
  #[serde(default)]
  pub clean: CleanConfig,
  #[serde(default)]
  pub install: InstallConfig,
}

/// Where the package metadata comes from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageConfig {
  /// Descriptor document (RPM spec). Defaults to the only `*.spec` in the root.
  #[serde(default)]
  pub descriptor: Option<PathBuf>,

  /// Package name. Defaults to the descriptor's `Name:` tag.
  #[serde(default)]
  pub name: Option<String>,
}

/// Fixed file list for copy-mode staging
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestConfig {
  /// Paths or glob patterns relative to the project root, copied in order
  #[serde(default)]
  pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsConfig {
  /// Subdirectory of the repository exported as the package module ("" = whole tree)
  #[serde(default)]
  pub module: PathBuf,

  /// Changelog document regenerated from history
  #[serde(default = "default_changelog")]
  pub changelog: PathBuf,

  /// External log-to-changelog converter; its stdout becomes the changelog
  #[serde(default)]
  pub changelog_command: Vec<String>,

  /// Move an existing release tag instead of failing
  #[serde(default)]
  pub tag_force: bool,
}

fn default_changelog() -> PathBuf {
  PathBuf::from("ChangeLog")
}

impl Default for VcsConfig {
  fn default() -> Self {
    Self {
      module: PathBuf::new(),
      changelog: default_changelog(),
      changelog_command: Vec::new(),
      tag_force: false,
    }
  }
}

/// External package builder invoked on the archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
  #[serde(default = "default_builder_command")]
  pub command: String,
  #[serde(default = "default_builder_args")]
  pub args: Vec<String>,
}

fn default_builder_command() -> String {
  "rpmbuild".to_string()
}

fn default_builder_args() -> Vec<String> {
  vec!["-ta".to_string()]
}

impl Default for BuilderConfig {
  fn default() -> Self {
    Self {
      command: default_builder_command(),
      args: default_builder_args(),
    }
  }
}

/// An opaque external command (argv form, run from the project root)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandConfig {
  #[serde(default)]
  pub command: Vec<String>,
}

impl CommandConfig {
  pub fn is_configured(&self) -> bool {
    !self.command.is_empty()
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanConfig {
  /// Transient byte-compiled artifacts removed by `clean`
  #[serde(default = "default_clean_patterns")]
  pub patterns: Vec<String>,
}

fn default_clean_patterns() -> Vec<String> {
  vec!["*.pyc".to_string(), "*.pyo".to_string(), "*~".to_string()]
}

impl Default for CleanConfig {
  fn default() -> Self {
    Self {
      patterns: default_clean_patterns(),
    }
  }
}

/// File sets copied by `install`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallConfig {
  #[serde(default)]
  pub bin: Vec<String>,
  #[serde(default)]
  pub lib: Vec<String>,
  #[serde(default)]
  pub etc: Vec<String>,
  /// Default BINDIR (fallback: /usr/bin)
  #[serde(default)]
  pub bindir: Option<PathBuf>,
  /// Default LIBDIR (fallback: /usr/share/<name>)
  #[serde(default)]
  pub libdir: Option<PathBuf>,
  /// Default ETCDIR (fallback: /etc/<name>)
  #[serde(default)]
  pub etcdir: Option<PathBuf>,
}

impl RailConfig {
  /// Find config file in search order: rpm-rail.toml, .rpm-rail.toml, .config/rpm-rail.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("rpm-rail.toml"),
      path.join(".rpm-rail.toml"),
      path.join(".config").join("rpm-rail.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no file exists
  pub fn load(root: &Path, explicit: Option<&Path>) -> RailResult<Self> {
    let config_path = match explicit {
      Some(path) => Some(path.to_path_buf()),
      None => Self::find_config_path(root),
    };

    let Some(config_path) = config_path else {
      tracing::debug!(root = %root.display(), "no rpm-rail.toml found, using defaults");
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: RailConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;
    tracing::debug!(path = %config_path.display(), "loaded config");

    Ok(config)
  }

  /// Resolve the descriptor path, discovering the single `*.spec` in `root` if unset
  pub fn descriptor_path(&self, root: &Path) -> RailResult<PathBuf> {
    if let Some(descriptor) = &self.package.descriptor {
      return Ok(root.join(descriptor));
    }

    let mut candidates: Vec<PathBuf> = fs::read_dir(root)
      .with_context(|| format!("Failed to list {}", root.display()))?
      .filter_map(Result::ok)
      .map(|entry| entry.path())
      .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "spec"))
      .collect();
    candidates.sort();

    match candidates.len() {
      0 => Err(RailError::Config(ConfigError::DescriptorNotFound {
        root: root.to_path_buf(),
      })),
      1 => Ok(candidates.remove(0)),
      _ => Err(RailError::Config(ConfigError::AmbiguousDescriptor { candidates })),
    }
  }
}
