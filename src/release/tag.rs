//! Release tag naming
//!
//! Tags look like `V<version>_<release>` with every `-` and `.` turned into `_`,
//! e.g. version `0.51`, release `1mdk` becomes `V0_51_1mdk`. Tags are labels
//! only and are never parsed back into metadata.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseTag(String);

impl ReleaseTag {
  /// Build the tag for a version/release pair
  pub fn format(version: &str, release: &str) -> Self {
    let raw = format!("V{}_{}", version, release);
    Self(raw.replace(['-', '.'], "_"))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Whether the tag is made only of `[A-Za-z0-9_]`
  ///
  /// Other characters from the descriptor are passed through untouched and
  /// may be rejected or misread by the version control system.
  pub fn is_ref_safe(&self) -> bool {
    self.0.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
  }
}

impl fmt::Display for ReleaseTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
