//! Progress indicators for file-heavy stages
//!
//! Uses `linya` for allocation-free progress bars. Bars are only drawn when
//! stderr is a terminal, so piped and CI output stays clean.

use linya::{Bar, Progress};
use std::io::IsTerminal;

/// Progress bar wrapper for file operations (staging copies, exports)
pub struct FileProgress {
  inner: Option<(Progress, Bar)>,
}

impl FileProgress {
  /// Create a new progress bar; a no-op when stderr is not a terminal or `total` is 0
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    if total == 0 || !std::io::stderr().is_terminal() {
      return Self { inner: None };
    }
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self {
      inner: Some((progress, bar)),
    }
  }

  /// Increment progress by 1
  pub fn inc(&mut self) {
    if let Some((progress, bar)) = self.inner.as_mut() {
      progress.inc_and_draw(bar, 1);
    }
  }
}
