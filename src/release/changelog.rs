//! GNU-style changelog rendered from version control history
//!
//! ```text
//! 2025-01-15  Jane Doe  <jane@example.com>
//!
//! 	* Fix the thing
//!
//! 	  Longer body
//! ```
//!
//! Consecutive commits by the same author on the same day share one heading.
//! Commits created by the changelog regeneration itself are skipped.

use crate::core::vcs::CommitInfo;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt::Write;

/// Prefix of the commit message used when committing a regenerated changelog
pub const GENERATED_MARKER: &str = "Generated by rpm-rail changelog";

pub fn commit_message(date: NaiveDate) -> String {
  format!("{} on {}", GENERATED_MARKER, date.format("%Y-%m-%d"))
}

pub fn is_generated(commit: &CommitInfo) -> bool {
  commit.summary().starts_with(GENERATED_MARKER)
}

fn commit_date(commit: &CommitInfo) -> NaiveDate {
  DateTime::<Utc>::from_timestamp(commit.timestamp, 0)
    .unwrap_or_default()
    .date_naive()
}

/// Render `history` (newest first) as a GNU changelog
pub fn render(history: &[CommitInfo]) -> String {
  let mut out = String::new();
  let mut heading: Option<(NaiveDate, &str, &str)> = None;

  for commit in history.iter().filter(|c| !is_generated(c)) {
    let key = (commit_date(commit), commit.author.as_str(), commit.author_email.as_str());

    if heading != Some(key) {
      if heading.is_some() {
        out.push('\n');
      }
      let _ = writeln!(out, "{}  {}  <{}>", key.0.format("%Y-%m-%d"), key.1, key.2);
      heading = Some(key);
    }

    out.push('\n');
    let mut lines = commit.message.lines();
    let _ = writeln!(out, "\t* {}", lines.next().unwrap_or("").trim_end());
    for line in lines {
      if line.trim().is_empty() {
        out.push('\n');
      } else {
        let _ = writeln!(out, "\t  {}", line.trim_end());
      }
    }
  }

  out
}
