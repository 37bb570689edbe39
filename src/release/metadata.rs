//! Package metadata resolution from the RPM spec descriptor
//!
//! The descriptor is the single source of truth for every artifact name.
//! Only the preamble tags we need are read; token syntax is not validated.

use crate::core::error::{PipelineError, RailError, RailResult, ResultExt};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Name, version and release of the package being released
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
  pub name: String,
  pub version: String,
  pub release: String,
}

impl PackageMetadata {
  /// Read metadata from a descriptor file
  ///
  /// `name_override` wins over the descriptor's `Name:` tag.
  pub fn resolve(descriptor: &Path, name_override: Option<&str>) -> RailResult<Self> {
    let content =
      fs::read_to_string(descriptor).with_context(|| format!("Failed to read descriptor {}", descriptor.display()))?;
    let tags = scan_preamble(&content);

    let field = |key: &str| -> RailResult<String> {
      tags.get(key).cloned().ok_or_else(|| {
        RailError::Pipeline(PipelineError::MetadataMissing {
          descriptor: descriptor.to_path_buf(),
          field: key.to_string(),
        })
      })
    };

    let name = match name_override {
      Some(name) => name.to_string(),
      None => field("name")?,
    };
    let metadata = Self {
      name,
      version: field("version")?,
      release: field("release")?,
    };
    tracing::debug!(
      descriptor = %descriptor.display(),
      name = %metadata.name,
      version = %metadata.version,
      release = %metadata.release,
      "resolved package metadata"
    );
    Ok(metadata)
  }

  /// `<name>-<version>`: stem shared by the staging directory and the archive
  pub fn stem(&self) -> String {
    format!("{}-{}", self.name, self.version)
  }

  /// `<version>-<release>`
  pub fn full_version(&self) -> String {
    format!("{}-{}", self.version, self.release)
  }
}

/// Collect the first `Name:`, `Version:` and `Release:` values (lowercased keys)
fn scan_preamble(content: &str) -> HashMap<&'static str, String> {
  let mut macros: HashMap<String, String> = HashMap::new();
  let mut tags: HashMap<&'static str, String> = HashMap::new();

  for line in content.lines() {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix("%define").or_else(|| line.strip_prefix("%global")) {
      let mut parts = rest.split_whitespace();
      if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
        let value = expand_macros(value, &macros);
        macros.insert(key.to_string(), value);
      }
      continue;
    }

    let Some((key, value)) = line.split_once(':') else {
      continue;
    };
    let key = match key.trim().to_ascii_lowercase().as_str() {
      "name" => "name",
      "version" => "version",
      "release" => "release",
      _ => continue,
    };
    if tags.contains_key(key) {
      continue;
    }
    let Some(token) = value.split_whitespace().next() else {
      continue;
    };

    let token = expand_macros(token, &macros);
    // Tags are also usable as macros further down, like rpm does
    macros.entry(key.to_string()).or_insert_with(|| token.clone());
    tags.insert(key, token);
  }

  tags
}

/// Expand macro references from already-seen definitions, as rpm does
///
/// - `%{name}`, `%name`: the definition; unknown ones are kept verbatim
/// - `%{?name}`: the definition, or nothing when undefined
/// - `%{?name:text}` / `%{!?name:text}`: `text` when defined / undefined
/// - `%{nil}`: nothing
///
/// Shell (`%(...)`) and expression (`%[...]`) forms are not evaluated.
fn expand_macros(value: &str, macros: &HashMap<String, String>) -> String {
  let mut out = String::with_capacity(value.len());
  let mut rest = value;

  while let Some(pos) = rest.find('%') {
    out.push_str(&rest[..pos]);
    let after = &rest[pos + 1..];

    if let Some(braced) = after.strip_prefix('{')
      && let Some(end) = closing_brace(braced)
    {
      match expand_braced(&braced[..end], macros) {
        Some(expansion) => out.push_str(&expansion),
        None => out.push_str(&rest[pos..pos + 2 + end + 1]),
      }
      rest = &braced[end + 1..];
      continue;
    }

    let ident_len = after
      .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
      .unwrap_or(after.len());
    let key = &after[..ident_len];
    match macros.get(key) {
      Some(expansion) if !key.is_empty() => out.push_str(expansion),
      _ => out.push_str(&rest[pos..pos + 1 + ident_len]),
    }
    rest = &after[ident_len..];
  }

  out.push_str(rest);
  out
}

/// Body of a `%{...}` reference; `None` leaves an unknown plain macro as written
fn expand_braced(body: &str, macros: &HashMap<String, String>) -> Option<String> {
  let (negated, conditional) = match body.strip_prefix("!?") {
    Some(rest) => (true, Some(rest)),
    None => (false, body.strip_prefix('?')),
  };

  let Some(conditional) = conditional else {
    if body == "nil" {
      return Some(String::new());
    }
    return macros.get(body).cloned();
  };

  let (key, text) = match conditional.split_once(':') {
    Some((key, text)) => (key, Some(text)),
    None => (conditional, None),
  };
  let definition = macros.get(key);

  let expansion = match (negated, text) {
    (false, None) => definition.cloned().unwrap_or_default(),
    (true, None) => String::new(),
    (false, Some(text)) if definition.is_some() => expand_macros(text, macros),
    (true, Some(text)) if definition.is_none() => expand_macros(text, macros),
    _ => String::new(),
  };
  Some(expansion)
}

/// Byte offset of the `}` closing an already-opened brace, honouring nesting
fn closing_brace(s: &str) -> Option<usize> {
  let mut depth = 1usize;
  for (i, c) in s.char_indices() {
    match c {
      '{' => depth += 1,
      '}' => {
        depth -= 1;
        if depth == 0 {
          return Some(i);
        }
      }
      _ => {}
    }
  }
  None
}
