//! Staging directory → `<name>-<version>.tar.bz2`
//!
//! The tarball is written first, then compressed to the final name, then the
//! intermediate `.tar` and the staging directory are removed. A failure at any
//! step leaves the staging directory untouched.

use crate::core::context::ReleaseContext;
use crate::core::error::{PipelineError, RailError, RailResult};
use bzip2::Compression;
use bzip2::write::BzEncoder;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

/// Result of a successful archive run
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveReport {
  pub path: PathBuf,
  /// Number of tar entries, including the top-level directory
  pub entries: usize,
  pub sha256: String,
}

pub trait Archiver {
  fn archive(&self, ctx: &ReleaseContext) -> RailResult<ArchiveReport>;
}

/// tar + bzip2 at maximum compression
#[derive(Debug, Clone, Default)]
pub struct TarBz2Archiver {
  /// Fixed mtime for every entry; file mtimes are used when unset
  pub mtime: Option<u64>,
}

impl TarBz2Archiver {
  /// Honour `SOURCE_DATE_EPOCH` for reproducible archives
  pub fn from_env() -> Self {
    let mtime = match std::env::var("SOURCE_DATE_EPOCH") {
      Ok(value) => match value.trim().parse::<u64>() {
        Ok(epoch) => Some(epoch),
        Err(_) => {
          tracing::warn!(value = %value, "ignoring unparsable SOURCE_DATE_EPOCH");
          None
        }
      },
      Err(_) => None,
    };
    Self { mtime }
  }
}

impl Archiver for TarBz2Archiver {
  fn archive(&self, ctx: &ReleaseContext) -> RailResult<ArchiveReport> {
    let staging = ctx.staging_dir();
    let tar_path = ctx.tar_path();
    let archive_path = ctx.archive_path();
    let prefix = ctx.metadata.stem();

    let entries = write_tar(&staging, &prefix, &tar_path, self.mtime).map_err(|e| write_error(&tar_path, e))?;
    tracing::debug!(path = %tar_path.display(), entries, "wrote tarball");

    compress(&tar_path, &archive_path).map_err(|e| write_error(&archive_path, e))?;
    let sha256 = sha256_file(&archive_path).map_err(|e| write_error(&archive_path, e))?;

    fs::remove_file(&tar_path).map_err(|e| write_error(&tar_path, e))?;
    fs::remove_dir_all(&staging).map_err(|e| write_error(&staging, e))?;

    tracing::info!(path = %archive_path.display(), entries, sha256 = %sha256, "archive ready");
    Ok(ArchiveReport {
      path: archive_path,
      entries,
      sha256,
    })
  }
}

fn write_error(path: &Path, source: io::Error) -> RailError {
  RailError::Pipeline(PipelineError::ArchiveWriteError {
    path: path.to_path_buf(),
    source,
  })
}

/// Write every entry of `src_dir` under `prefix/` in sorted path order
fn write_tar(src_dir: &Path, prefix: &str, out_path: &Path, mtime: Option<u64>) -> io::Result<usize> {
  if !src_dir.is_dir() {
    return Err(io::Error::new(
      io::ErrorKind::NotFound,
      format!("staging directory {} does not exist", src_dir.display()),
    ));
  }

  let out = BufWriter::new(File::create(out_path)?);
  let mut builder = tar::Builder::new(out);

  // WalkDir yields the root itself first; sort the rest deterministically
  let mut paths: Vec<PathBuf> = Vec::new();
  for entry in WalkDir::new(src_dir).follow_links(false) {
    paths.push(entry?.into_path());
  }
  paths.sort_by(|a, b| {
    let ra = a.strip_prefix(src_dir).unwrap_or(a).to_string_lossy();
    let rb = b.strip_prefix(src_dir).unwrap_or(b).to_string_lossy();
    ra.cmp(&rb)
  });

  for path in &paths {
    let rel = path.strip_prefix(src_dir).map_err(io::Error::other)?;
    let name = if rel.as_os_str().is_empty() {
      prefix.to_string()
    } else {
      format!("{}/{}", prefix, rel.to_string_lossy().replace('\\', "/"))
    };

    let md = fs::symlink_metadata(path)?;
    let mut header = tar::Header::new_gnu();
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(mtime.unwrap_or_else(|| file_mtime(&md)));
    header.set_mode(file_mode(&md));

    if md.file_type().is_symlink() {
      header.set_entry_type(tar::EntryType::Symlink);
      header.set_size(0);
      builder.append_link(&mut header, &name, fs::read_link(path)?)?;
    } else if md.is_dir() {
      header.set_entry_type(tar::EntryType::Directory);
      header.set_size(0);
      header.set_cksum();
      builder.append_data(&mut header, &name, io::empty())?;
    } else {
      header.set_entry_type(tar::EntryType::Regular);
      header.set_size(md.len());
      header.set_cksum();
      builder.append_data(&mut header, &name, File::open(path)?)?;
    }
  }

  let mut out = builder.into_inner()?;
  out.flush()?;
  Ok(paths.len())
}

/// bzip2 `tar_path` into `out_path` at the best compression level
fn compress(tar_path: &Path, out_path: &Path) -> io::Result<()> {
  let mut input = BufReader::new(File::open(tar_path)?);
  let out = File::create(out_path)?;
  let mut encoder = BzEncoder::new(out, Compression::best());
  io::copy(&mut input, &mut encoder)?;
  encoder.finish()?.sync_all()?;
  Ok(())
}

pub fn sha256_file(path: &Path) -> io::Result<String> {
  let mut hasher = Sha256::new();
  io::copy(&mut BufReader::new(File::open(path)?), &mut hasher)?;
  Ok(format!("{:x}", hasher.finalize()))
}

fn file_mtime(md: &fs::Metadata) -> u64 {
  md.modified()
    .ok()
    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
    .map(|d| d.as_secs())
    .unwrap_or(0)
}

fn file_mode(md: &fs::Metadata) -> u32 {
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    md.permissions().mode() & 0o7777
  }
  #[cfg(not(unix))]
  {
    if md.is_dir() { 0o755 } else { 0o644 }
  }
}
