//! Release identity and recording
//!
//! # Core Invariants
//!
//! 1. **The descriptor names everything**
//!    - Name, version and release come from the RPM spec preamble
//!    - Staging directory, archive and tag are all derived from them
//!
//! 2. **Tags are labels, never inputs**
//!    - `V<version>_<release>` with `-`/`.` replaced by `_`
//!    - Nothing parses a tag back into metadata
//!
//! 3. **Tagging and changelog regeneration are independent**
//!    - Each is safe to re-run on its own
//!    - `rpm` runs changelog first so the tag covers it

pub mod changelog;
pub mod metadata;
pub mod recorder;
pub mod tag;

pub use recorder::ReleaseRecorder;
