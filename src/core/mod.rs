//! Core engine for rpm-rail
//!
//! - **config**: rpm-rail.toml parsing and defaults
//! - **context**: Release context resolved once and passed to every stage
//! - **error**: Error types with contextual help and exit codes
//! - **external**: Opaque external commands (build, verify, changelog converter)
//! - **telemetry**: Tracing subscriber setup
//! - **vcs**: Version control abstraction (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod external;
pub mod telemetry;
pub mod vcs;
