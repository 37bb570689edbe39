//! CLI commands for rpm-rail
//!
//! ## Pipeline
//! - **pipeline**: Resolve a target through the target graph and run its actions
//!
//! ## Project glue
//! - **install**: build, install, clean and verify
//! - **version**: Print the resolved release
//!
//! All commands take `&ReleaseContext` so the descriptor is read once.

pub mod install;
pub mod pipeline;
pub mod version;

pub use install::InstallDirs;
pub use pipeline::{Pipeline, PipelineOptions, show_plan};
pub use version::run_version;
