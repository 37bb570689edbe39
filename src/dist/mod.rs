//! Distribution stages: staging → populate → archive → build

pub mod archive;
pub mod builder;
pub mod populate;
pub mod staging;

pub use archive::{Archiver, TarBz2Archiver};
pub use builder::{PackageBuilder, RpmBuild};
pub use populate::{CopyPopulator, ExportPopulator, SourcePopulator};
