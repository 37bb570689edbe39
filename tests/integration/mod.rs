//! Integration tests for rpm-rail
//!
//! Each test builds a throwaway packaging project in a git repository and
//! drives the compiled binary. The package builder is replaced by shell
//! built-ins so no rpmbuild installation is needed.

mod helpers;
mod test_install;
mod test_pipeline;
mod test_release;
