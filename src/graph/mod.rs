//! Target ordering for the release pipeline
//!
//! Built on petgraph so composite targets (`rpm`, `localrpm`, `install`)
//! resolve to a flat, deduplicated action list.

pub mod targets;

pub use targets::{Target, TargetGraph};
