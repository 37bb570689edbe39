//! Terminal feedback

pub mod progress;
