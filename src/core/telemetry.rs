//! Tracing initialisation
//!
//! Diagnostics go to stderr so stdout carries only status lines and JSON.
//! `RUST_LOG` wins over `-v`.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Map repeated `-v` flags to a default level
pub fn level_for(verbosity: u8) -> Level {
  match verbosity {
    0 => Level::WARN,
    1 => Level::INFO,
    _ => Level::DEBUG,
  }
}

/// Install the global subscriber; later calls are ignored
pub fn init_tracing(verbosity: u8) {
  let level = level_for(verbosity);
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

  tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
    .try_init()
    .ok();
}
