//! `rpm-rail version` - print the release resolved from the descriptor

use crate::core::context::ReleaseContext;
use crate::core::error::RailResult;

pub fn run_version(ctx: &ReleaseContext, json: bool) -> RailResult<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(&ctx.summary())?);
  } else {
    println!("{}", ctx.metadata.full_version());
  }
  Ok(())
}
