//! Target execution
//!
//! A target resolves to an ordered action list through the target graph. The
//! actions run one after another and the first failure ends the run. Partial
//! artifacts are left on disk.

use crate::commands::install::{self, InstallDirs};
use crate::core::context::{ReleaseContext, ReleaseSummary};
use crate::core::error::{RailError, RailResult};
use crate::core::vcs::{SystemGit, VersionControl};
use crate::dist::{
  Archiver, CopyPopulator, ExportPopulator, PackageBuilder, RpmBuild, SourcePopulator, TarBz2Archiver, staging,
};
use crate::graph::{Target, TargetGraph};
use crate::release::ReleaseRecorder;
use crate::release::recorder::{ChangelogOutcome, TagOutcome};
use serde::Serialize;

/// Knobs shared by every target
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
  pub dry_run: bool,
  pub json: bool,
  /// Move an existing release tag
  pub force_tag: bool,
  pub install: InstallDirs,
}

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
  target: Target,
  steps: &'a [Target],
  #[serde(skip_serializing_if = "Option::is_none")]
  release: Option<ReleaseSummary>,
}

/// Print the action list for `target` without running anything
pub fn show_plan(target: Target, ctx: Option<&ReleaseContext>, json: bool) -> RailResult<()> {
  let graph = TargetGraph::new();
  let steps = graph.plan(target);

  if json {
    let output = PlanOutput {
      target,
      steps: &steps,
      release: ctx.map(ReleaseContext::summary),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    return Ok(());
  }

  println!("📋 Plan for '{}'", target);
  if let Some(ctx) = ctx {
    println!("   {} {} (tag {})", ctx.metadata.name, ctx.metadata.full_version(), ctx.tag());
  }
  println!();
  for (i, step) in steps.iter().enumerate() {
    println!("  {}. {}", i + 1, step);
  }

  let dependents = graph.dependents(target);
  if !dependents.is_empty() {
    let names: Vec<&str> = dependents.iter().map(|t| t.name()).collect();
    println!();
    println!("   Also run by: {}", names.join(", "));
  }
  Ok(())
}

/// Runs planned actions against one release context
pub struct Pipeline<'a> {
  ctx: &'a ReleaseContext,
  options: PipelineOptions,
  vcs: Option<Box<dyn VersionControl + 'a>>,
  archiver: Box<dyn Archiver + 'a>,
  builder: Box<dyn PackageBuilder + 'a>,
}

impl<'a> Pipeline<'a> {
  /// Production wiring: system git, tar.bz2, configured builder
  pub fn new(ctx: &'a ReleaseContext, options: PipelineOptions) -> Self {
    Self {
      ctx,
      options,
      vcs: None,
      archiver: Box::new(TarBz2Archiver::from_env()),
      builder: Box::new(RpmBuild::from_config(&ctx.config.builder)),
    }
  }

  #[cfg(test)]
  pub fn with_vcs(mut self, vcs: Box<dyn VersionControl + 'a>) -> Self {
    self.vcs = Some(vcs);
    self
  }

  #[cfg(test)]
  pub fn with_archiver(mut self, archiver: Box<dyn Archiver + 'a>) -> Self {
    self.archiver = archiver;
    self
  }

  #[cfg(test)]
  pub fn with_builder(mut self, builder: Box<dyn PackageBuilder + 'a>) -> Self {
    self.builder = builder;
    self
  }

  /// Opened on first use so copy-mode targets work outside a repository
  fn vcs(&mut self) -> RailResult<&dyn VersionControl> {
    if self.vcs.is_none() {
      self.vcs = Some(Box::new(SystemGit::open(&self.ctx.root)?));
    }
    self
      .vcs
      .as_deref()
      .map(|vcs| vcs as &dyn VersionControl)
      .ok_or_else(|| RailError::message("Version control is unavailable"))
  }

  /// Resolve `target` and run its actions in order; returns the actions run
  pub fn run(&mut self, target: Target) -> RailResult<Vec<Target>> {
    if self.options.dry_run {
      show_plan(target, Some(self.ctx), self.options.json)?;
      return Ok(Vec::new());
    }

    let steps = TargetGraph::new().plan(target);
    tracing::debug!(goal = %target, steps = ?steps, "resolved plan");

    let mut remaining = steps.as_slice();
    while let Some((step, rest)) = remaining.split_first() {
      // changelog immediately followed by tag is one release recording
      if let (Target::Changelog, [Target::Tag, after @ ..]) = (step, rest) {
        let _span = tracing::info_span!("stage", name = "record").entered();
        self.record_release()?;
        remaining = after;
        continue;
      }
      let _span = tracing::info_span!("stage", name = %step).entered();
      self.run_action(*step)?;
      remaining = rest;
    }

    if steps.len() > 1 {
      println!("✅ {} complete", target);
    }
    Ok(steps)
  }

  fn record_release(&mut self) -> RailResult<()> {
    let ctx = self.ctx;
    let force = self.options.force_tag || ctx.config.vcs.tag_force;
    let vcs = self.vcs()?;
    let (changelog, tag) = ReleaseRecorder::new(ctx, vcs).record(force)?;
    print_changelog(ctx, &changelog);
    print_tag(ctx, &tag);
    Ok(())
  }

  fn run_action(&mut self, action: Target) -> RailResult<()> {
    let ctx = self.ctx;
    match action {
      Target::Build => {
        if install::build(ctx)? {
          println!("✅ Build finished");
        } else {
          println!("⏭️  No [build] command configured, skipping");
        }
      }
      Target::InstallFiles => {
        let copied = install::install_files(ctx, &self.options.install)?;
        println!("📥 Installed {} files", copied);
      }
      Target::Clean => {
        let removed = install::clean(ctx)?;
        println!("🧹 Removed {} transient files", removed.len());
      }
      Target::Verify => {
        install::verify(ctx)?;
        println!("✅ Verification passed");
      }
      Target::Changelog => {
        let vcs = self.vcs()?;
        let outcome = ReleaseRecorder::new(ctx, vcs).regenerate_changelog()?;
        print_changelog(ctx, &outcome);
      }
      Target::Tag => {
        let force = self.options.force_tag || ctx.config.vcs.tag_force;
        let vcs = self.vcs()?;
        let outcome = ReleaseRecorder::new(ctx, vcs).record_tag(force)?;
        print_tag(ctx, &outcome);
      }
      Target::CleanDist => {
        let removed = staging::clean(ctx)?;
        if !removed.is_empty() {
          println!("🧹 Removed {} stale artifacts", removed.len());
        }
      }
      Target::LocalCopy => {
        let dir = staging::create(ctx)?;
        let populator = CopyPopulator::from_context(ctx)?;
        let files = populator.populate(ctx, &dir)?;
        println!("📂 Staged {} files into {}/ ({})", files, ctx.metadata.stem(), populator.mode());
      }
      Target::Export => {
        let dir = ctx.staging_dir();
        let vcs = self.vcs()?;
        let populator = ExportPopulator::new(vcs);
        let entries = populator.populate(ctx, &dir)?;
        println!(
          "📦 Exported {} entries from {} into {}/ ({})",
          entries,
          ctx.tag(),
          ctx.metadata.stem(),
          populator.mode()
        );
      }
      Target::Tar => {
        let report = self.archiver.archive(ctx)?;
        let name = report.path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        println!("🗜️  Created {} ({} entries)", name, report.entries);
        println!("   sha256 {}", report.sha256);
      }
      Target::BuildRpm => {
        let archive = ctx.archive_path();
        println!("🔨 Building package from {}", archive.display());
        self.builder.build(&archive)?;
        println!("✅ Package build finished");
      }
      Target::Install | Target::LocalDist | Target::Dist | Target::LocalRpm | Target::Rpm => {
        tracing::debug!(action = %action, "composite target has no action of its own");
      }
    }
    Ok(())
  }
}

fn print_changelog(ctx: &ReleaseContext, outcome: &ChangelogOutcome) {
  let state = if outcome.committed { "committed" } else { "unchanged" };
  println!("📝 Regenerated {} ({})", ctx.config.vcs.changelog.display(), state);
}

fn print_tag(ctx: &ReleaseContext, outcome: &TagOutcome) {
  if outcome.committed {
    println!("💾 Committed pending changes for {}", ctx.metadata.full_version());
  }
  println!("🏷️  Tagged {}", outcome.tag);
}
