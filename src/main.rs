mod commands;
mod core;
mod dist;
mod graph;
mod release;
mod ui;
mod utils;

use clap::{Args, Parser, Subcommand};
use commands::{InstallDirs, Pipeline, PipelineOptions};
use core::context::ReleaseContext;
use core::error::{RailError, RailResult, ResultExt, print_error};
use graph::Target;
use std::path::{Path, PathBuf};

/// Stage, archive, tag and build RPM packages from a spec file
#[derive(Parser)]
#[command(name = "rpm-rail")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Project root containing the spec file (default: current directory)
  #[arg(short = 'C', long, global = true)]
  directory: Option<PathBuf>,

  /// Config file (default: rpm-rail.toml in the project root)
  #[arg(long, global = true, env = "RPM_RAIL_CONFIG")]
  config: Option<PathBuf>,

  /// More diagnostics on stderr (-v info, -vv debug)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

/// Flags shared by targets that run several stages
#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
  /// Print the resolved stage list instead of running it
  #[arg(long)]
  dry_run: bool,
  /// With --dry-run, print the plan as JSON
  #[arg(long, requires = "dry_run")]
  json: bool,
}

/// Install prefixes; each also reads the same-named environment variable
#[derive(Args, Debug, Clone, Default)]
struct InstallArgs {
  /// Staging root prepended to every install directory
  #[arg(long, env = "DESTDIR")]
  destdir: Option<PathBuf>,
  #[arg(long, env = "BINDIR")]
  bindir: Option<PathBuf>,
  #[arg(long, env = "LIBDIR")]
  libdir: Option<PathBuf>,
  #[arg(long, env = "ETCDIR")]
  etcdir: Option<PathBuf>,
}

impl From<InstallArgs> for InstallDirs {
  fn from(args: InstallArgs) -> Self {
    InstallDirs {
      destdir: args.destdir,
      bindir: args.bindir,
      libdir: args.libdir,
      etcdir: args.etcdir,
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Project
  // ============================================================================
  /// Compile the distributed sources with the configured [build] command
  Build,

  /// Build, then copy file sets into BINDIR, LIBDIR and ETCDIR
  Install {
    #[command(flatten)]
    dirs: InstallArgs,
    #[command(flatten)]
    run: RunArgs,
  },

  /// Remove transient byte-compiled artifacts
  Clean,

  /// Run the configured static checker
  Verify,

  // ============================================================================
  // Distribution
  // ============================================================================
  /// Archive the working tree: clean-dist, copy manifest, tar
  #[command(name = "localdist", alias = "local-dist")]
  LocalDist {
    #[command(flatten)]
    run: RunArgs,
  },

  /// Archive the tagged release: clean-dist, export tag, tar
  Dist {
    #[command(flatten)]
    run: RunArgs,
  },

  /// Remove the staging directory and archives
  #[command(name = "clean-dist", alias = "cleandist")]
  CleanDist,

  /// Build the package from the existing archive
  #[command(name = "buildrpm", alias = "build-rpm")]
  BuildRpm,

  /// Test build: localdist, then buildrpm
  #[command(name = "localrpm", alias = "local-rpm")]
  LocalRpm {
    #[command(flatten)]
    run: RunArgs,
  },

  /// Release build: changelog, tag, dist, then buildrpm
  Rpm {
    /// Move the release tag if it already exists
    #[arg(long)]
    force: bool,
    #[command(flatten)]
    run: RunArgs,
  },

  // ============================================================================
  // Release recording
  // ============================================================================
  /// Regenerate the changelog from history and commit it
  Changelog,

  /// Commit pending changes and tag the release
  #[command(alias = "cvstag")]
  Tag {
    /// Move the release tag if it already exists
    #[arg(long)]
    force: bool,
  },

  // ============================================================================
  // Inspection
  // ============================================================================
  /// Print <version>-<release> from the spec file
  Version {
    /// Output name, version, release, tag and artifact paths as JSON
    #[arg(long)]
    json: bool,
  },

  /// Show the ordered stages a target runs
  Plan {
    #[arg(value_enum)]
    target: Target,
    /// Output the plan as JSON
    #[arg(long)]
    json: bool,
  },
}

impl Commands {
  /// Target and options for commands that run through the pipeline
  fn into_target(self) -> Option<(Target, PipelineOptions)> {
    let with_run = |run: RunArgs| PipelineOptions {
      dry_run: run.dry_run,
      json: run.json,
      ..Default::default()
    };

    let resolved = match self {
      Commands::Build => (Target::Build, PipelineOptions::default()),
      Commands::Install { dirs, run } => (
        Target::Install,
        PipelineOptions {
          install: dirs.into(),
          ..with_run(run)
        },
      ),
      Commands::Clean => (Target::Clean, PipelineOptions::default()),
      Commands::Verify => (Target::Verify, PipelineOptions::default()),
      Commands::LocalDist { run } => (Target::LocalDist, with_run(run)),
      Commands::Dist { run } => (Target::Dist, with_run(run)),
      Commands::CleanDist => (Target::CleanDist, PipelineOptions::default()),
      Commands::BuildRpm => (Target::BuildRpm, PipelineOptions::default()),
      Commands::LocalRpm { run } => (Target::LocalRpm, with_run(run)),
      Commands::Rpm { force, run } => (
        Target::Rpm,
        PipelineOptions {
          force_tag: force,
          ..with_run(run)
        },
      ),
      Commands::Changelog => (Target::Changelog, PipelineOptions::default()),
      Commands::Tag { force } => (
        Target::Tag,
        PipelineOptions {
          force_tag: force,
          ..Default::default()
        },
      ),
      Commands::Version { .. } | Commands::Plan { .. } => return None,
    };
    Some(resolved)
  }
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();
  core::telemetry::init_tracing(cli.verbose);

  let root = match resolve_root(cli.directory.as_deref()) {
    Ok(root) => root,
    Err(e) => handle_error(e),
  };

  if let Err(err) = run(&root, cli.config.as_deref(), cli.command) {
    handle_error(err);
  }
}

fn run(root: &Path, config: Option<&Path>, command: Commands) -> RailResult<()> {
  // `plan` works without a descriptor; the release line is shown when one resolves
  if let Commands::Plan { target, json } = command {
    let ctx = ReleaseContext::build(root, config)
      .inspect_err(|e| tracing::debug!(error = %e, "no release context for plan"))
      .ok();
    return commands::show_plan(target, ctx.as_ref(), json);
  }

  // Build the release context once (config + descriptor metadata)
  let ctx = ReleaseContext::build(root, config)?;

  if let Commands::Version { json } = command {
    return commands::run_version(&ctx, json);
  }

  match command.into_target() {
    Some((target, options)) => {
      Pipeline::new(&ctx, options).run(target)?;
      Ok(())
    }
    None => Ok(()),
  }
}

fn resolve_root(directory: Option<&Path>) -> RailResult<PathBuf> {
  let dir = match directory {
    Some(dir) => dir.to_path_buf(),
    None => std::env::current_dir().context("Failed to get current directory")?,
  };
  dir
    .canonicalize()
    .with_context(|| format!("Project directory not found: {}", dir.display()))
}

fn handle_error(err: RailError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
