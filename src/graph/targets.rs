//! Pipeline target graph built on petgraph
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A requires B first"
//! - **Nodes**: Targets. Actions do work; composites only order their prerequisites.
//! - **Edges**: Position of the prerequisite in the parent's list
//! - **Plan**: Ordered depth-first walk, each action at most once

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, EdgeRef, Reversed};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
  /// Compile the distributed sources
  Build,
  /// Build, then copy file sets into BINDIR/LIBDIR/ETCDIR
  Install,
  /// Remove transient byte-compiled artifacts
  Clean,
  /// Run the configured static checker
  Verify,
  /// Regenerate and commit the changelog
  Changelog,
  /// Commit pending changes and tag the release
  #[value(alias = "cvstag")]
  Tag,
  /// Remove staging directory and archives
  #[value(alias = "cleandist")]
  CleanDist,
  /// Archive the working tree (manifest copy)
  #[value(alias = "localdist")]
  LocalDist,
  /// Archive the tagged release (version control export)
  Dist,
  /// Build the package from the archive
  #[value(alias = "buildrpm")]
  BuildRpm,
  /// localdist, then buildrpm
  #[value(alias = "localrpm")]
  LocalRpm,
  /// changelog, tag, dist, then buildrpm
  Rpm,

  #[value(skip)]
  InstallFiles,
  #[value(skip)]
  LocalCopy,
  #[value(skip)]
  Export,
  #[value(skip)]
  Tar,
}

impl Target {
  pub const ALL: [Target; 16] = [
    Target::Build,
    Target::Install,
    Target::Clean,
    Target::Verify,
    Target::Changelog,
    Target::Tag,
    Target::CleanDist,
    Target::LocalDist,
    Target::Dist,
    Target::BuildRpm,
    Target::LocalRpm,
    Target::Rpm,
    Target::InstallFiles,
    Target::LocalCopy,
    Target::Export,
    Target::Tar,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Target::Build => "build",
      Target::Install => "install",
      Target::Clean => "clean",
      Target::Verify => "verify",
      Target::Changelog => "changelog",
      Target::Tag => "tag",
      Target::CleanDist => "clean-dist",
      Target::LocalDist => "local-dist",
      Target::Dist => "dist",
      Target::BuildRpm => "build-rpm",
      Target::LocalRpm => "local-rpm",
      Target::Rpm => "rpm",
      Target::InstallFiles => "install-files",
      Target::LocalCopy => "local-copy",
      Target::Export => "export",
      Target::Tar => "tar",
    }
  }

  /// Ordered prerequisites
  pub fn prerequisites(self) -> &'static [Target] {
    match self {
      Target::Install => &[Target::Build, Target::InstallFiles],
      Target::LocalDist => &[Target::CleanDist, Target::LocalCopy, Target::Tar],
      Target::Dist => &[Target::CleanDist, Target::Export, Target::Tar],
      Target::LocalRpm => &[Target::LocalDist, Target::BuildRpm],
      Target::Rpm => &[Target::Changelog, Target::Tag, Target::Dist, Target::BuildRpm],
      _ => &[],
    }
  }

  /// Composites do no work of their own
  pub fn is_action(self) -> bool {
    !matches!(
      self,
      Target::Install | Target::LocalDist | Target::Dist | Target::LocalRpm | Target::Rpm
    )
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

pub struct TargetGraph {
  graph: DiGraph<Target, usize>,
  index: HashMap<Target, NodeIndex>,
}

impl TargetGraph {
  pub fn new() -> Self {
    let mut graph = DiGraph::new();
    let mut index = HashMap::new();

    for target in Target::ALL {
      index.insert(target, graph.add_node(target));
    }
    for target in Target::ALL {
      for (position, prereq) in target.prerequisites().iter().enumerate() {
        graph.add_edge(index[&target], index[prereq], position);
      }
    }

    let targets = Self { graph, index };
    debug_assert!(targets.is_acyclic(), "target prerequisites form a cycle");
    targets
  }

  /// Prerequisites of `target` in declaration order
  fn ordered_prerequisites(&self, node: NodeIndex) -> Vec<NodeIndex> {
    let mut edges: Vec<_> = self.graph.edges_directed(node, Direction::Outgoing).collect();
    edges.sort_by_key(|edge| *edge.weight());
    edges.into_iter().map(|edge| edge.target()).collect()
  }

  /// Actions to run for `target`, in execution order
  pub fn plan(&self, target: Target) -> Vec<Target> {
    let mut plan = Vec::new();
    let mut visited = HashSet::new();
    self.visit(self.index[&target], &mut visited, &mut plan);
    plan
  }

  fn visit(&self, node: NodeIndex, visited: &mut HashSet<NodeIndex>, plan: &mut Vec<Target>) {
    if !visited.insert(node) {
      return;
    }
    for prereq in self.ordered_prerequisites(node) {
      self.visit(prereq, visited, plan);
    }
    let target = self.graph[node];
    if target.is_action() {
      plan.push(target);
    }
  }

  /// Composite targets that (transitively) include `target`
  pub fn dependents(&self, target: Target) -> Vec<Target> {
    let reversed = Reversed(&self.graph);
    let mut bfs = Bfs::new(reversed, self.index[&target]);
    let mut found = Vec::new();
    while let Some(node) = bfs.next(reversed) {
      if self.graph[node] != target {
        found.push(self.graph[node]);
      }
    }
    found.sort();
    found
  }

  pub fn is_acyclic(&self) -> bool {
    !petgraph::algo::is_cyclic_directed(&self.graph)
  }
}

impl Default for TargetGraph {
  fn default() -> Self {
    Self::new()
  }
}
