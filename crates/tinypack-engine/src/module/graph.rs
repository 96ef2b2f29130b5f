//! Module dependency graph
//!
//! Modules are kept in discovery order: the order in which the resolver
//! first entered them. Discovery order is not a dependency-safe order;
//! [`ModuleGraph::dependencies_first_order`] provides one.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

/// Module dependency graph
#[derive(Debug, Default, Clone)]
pub struct ModuleGraph {
    /// Dependencies of each module, in source order
    nodes: IndexMap<PathBuf, IndexSet<PathBuf>>,
}

impl ModuleGraph {
    /// Create a new empty module graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module to the graph. Returns false if it was already present.
    pub fn add_module(&mut self, path: PathBuf) -> bool {
        if self.nodes.contains_key(&path) {
            return false;
        }
        self.nodes.insert(path, IndexSet::new());
        true
    }

    /// Add a dependency edge (from imports to)
    ///
    /// `from` is added if missing; `to` is not, so that discovery order
    /// stays the order in which modules were entered.
    pub fn add_dependency(&mut self, from: PathBuf, to: PathBuf) {
        self.nodes.entry(from).or_default().insert(to);
    }

    /// Dependencies of `path`, in source order
    pub fn dependencies(&self, path: &Path) -> Option<&IndexSet<PathBuf>> {
        self.nodes.get(path)
    }

    /// Returns true if `from` depends directly on `to`
    pub fn has_dependency(&self, from: &Path, to: &Path) -> bool {
        self.nodes.get(from).is_some_and(|deps| deps.contains(to))
    }

    /// Returns true if `path` is in the graph
    pub fn contains(&self, path: &Path) -> bool {
        self.nodes.contains_key(path)
    }

    /// All modules in discovery order
    pub fn modules(&self) -> impl Iterator<Item = &PathBuf> {
        self.nodes.keys()
    }

    /// All modules with their dependencies, in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &IndexSet<PathBuf>)> {
        self.nodes.iter()
    }

    /// Get the number of modules in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Modules in depth-first post-order from `entry`
    ///
    /// Every module comes after the modules it depends on, except across a
    /// cycle, which is broken at the edge that closes it. Modules not
    /// reachable from `entry` follow in discovery order.
    pub fn dependencies_first_order(&self, entry: &Path) -> Vec<PathBuf> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut visited: FxHashSet<&Path> = FxHashSet::default();

        let roots = std::iter::once(entry).chain(self.nodes.keys().map(PathBuf::as_path));
        for root in roots {
            if !self.nodes.contains_key(root) || !visited.insert(root) {
                continue;
            }

            // (module, index of the next dependency to visit)
            let mut stack: Vec<(&Path, usize)> = vec![(root, 0)];
            while let Some((path, next)) = stack.last_mut() {
                let deps = &self.nodes[*path];
                match deps.get_index(*next) {
                    Some(dep) => {
                        *next += 1;
                        if self.nodes.contains_key(dep.as_path()) && visited.insert(dep.as_path()) {
                            stack.push((dep.as_path(), 0));
                        }
                    }
                    None => {
                        order.push(path.to_path_buf());
                        stack.pop();
                    }
                }
            }
        }

        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str) -> PathBuf {
        PathBuf::from(format!("/project/{}", name))
    }

    #[test]
    fn test_discovery_order() {
        let mut graph = ModuleGraph::new();
        assert!(graph.add_module(p("main.js")));
        graph.add_dependency(p("main.js"), p("b.js"));
        assert!(graph.add_module(p("b.js")));
        graph.add_dependency(p("main.js"), p("a.js"));
        assert!(graph.add_module(p("a.js")));
        assert!(!graph.add_module(p("b.js")));

        let modules: Vec<_> = graph.modules().cloned().collect();
        assert_eq!(modules, vec![p("main.js"), p("b.js"), p("a.js")]);
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut graph = ModuleGraph::new();
        graph.add_module(p("main.js"));
        graph.add_dependency(p("main.js"), p("a.js"));
        graph.add_dependency(p("main.js"), p("a.js"));
        assert_eq!(graph.dependencies(&p("main.js")).map(|d| d.len()), Some(1));
        assert!(graph.has_dependency(&p("main.js"), &p("a.js")));
        assert!(!graph.contains(&p("a.js")));
    }

    #[test]
    fn test_dependencies_first_order() {
        // main -> a -> c, main -> b -> c
        let mut graph = ModuleGraph::new();
        for name in ["main.js", "a.js", "c.js", "b.js"] {
            graph.add_module(p(name));
        }
        graph.add_dependency(p("main.js"), p("a.js"));
        graph.add_dependency(p("main.js"), p("b.js"));
        graph.add_dependency(p("a.js"), p("c.js"));
        graph.add_dependency(p("b.js"), p("c.js"));

        let order = graph.dependencies_first_order(&p("main.js"));
        assert_eq!(order, vec![p("c.js"), p("a.js"), p("b.js"), p("main.js")]);
    }

    #[test]
    fn test_dependencies_first_order_with_cycle() {
        let mut graph = ModuleGraph::new();
        graph.add_module(p("a.js"));
        graph.add_module(p("b.js"));
        graph.add_dependency(p("a.js"), p("b.js"));
        graph.add_dependency(p("b.js"), p("a.js"));

        let order = graph.dependencies_first_order(&p("a.js"));
        assert_eq!(order, vec![p("b.js"), p("a.js")]);
    }

    #[test]
    fn test_dependencies_first_order_skips_missing_nodes() {
        let mut graph = ModuleGraph::new();
        graph.add_module(p("main.js"));
        graph.add_dependency(p("main.js"), p("gone.js"));
        graph.add_module(p("orphan.js"));

        let order = graph.dependencies_first_order(&p("main.js"));
        assert_eq!(order, vec![p("main.js"), p("orphan.js")]);
    }
}
