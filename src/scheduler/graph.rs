//! Dependency graph for check execution ordering.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::error::{ReviewError, Result};

/// The `needs` relationships between checks.
///
/// Nodes keep their insertion (registration) index; every ordering
/// produced by the graph breaks ties by that index.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    names: Vec<String>,
    index: HashMap<String, usize>,
    /// Direct needs of each node, in declaration order.
    dependencies: Vec<Vec<usize>>,
    /// Nodes that need each node.
    dependents: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Create a new dependency graph builder.
    pub fn builder() -> DependencyGraphBuilder {
        DependencyGraphBuilder::new()
    }

    /// Registration index of a check.
    pub fn index_of(&self, check: &str) -> Option<usize> {
        self.index.get(check).copied()
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// Direct needs of a check, in declaration order.
    pub fn dependencies_of(&self, check: &str) -> Option<Vec<&str>> {
        let idx = self.index_of(check)?;
        Some(
            self.dependencies[idx]
                .iter()
                .map(|&d| self.names[d].as_str())
                .collect(),
        )
    }

    pub(crate) fn dependency_indices(&self, index: usize) -> &[usize] {
        &self.dependencies[index]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Node indices in topological order (needs before dependents).
    ///
    /// Among nodes whose needs are satisfied, the lowest registration
    /// index goes first. Returns an error if a cycle is detected.
    pub fn topological_order(&self) -> Result<Vec<usize>> {
        let mut in_degree: Vec<usize> = self.dependencies.iter().map(Vec::len).collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(idx, _)| Reverse(idx))
            .collect();

        let mut result = Vec::with_capacity(self.names.len());

        while let Some(Reverse(idx)) = ready.pop() {
            result.push(idx);

            for &dependent in &self.dependents[idx] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if result.len() != self.names.len() {
            let cycle = self.find_cycle().unwrap_or_else(|| {
                in_degree
                    .iter()
                    .enumerate()
                    .filter(|(_, &d)| d > 0)
                    .map(|(idx, _)| self.names[idx].clone())
                    .collect()
            });
            return Err(ReviewError::CircularDependency {
                cycle: cycle.join(" -> "),
            });
        }

        Ok(result)
    }

    /// Topological order restricted to `subset`.
    pub fn topological_order_of(&self, subset: &HashSet<usize>) -> Result<Vec<usize>> {
        Ok(self
            .topological_order()?
            .into_iter()
            .filter(|idx| subset.contains(idx))
            .collect())
    }

    /// Find a cycle in the graph, returning the path if one exists.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        fn dfs(
            node: usize,
            graph: &DependencyGraph,
            state: &mut [State],
            path: &mut Vec<usize>,
        ) -> Option<Vec<String>> {
            state[node] = State::Visiting;
            path.push(node);

            for &dep in &graph.dependencies[node] {
                match state[dep] {
                    State::Visiting => {
                        let start = path.iter().position(|&n| n == dep).unwrap_or(0);
                        let mut cycle: Vec<String> = path[start..]
                            .iter()
                            .map(|&n| graph.names[n].clone())
                            .collect();
                        cycle.push(graph.names[dep].clone());
                        return Some(cycle);
                    }
                    State::Unvisited => {
                        if let Some(cycle) = dfs(dep, graph, state, path) {
                            return Some(cycle);
                        }
                    }
                    State::Visited => {}
                }
            }

            path.pop();
            state[node] = State::Visited;
            None
        }

        let mut state = vec![State::Unvisited; self.names.len()];
        let mut path = Vec::new();

        for node in 0..self.names.len() {
            if state[node] == State::Unvisited {
                if let Some(cycle) = dfs(node, self, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }

    /// Indices of everything `check` needs, directly or indirectly.
    pub fn transitive_dependencies(&self, index: usize) -> HashSet<usize> {
        let mut result = HashSet::new();
        let mut to_visit = vec![index];

        while let Some(current) = to_visit.pop() {
            for &dep in &self.dependencies[current] {
                if result.insert(dep) {
                    to_visit.push(dep);
                }
            }
        }

        result
    }
}

/// Builder for constructing a DependencyGraph.
#[derive(Debug, Default)]
pub struct DependencyGraphBuilder {
    checks: Vec<(String, Vec<String>)>,
}

impl DependencyGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a check with its needs. Insertion order is registration order.
    pub fn add_check(mut self, name: impl Into<String>, needs: Vec<String>) -> Self {
        self.push(name, needs);
        self
    }

    /// Non-consuming [`add_check`](Self::add_check).
    pub fn push(&mut self, name: impl Into<String>, needs: Vec<String>) {
        let name = name.into();
        match self.checks.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => existing.extend(needs),
            None => self.checks.push((name, needs)),
        }
    }

    /// Build the dependency graph.
    ///
    /// Returns an error if any need references a check not in the graph.
    pub fn build(self) -> Result<DependencyGraph> {
        let names: Vec<String> = self.checks.iter().map(|(n, _)| n.clone()).collect();
        let index: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();

        let mut dependencies = vec![Vec::new(); names.len()];
        let mut dependents = vec![Vec::new(); names.len()];

        for (idx, (name, needs)) in self.checks.iter().enumerate() {
            for need in needs {
                let dep = *index
                    .get(need)
                    .ok_or_else(|| ReviewError::UnknownDependency {
                        check: name.clone(),
                        needed: need.clone(),
                    })?;
                if !dependencies[idx].contains(&dep) {
                    dependencies[idx].push(dep);
                    dependents[dep].push(idx);
                }
            }
        }

        Ok(DependencyGraph {
            names,
            index,
            dependencies,
            dependents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn needs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn order_names(graph: &DependencyGraph) -> Vec<&str> {
        graph
            .topological_order()
            .unwrap()
            .into_iter()
            .map(|i| graph.name(i))
            .collect()
    }

    #[test]
    fn builder_creates_empty_graph() {
        let graph = DependencyGraph::builder().build().unwrap();
        assert!(graph.is_empty());
        assert!(graph.topological_order().unwrap().is_empty());
    }

    #[test]
    fn builder_tracks_dependencies() {
        let graph = DependencyGraph::builder()
            .add_check("CheckBuild", vec![])
            .add_check("CheckRpmlint", needs(&["CheckBuild"]))
            .add_check("CheckPackageInstalls", needs(&["CheckBuild"]))
            .build()
            .unwrap();

        assert_eq!(graph.dependencies_of("CheckRpmlint").unwrap(), vec!["CheckBuild"]);
        assert!(graph.dependencies_of("CheckBuild").unwrap().is_empty());
    }

    #[test]
    fn builder_rejects_unknown_dependency() {
        let err = DependencyGraph::builder()
            .add_check("CheckBuild", needs(&["CheckResultdir"]))
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            ReviewError::UnknownDependency { check, needed }
                if check == "CheckBuild" && needed == "CheckResultdir"
        ));
    }

    #[test]
    fn duplicate_needs_are_collapsed() {
        let graph = DependencyGraph::builder()
            .add_check("a", vec![])
            .add_check("b", needs(&["a", "a"]))
            .build()
            .unwrap();
        assert_eq!(graph.dependencies_of("b").unwrap(), vec!["a"]);
        assert_eq!(order_names(&graph), vec!["a", "b"]);
    }

    #[test]
    fn topo_sort_respects_needs_declared_later() {
        let graph = DependencyGraph::builder()
            .add_check("consumer", needs(&["producer"]))
            .add_check("producer", vec![])
            .build()
            .unwrap();

        assert_eq!(order_names(&graph), vec!["producer", "consumer"]);
    }

    #[test]
    fn ties_break_by_registration_order() {
        let graph = DependencyGraph::builder()
            .add_check("z", vec![])
            .add_check("y", vec![])
            .add_check("x", needs(&["z"]))
            .add_check("w", vec![])
            .build()
            .unwrap();

        assert_eq!(order_names(&graph), vec!["z", "y", "x", "w"]);
    }

    #[test]
    fn topo_sort_is_deterministic() {
        let build = || {
            DependencyGraph::builder()
                .add_check("d", needs(&["b", "c"]))
                .add_check("c", needs(&["a"]))
                .add_check("b", needs(&["a"]))
                .add_check("a", vec![])
                .build()
                .unwrap()
        };
        let first = build().topological_order().unwrap();
        for _ in 0..10 {
            assert_eq!(build().topological_order().unwrap(), first);
        }
        assert_eq!(order_names(&build()), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn cycle_is_reported_with_path() {
        let graph = DependencyGraph::builder()
            .add_check("a", needs(&["c"]))
            .add_check("b", needs(&["a"]))
            .add_check("c", needs(&["b"]))
            .build()
            .unwrap();

        let cycle = graph.find_cycle().unwrap();
        assert_eq!(cycle.first(), cycle.last());
        assert_eq!(cycle.len(), 4);

        let err = graph.topological_order().unwrap_err();
        assert!(matches!(err, ReviewError::CircularDependency { cycle } if cycle.contains(" -> ")));
    }

    #[test]
    fn self_need_is_a_cycle() {
        let graph = DependencyGraph::builder()
            .add_check("a", needs(&["a"]))
            .build()
            .unwrap();
        assert_eq!(graph.find_cycle().unwrap(), vec!["a", "a"]);
    }

    #[test]
    fn acyclic_graph_has_no_cycle() {
        let graph = DependencyGraph::builder()
            .add_check("a", vec![])
            .add_check("b", needs(&["a"]))
            .add_check("c", needs(&["a", "b"]))
            .build()
            .unwrap();
        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn transitive_dependencies_follow_chain() {
        let graph = DependencyGraph::builder()
            .add_check("a", vec![])
            .add_check("b", needs(&["a"]))
            .add_check("c", needs(&["b"]))
            .add_check("unrelated", vec![])
            .build()
            .unwrap();

        let c = graph.index_of("c").unwrap();
        let deps = graph.transitive_dependencies(c);
        assert_eq!(deps.len(), 2);
        assert!(deps.contains(&graph.index_of("a").unwrap()));
        assert!(!deps.contains(&graph.index_of("unrelated").unwrap()));
    }

    #[test]
    fn restricted_order_keeps_relative_positions() {
        let graph = DependencyGraph::builder()
            .add_check("a", vec![])
            .add_check("b", needs(&["a"]))
            .add_check("c", vec![])
            .build()
            .unwrap();
        let subset: HashSet<usize> = [1, 0].into_iter().collect();
        assert_eq!(graph.topological_order_of(&subset).unwrap(), vec![0, 1]);
    }
}
