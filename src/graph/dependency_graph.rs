//! Edge set with forward and inverse adjacency indices.

use super::{DependencyError, DependencyResult};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

/// Directed acyclic graph keyed by entity identity.
///
/// `outgoing[a]` holds every `b` such that `a` depends on `b`; `incoming[b]`
/// holds every such `a`. Both maps are updated together by every mutation and
/// empty adjacency sets are pruned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph<N>
where
    N: Copy + Eq + Hash,
{
    outgoing: HashMap<N, HashSet<N>>,
    incoming: HashMap<N, HashSet<N>>,
}

impl<N> Default for DependencyGraph<N>
where
    N: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self {
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
        }
    }
}

impl<N> DependencyGraph<N>
where
    N: Copy + Eq + Hash + fmt::Display,
{
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `from` depends on `to`.
    ///
    /// The cycle check walks the outgoing index from `to`; if `from` is
    /// reachable, the new edge would close a cycle. Nothing changes on
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyError::SelfDependency`],
    /// [`DependencyError::DuplicateEdge`] or
    /// [`DependencyError::CycleDetected`].
    pub fn add_edge(&mut self, from: N, to: N) -> DependencyResult<()> {
        if from == to {
            return Err(DependencyError::SelfDependency {
                node: from.to_string(),
            });
        }
        if self.contains_edge(from, to) {
            return Err(DependencyError::DuplicateEdge {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if self.reaches(to, from) {
            return Err(DependencyError::CycleDetected {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        self.outgoing.entry(from).or_default().insert(to);
        self.incoming.entry(to).or_default().insert(from);
        Ok(())
    }

    /// Removes the edge `from -> to`, returning whether it existed.
    ///
    /// Removing a missing edge is not an error.
    pub fn remove_edge(&mut self, from: N, to: N) -> bool {
        let removed = detach(&mut self.outgoing, from, to);
        detach(&mut self.incoming, to, from);
        removed
    }

    /// Returns `true` when `from` depends on `to`.
    #[must_use]
    pub fn contains_edge(&self, from: N, to: N) -> bool {
        self.outgoing
            .get(&from)
            .is_some_and(|targets| targets.contains(&to))
    }

    /// Iterates the nodes `node` depends on.
    pub fn dependencies(&self, node: N) -> impl Iterator<Item = N> + '_ {
        self.outgoing.get(&node).into_iter().flatten().copied()
    }

    /// Iterates the nodes that depend on `node`.
    pub fn dependents(&self, node: N) -> impl Iterator<Item = N> + '_ {
        self.incoming.get(&node).into_iter().flatten().copied()
    }

    /// Removes every edge touching `node`, returning how many were removed.
    pub fn remove_node(&mut self, node: N) -> usize {
        let targets = self.outgoing.remove(&node).unwrap_or_default();
        for target in &targets {
            detach(&mut self.incoming, *target, node);
        }
        let sources = self.incoming.remove(&node).unwrap_or_default();
        for source in &sources {
            detach(&mut self.outgoing, *source, node);
        }
        targets.len() + sources.len()
    }

    /// Returns `true` when adding `from -> to` would close a cycle.
    #[must_use]
    pub fn would_create_cycle(&self, from: N, to: N) -> bool {
        from == to || self.reaches(to, from)
    }

    /// Iterates every edge as `(from, to)`.
    pub fn edges(&self) -> impl Iterator<Item = (N, N)> + '_ {
        self.outgoing
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (*from, *to)))
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(HashSet::len).sum()
    }

    /// Returns `true` when the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty()
    }

    /// Returns `true` when the edge set contains a cycle.
    ///
    /// Mutations through [`Self::add_edge`] never produce one; this is a
    /// whole-graph check for verification at commit time.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        let mut remaining_out: HashMap<N, usize> = self
            .outgoing
            .iter()
            .map(|(node, targets)| (*node, targets.len()))
            .collect();
        let mut ready: Vec<N> = self
            .incoming
            .keys()
            .filter(|node| !self.outgoing.contains_key(*node))
            .copied()
            .collect();
        let mut resolved = ready.len();

        while let Some(node) = ready.pop() {
            for source in self.dependents(node) {
                if let Some(count) = remaining_out.get_mut(&source) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(source);
                        resolved += 1;
                    }
                }
            }
        }

        let node_count = self
            .outgoing
            .keys()
            .chain(self.incoming.keys())
            .collect::<HashSet<_>>()
            .len();
        resolved != node_count
    }

    /// Depth-first reachability over the outgoing index.
    fn reaches(&self, start: N, goal: N) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if node == goal {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            stack.extend(
                self.dependencies(node)
                    .filter(|next| !visited.contains(next)),
            );
        }
        false
    }
}

fn detach<N>(index: &mut HashMap<N, HashSet<N>>, key: N, value: N) -> bool
where
    N: Copy + Eq + Hash,
{
    let Some(set) = index.get_mut(&key) else {
        return false;
    };
    let removed = set.remove(&value);
    if set.is_empty() {
        index.remove(&key);
    }
    removed
}
