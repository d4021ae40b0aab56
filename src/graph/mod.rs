//! Directed acyclic dependency graphs between tasks (and projects).
//!
//! An edge `(a, b)` reads "`a` depends on `b`". The graph keeps an outgoing
//! index ("depends on") and an incoming index ("depended on by") in step so
//! both views are O(degree) lookups, and refuses self-loops, duplicate edges
//! and any edge that would close a cycle.

mod dependency_graph;
mod error;

pub use dependency_graph::DependencyGraph;
pub use error::{DependencyError, DependencyResult};
