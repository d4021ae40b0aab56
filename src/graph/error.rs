//! Error types for dependency graph mutations.

use thiserror::Error;

/// Result type for dependency graph mutations.
pub type DependencyResult<T> = Result<T, DependencyError>;

/// Errors returned when an edge cannot be added.
///
/// Node identities are carried in display form so one error type serves
/// graphs over any identifier type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DependencyError {
    /// An entity cannot depend on itself.
    #[error("{node} cannot depend on itself")]
    SelfDependency {
        /// The node named on both ends.
        node: String,
    },

    /// The edge already exists.
    #[error("{from} already depends on {to}")]
    DuplicateEdge {
        /// Dependent node.
        from: String,
        /// Dependency node.
        to: String,
    },

    /// The edge would close a cycle.
    #[error("{from} depending on {to} would create a cycle")]
    CycleDetected {
        /// Dependent node.
        from: String,
        /// Dependency node.
        to: String,
    },
}
